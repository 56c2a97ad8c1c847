//! Ratatui-based terminal UI.
//!
//! The TUI browses the charts of a finished run: one chart at a time on the
//! left, the matching ranking (or the key insights) on the right.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs},
};

use crate::app::pipeline::RunOutput;
use crate::domain::Field;
use crate::error::AppError;
use crate::plot::{ChartKind, ChartSet};
use crate::report::fmt_thousands;

mod plotters_chart;

use plotters_chart::CovidChart;

/// Start the TUI on a finished run.
pub fn run(output: &RunOutput) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(output);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App<'a> {
    run: &'a RunOutput,
    set: ChartSet,
    kinds: Vec<ChartKind>,
    selected: usize,
}

impl<'a> App<'a> {
    fn new(run: &'a RunOutput) -> Self {
        let set = ChartSet::from_run(run);
        let kinds = set.kinds();
        Self {
            run,
            set,
            kinds,
            selected: 0,
        }
    }

    fn current(&self) -> ChartKind {
        self.kinds[self.selected]
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let n = self.kinds.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => {
                self.selected = (self.selected + 1) % n;
            }
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => {
                self.selected = (self.selected + n - 1) % n;
            }
            KeyCode::Char(c) => {
                if let Some(idx) = c.to_digit(10).map(|d| d as usize) {
                    if (1..=n).contains(&idx) {
                        self.selected = idx - 1;
                    }
                }
            }
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let dates = self
            .run
            .date_range
            .map(|(first, last)| format!("{first} .. {last}"))
            .unwrap_or_else(|| "-".to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("covid", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" {}", self.run.source.label)),
            ]),
            Line::from(Span::styled(
                format!(
                    "rows: {} | dropped: {} | entities: {} | dates: {dates}",
                    self.run.dataset.records.len(),
                    self.run.dataset.dropped_rows,
                    self.run.insights.entities_tracked,
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<String> = self
            .kinds
            .iter()
            .enumerate()
            .map(|(i, k)| format!("{} {}", i + 1, tab_label(*k)))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.selected)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_side(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let kind = self.current();
        let block = Block::default().title(kind.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);
        frame.render_widget(CovidChart { set: &self.set, kind }, inner);
    }

    fn draw_side(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (title, items) = match self.set.bars(self.current()) {
            Some(bars) => (
                "Ranking",
                bars.bars
                    .iter()
                    .enumerate()
                    .map(|(i, (entity, value))| format!("{:>2}. {entity}  {}", i + 1, fmt_thousands(*value)))
                    .collect(),
            ),
            None => ("Key insights", insight_lines(self.run)),
        };

        let items: Vec<ListItem> = if items.is_empty() {
            vec![ListItem::new("No data").style(Style::default().fg(Color::Yellow))]
        } else {
            items.into_iter().map(ListItem::new).collect()
        };
        let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ chart  1-5 jump  q quit";
        let line = Line::from(Span::styled(
            help,
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ));
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn tab_label(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::TopCases => "Cases",
        ChartKind::TopDeaths => "Deaths",
        ChartKind::GlobalTrend => "Trend",
        ChartKind::CasesVsDeaths => "Cases vs Deaths",
        ChartKind::TopVaccinations => "Vaccinations",
    }
}

fn insight_lines(run: &RunOutput) -> Vec<String> {
    let insights = &run.insights;
    let mut lines = vec![format!("Entities tracked: {}", insights.entities_tracked)];
    let mut push = |label: &str, field: Field, entity: &Option<String>| {
        if let Some(entity) = entity {
            let value = run
                .snapshot
                .get(entity)
                .map(|r| fmt_thousands(r.metrics.get_or_zero(field)))
                .unwrap_or_default();
            lines.push(format!("{label}: {entity} ({value})"));
        }
    };
    push("Highest cases", Field::TotalCases, &insights.highest_cases);
    push("Highest deaths", Field::TotalDeaths, &insights.highest_deaths);
    push("Most vaccinations", Field::TotalVaccinations, &insights.highest_vaccinations);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_from_loaded;
    use crate::domain::Schema;
    use crate::io::ingest::load_from_reader;

    fn sample_run(csv: &str) -> RunOutput {
        let loaded = load_from_reader(csv.as_bytes(), "inline", &Schema::default()).unwrap();
        run_from_loaded(loaded, 10)
    }

    const CSV: &str = "\
location,date,total_cases,new_cases,total_deaths,new_deaths,total_vaccinations,population
Atlantis,2021-01-01,100,100,5,5,0,1000
Atlantis,2021-01-02,150,50,6,1,40,1000
Testland,2021-01-02,90,90,9,9,10,500
";

    #[test]
    fn navigation_wraps_and_jumps() {
        let run = sample_run(CSV);
        let mut app = App::new(&run);
        assert_eq!(app.kinds.len(), 5);

        assert!(!app.handle_key(KeyCode::Left));
        assert_eq!(app.current(), ChartKind::TopVaccinations);
        assert!(!app.handle_key(KeyCode::Right));
        assert_eq!(app.current(), ChartKind::TopCases);
        assert!(!app.handle_key(KeyCode::Char('3')));
        assert_eq!(app.current(), ChartKind::GlobalTrend);
        assert!(!app.handle_key(KeyCode::Char('9')));
        assert_eq!(app.current(), ChartKind::GlobalTrend);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn vaccination_tab_hidden_when_never_reported() {
        let run = sample_run("location,date,total_cases\nAtlantis,2021-01-01,1\n");
        let app = App::new(&run);
        assert!(!app.kinds.contains(&ChartKind::TopVaccinations));
    }

    #[test]
    fn insight_lines_carry_leader_values() {
        let run = sample_run(CSV);
        let lines = insight_lines(&run);
        assert_eq!(lines[0], "Entities tracked: 2");
        assert_eq!(lines[1], "Highest cases: Atlantis (150)");
        assert_eq!(lines[2], "Highest deaths: Testland (9)");
        assert_eq!(lines[3], "Most vaccinations: Atlantis (40)");
    }
}
