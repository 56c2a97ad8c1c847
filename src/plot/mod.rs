//! Chart data and rendering.
//!
//! - `ChartSet`: render-ready series derived from a run (shared by every backend)
//! - `draw`: Plotters drawing, generic over the backend (SVG files, TUI)
//! - `svg`: chart files on disk
//! - `ascii`: fixed-size text charts for the terminal report

use chrono::NaiveDate;
use plotters::style::RGBColor;

use crate::app::pipeline::RunOutput;
use crate::domain::{Field, Ranking, Snapshot, TimeSeries};

pub mod ascii;
pub mod draw;
pub mod svg;

pub use ascii::*;
pub use draw::{ChartStyle, draw_chart};
pub use svg::*;

/// Qualitative palette for per-entity markers (colour-blind safe).
pub const SAFE_PALETTE: [RGBColor; 11] = [
    RGBColor(136, 204, 238),
    RGBColor(204, 102, 119),
    RGBColor(221, 204, 119),
    RGBColor(17, 119, 51),
    RGBColor(51, 34, 136),
    RGBColor(170, 68, 153),
    RGBColor(68, 170, 153),
    RGBColor(153, 153, 51),
    RGBColor(136, 34, 85),
    RGBColor(102, 17, 0),
    RGBColor(136, 136, 136),
];

/// The charts a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    TopCases,
    TopDeaths,
    GlobalTrend,
    CasesVsDeaths,
    TopVaccinations,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::TopCases,
        ChartKind::TopDeaths,
        ChartKind::GlobalTrend,
        ChartKind::CasesVsDeaths,
        ChartKind::TopVaccinations,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::TopCases => "Top Countries by Total COVID-19 Cases",
            ChartKind::TopDeaths => "Top Countries by Total COVID-19 Deaths",
            ChartKind::GlobalTrend => "Global COVID-19 Trend Over Time",
            ChartKind::CasesVsDeaths => "Total Cases vs Total Deaths (bubble size = population)",
            ChartKind::TopVaccinations => "Top Countries by Total Vaccinations",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::TopCases => "top_cases.svg",
            ChartKind::TopDeaths => "top_deaths.svg",
            ChartKind::GlobalTrend => "global_trend.svg",
            ChartKind::CasesVsDeaths => "cases_vs_deaths.svg",
            ChartKind::TopVaccinations => "top_vaccinations.svg",
        }
    }
}

/// Sequential colour ramp; the first bar gets the darkest shade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Reds,
    Greys,
    Greens,
}

impl Palette {
    fn endpoints(self) -> (RGBColor, RGBColor) {
        match self {
            Palette::Reds => (RGBColor(103, 0, 13), RGBColor(252, 187, 161)),
            Palette::Greys => (RGBColor(37, 37, 37), RGBColor(217, 217, 217)),
            Palette::Greens => (RGBColor(0, 68, 27), RGBColor(199, 233, 192)),
        }
    }

    /// Shade for item `idx` of `n`.
    pub fn shade(self, idx: usize, n: usize) -> RGBColor {
        let (dark, light) = self.endpoints();
        let u = if n <= 1 { 0.0 } else { idx as f64 / (n as f64 - 1.0) };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * u).round() as u8;
        RGBColor(mix(dark.0, light.0), mix(dark.1, light.1), mix(dark.2, light.2))
    }
}

/// Horizontal bar chart of a ranking.
#[derive(Debug, Clone)]
pub struct BarSeries {
    pub title: &'static str,
    pub value_label: &'static str,
    /// `(entity, value)`, largest first.
    pub bars: Vec<(String, f64)>,
    pub palette: Palette,
}

impl BarSeries {
    pub fn from_ranking(kind: ChartKind, ranking: &Ranking, palette: Palette) -> Self {
        Self {
            title: kind.title(),
            value_label: ranking.field.display_name(),
            bars: ranking.entries.iter().map(|e| (e.entity.clone(), e.value)).collect(),
            palette,
        }
    }

    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.1).fold(0.0, f64::max)
    }
}

/// One line of the global trend chart. `x` is days since `TrendSeries::start`.
#[derive(Debug, Clone)]
pub struct TrendLine {
    pub label: &'static str,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct TrendSeries {
    pub start: Option<NaiveDate>,
    pub lines: Vec<TrendLine>,
}

impl TrendSeries {
    /// Lines for new cases and new deaths, plus total vaccinations when reported.
    pub fn from_time_series(trend: &TimeSeries, include_vaccinations: bool) -> Self {
        let start = trend.points.first().map(|p| p.date);
        let mut wanted = vec![
            (Field::NewCases, RGBColor(255, 99, 71)),
            (Field::NewDeaths, RGBColor(128, 128, 128)),
        ];
        if include_vaccinations {
            wanted.push((Field::TotalVaccinations, RGBColor(0, 128, 0)));
        }

        let lines = match start {
            Some(start) => wanted
                .into_iter()
                .filter_map(|(field, color)| {
                    let points = trend
                        .series(field)?
                        .into_iter()
                        .map(|(d, v)| ((d - start).num_days() as f64, v))
                        .collect();
                    Some(TrendLine {
                        label: field.display_name(),
                        color,
                        points,
                    })
                })
                .collect(),
            None => Vec::new(),
        };

        Self { start, lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.points.is_empty())
    }

    pub fn x_bounds(&self) -> (f64, f64) {
        let x_max = self
            .lines
            .iter()
            .flat_map(|l| l.points.iter().map(|p| p.0))
            .fold(0.0, f64::max);
        (0.0, x_max.max(1.0))
    }

    /// Always includes zero; padded 5% above the top.
    pub fn y_bounds(&self) -> (f64, f64) {
        let (mut lo, mut hi) = (0.0_f64, 0.0_f64);
        for &(_, y) in self.lines.iter().flat_map(|l| l.points.iter()) {
            lo = lo.min(y);
            hi = hi.max(y);
        }
        if hi <= lo {
            hi = lo + 1.0;
        }
        (lo, hi + (hi - lo) * 0.05)
    }

    /// Calendar date for an x position.
    pub fn date_at(&self, x: f64) -> Option<NaiveDate> {
        let start = self.start?;
        start.checked_add_signed(chrono::Duration::days(x.round() as i64))
    }
}

/// One entity in the cases-vs-deaths chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub entity: String,
    pub cases: f64,
    pub deaths: f64,
    pub population: f64,
}

#[derive(Debug, Clone)]
pub struct BubbleSeries {
    pub bubbles: Vec<Bubble>,
    pub max_population: f64,
}

impl BubbleSeries {
    /// Snapshot rows with positive cases and deaths (log axes cannot show zero).
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let bubbles: Vec<Bubble> = snapshot
            .records
            .iter()
            .map(|r| Bubble {
                entity: r.entity.clone(),
                cases: r.metrics.get_or_zero(Field::TotalCases),
                deaths: r.metrics.get_or_zero(Field::TotalDeaths),
                population: r.metrics.get_or_zero(Field::Population),
            })
            .filter(|b| b.cases > 0.0 && b.deaths > 0.0)
            .collect();
        let max_population = bubbles.iter().map(|b| b.population).fold(0.0, f64::max);
        Self {
            bubbles,
            max_population,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn x_bounds(&self) -> (f64, f64) {
        log_bounds(self.bubbles.iter().map(|b| b.cases))
    }

    pub fn y_bounds(&self) -> (f64, f64) {
        log_bounds(self.bubbles.iter().map(|b| b.deaths))
    }

    /// Marker radius: bubble area scales with population, the largest gets `max_diameter`.
    pub fn radius(&self, bubble: &Bubble, max_diameter: f64) -> f64 {
        if self.max_population <= 0.0 {
            return 1.0;
        }
        let diameter = max_diameter * (bubble.population / self.max_population).max(0.0).sqrt();
        (diameter / 2.0).max(1.0)
    }
}

/// Bounds for a log axis: half the minimum to twice the maximum.
fn log_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| *v > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo.is_finite() && hi.is_finite() {
        (lo * 0.5, hi * 2.0)
    } else {
        (1.0, 10.0)
    }
}

/// Every chart's series, computed once per run.
#[derive(Debug, Clone)]
pub struct ChartSet {
    pub top_cases: BarSeries,
    pub top_deaths: BarSeries,
    pub trend: TrendSeries,
    pub bubbles: BubbleSeries,
    /// `None` when vaccinations were never reported.
    pub top_vaccinations: Option<BarSeries>,
}

impl ChartSet {
    pub fn from_run(run: &RunOutput) -> Self {
        let top_vaccinations = run.vaccinations_reported.then(|| {
            BarSeries::from_ranking(ChartKind::TopVaccinations, &run.rankings.vaccinations, Palette::Greens)
        });
        Self {
            top_cases: BarSeries::from_ranking(ChartKind::TopCases, &run.rankings.cases, Palette::Reds),
            top_deaths: BarSeries::from_ranking(ChartKind::TopDeaths, &run.rankings.deaths, Palette::Greys),
            trend: TrendSeries::from_time_series(&run.trend, run.vaccinations_reported),
            bubbles: BubbleSeries::from_snapshot(&run.snapshot),
            top_vaccinations,
        }
    }

    /// Charts that have something to draw for this run.
    pub fn kinds(&self) -> Vec<ChartKind> {
        ChartKind::ALL
            .into_iter()
            .filter(|k| *k != ChartKind::TopVaccinations || self.top_vaccinations.is_some())
            .collect()
    }

    pub fn bars(&self, kind: ChartKind) -> Option<&BarSeries> {
        match kind {
            ChartKind::TopCases => Some(&self.top_cases),
            ChartKind::TopDeaths => Some(&self.top_deaths),
            ChartKind::TopVaccinations => self.top_vaccinations.as_ref(),
            ChartKind::GlobalTrend | ChartKind::CasesVsDeaths => None,
        }
    }
}

/// Compact axis label (`1.2M`, `350k`, `42`).
pub fn fmt_compact(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.0}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}
