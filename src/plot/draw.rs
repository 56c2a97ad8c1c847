//! Plotters drawing, generic over the backend.
//!
//! The same routines paint the SVG files and the TUI chart pane; only the
//! `ChartStyle` differs (fonts, label areas, marker shapes).

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::plot::{BarSeries, BubbleSeries, ChartKind, ChartSet, SAFE_PALETTE, TrendSeries, fmt_compact};
use crate::report::fmt_thousands;

/// Backend-specific look of a chart.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub background: RGBColor,
    pub foreground: RGBColor,
    /// Paint the background before drawing.
    pub fill_background: bool,
    pub show_caption: bool,
    pub caption_size: u32,
    pub label_size: u32,
    pub margin: u32,
    pub x_label_area: u32,
    pub y_label_area: u32,
    /// Left label area of bar charts (entity names).
    pub bar_label_area: u32,
    pub line_width: u32,
    /// Print the value at the end of each bar.
    pub value_labels: bool,
    /// Scaled circles for bubbles; plain pixels otherwise.
    pub circle_markers: bool,
    /// Diameter of the most populous bubble, in pixels.
    pub max_bubble: f64,
}

impl ChartStyle {
    pub fn svg() -> Self {
        Self {
            background: WHITE,
            foreground: BLACK,
            fill_background: true,
            show_caption: true,
            caption_size: 24,
            label_size: 14,
            margin: 15,
            x_label_area: 50,
            y_label_area: 70,
            bar_label_area: 160,
            line_width: 2,
            value_labels: true,
            circle_markers: true,
            max_bubble: 60.0,
        }
    }

    /// Terminal cells are low-res, so keep label areas compact.
    ///
    /// `plotters-ratatui-backend` maps circle radii incorrectly (pixel radius ->
    /// normalized canvas units), so bubbles are drawn as pixels here.
    pub fn terminal() -> Self {
        Self {
            background: BLACK,
            foreground: WHITE,
            fill_background: false,
            show_caption: false,
            caption_size: 10,
            label_size: 10,
            margin: 1,
            x_label_area: 3,
            y_label_area: 6,
            bar_label_area: 14,
            line_width: 1,
            value_labels: false,
            circle_markers: false,
            max_bubble: 1.0,
        }
    }

    fn caption_font(&self) -> TextStyle<'static> {
        ("sans-serif", self.caption_size).into_font().color(&self.foreground)
    }

    fn label_font(&self) -> TextStyle<'static> {
        ("sans-serif", self.label_size).into_font().color(&self.foreground)
    }
}

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Draw one chart of the set onto `root`.
pub fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    set: &ChartSet,
    kind: ChartKind,
    style: &ChartStyle,
) -> DrawResult<DB> {
    if style.fill_background {
        root.fill(&style.background)?;
    }

    match kind {
        ChartKind::GlobalTrend => draw_trend(root, kind.title(), &set.trend, style),
        ChartKind::CasesVsDeaths => draw_bubbles(root, kind.title(), &set.bubbles, style),
        ChartKind::TopCases | ChartKind::TopDeaths | ChartKind::TopVaccinations => match set.bars(kind) {
            Some(bars) => draw_bars(root, bars, style),
            None => draw_no_data(root, kind.title(), style),
        },
    }
}

fn draw_bars<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, bars: &BarSeries, style: &ChartStyle) -> DrawResult<DB> {
    if bars.bars.is_empty() {
        return draw_no_data(root, bars.title, style);
    }

    let n = bars.bars.len() as i32;
    // Headroom for the value labels.
    let x_max = bars.max_value().max(1.0) * if style.value_labels { 1.15 } else { 1.02 };

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(style.margin)
        .x_label_area_size(style.x_label_area)
        .y_label_area_size(style.bar_label_area);
    if style.show_caption {
        builder.caption(bars.title, style.caption_font());
    }
    let mut chart = builder.build_cartesian_2d(0f64..x_max, (0..n).into_segmented())?;

    // Rank 0 sits in the top slot.
    let slot = |rank: usize| n - 1 - rank as i32;
    let name_at = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(s) if (0..n).contains(s) => bars.bars[(n - 1 - s) as usize].0.clone(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(bars.bars.len() + 1)
        .x_labels(6)
        .x_desc(bars.value_label)
        .x_label_formatter(&|v| fmt_compact(*v))
        .y_label_formatter(&name_at)
        .label_style(style.label_font())
        .axis_desc_style(style.label_font())
        .axis_style(style.foreground)
        .bold_line_style(style.foreground.mix(0.2))
        .light_line_style(style.foreground.mix(0.05))
        .draw()?;

    let len = bars.bars.len();
    chart.draw_series(bars.bars.iter().enumerate().map(|(rank, (_, value))| {
        let color = bars.palette.shade(rank, len);
        let mut rect = Rectangle::new(
            [(0.0, SegmentValue::Exact(slot(rank))), (*value, SegmentValue::Exact(slot(rank) + 1))],
            color.filled(),
        );
        rect.set_margin(2, 2, 0, 0);
        rect
    }))?;

    if style.value_labels {
        chart.draw_series(bars.bars.iter().enumerate().map(|(rank, (_, value))| {
            Text::new(
                format!(" {}", fmt_thousands(*value)),
                (*value, SegmentValue::CenterOf(slot(rank))),
                style.label_font(),
            )
        }))?;
    }

    Ok(())
}

fn draw_trend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    trend: &TrendSeries,
    style: &ChartStyle,
) -> DrawResult<DB> {
    if trend.is_empty() {
        return draw_no_data(root, title, style);
    }

    let (x0, x1) = trend.x_bounds();
    let (y0, y1) = trend.y_bounds();

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(style.margin)
        .x_label_area_size(style.x_label_area)
        .y_label_area_size(style.y_label_area);
    if style.show_caption {
        builder.caption(title, style.caption_font());
    }
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .y_labels(6)
        .x_desc("Date")
        .y_desc("Count")
        .x_label_formatter(&|v| {
            trend
                .date_at(*v)
                .map(|d| d.format("%Y-%m").to_string())
                .unwrap_or_default()
        })
        .y_label_formatter(&|v| fmt_compact(*v))
        .label_style(style.label_font())
        .axis_desc_style(style.label_font())
        .axis_style(style.foreground)
        .bold_line_style(style.foreground.mix(0.2))
        .light_line_style(style.foreground.mix(0.05))
        .draw()?;

    for line in &trend.lines {
        let color = line.color;
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), color.stroke_width(style.line_width)))?
            .label(line.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(style.label_font())
        .background_style(style.background.mix(0.8))
        .border_style(style.foreground)
        .draw()?;

    Ok(())
}

fn draw_bubbles<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    bubbles: &BubbleSeries,
    style: &ChartStyle,
) -> DrawResult<DB> {
    if bubbles.is_empty() {
        return draw_no_data(root, title, style);
    }

    let (x0, x1) = bubbles.x_bounds();
    let (y0, y1) = bubbles.y_bounds();

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(style.margin)
        .x_label_area_size(style.x_label_area)
        .y_label_area_size(style.y_label_area);
    if style.show_caption {
        builder.caption(title, style.caption_font());
    }
    let mut chart = builder.build_cartesian_2d((x0..x1).log_scale(), (y0..y1).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("Total Cases (log)")
        .y_desc("Total Deaths (log)")
        .x_label_formatter(&|v| fmt_compact(*v))
        .y_label_formatter(&|v| fmt_compact(*v))
        .label_style(style.label_font())
        .axis_desc_style(style.label_font())
        .axis_style(style.foreground)
        .bold_line_style(style.foreground.mix(0.2))
        .light_line_style(style.foreground.mix(0.05))
        .draw()?;

    let color_of = |i: usize| SAFE_PALETTE[i % SAFE_PALETTE.len()];

    if style.circle_markers {
        chart.draw_series(bubbles.bubbles.iter().enumerate().map(|(i, b)| {
            let radius = bubbles.radius(b, style.max_bubble).round() as u32;
            Circle::new((b.cases, b.deaths), radius, color_of(i).mix(0.7).filled())
        }))?;
    } else {
        chart.draw_series(
            bubbles
                .bubbles
                .iter()
                .enumerate()
                .map(|(i, b)| Pixel::new((b.cases, b.deaths), color_of(i))),
        )?;
    }

    Ok(())
}

/// Title plus a centred "No data" note.
fn draw_no_data<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, title: &str, style: &ChartStyle) -> DrawResult<DB> {
    let (w, h) = root.dim_in_pixel();
    let centred = |font: TextStyle<'static>| font.pos(Pos::new(HPos::Center, VPos::Center));

    if style.show_caption {
        root.draw_text(title, &centred(style.caption_font()), (w as i32 / 2, style.caption_size as i32))?;
    }
    root.draw_text("No data", &centred(style.label_font()), (w as i32 / 2, h as i32 / 2))?;
    Ok(())
}
