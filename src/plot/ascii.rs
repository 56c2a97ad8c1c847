//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - ranking bars: `#`
//! - trend line: `-`

use crate::domain::{Field, Ranking, TimeSeries};
use crate::report::fmt_thousands;

const MAX_LABEL: usize = 20;

/// Horizontal bars for a ranking, one row per entry, scaled to the top value.
pub fn render_ascii_bars(ranking: &Ranking, width: usize) -> String {
    let mut out = format!(
        "{} (top {})\n",
        ranking.field.display_name(),
        ranking.entries.len()
    );
    if ranking.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let labels: Vec<String> = ranking
        .entries
        .iter()
        .map(|e| e.entity.chars().take(MAX_LABEL).collect())
        .collect();
    let values: Vec<String> = ranking.entries.iter().map(|e| fmt_thousands(e.value)).collect();
    let label_w = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let value_w = values.iter().map(|v| v.len()).max().unwrap_or(0);
    let bar_w = width.saturating_sub(label_w + 2 + value_w + 1).max(1);

    let max = ranking.entries.iter().map(|e| e.value).fold(0.0, f64::max);
    for ((entry, label), value) in ranking.entries.iter().zip(&labels).zip(&values) {
        let len = if max > 0.0 {
            ((entry.value.max(0.0) / max) * bar_w as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!("{label:<label_w$} |{} {value}\n", "#".repeat(len)));
    }
    out
}

/// Line plot of one aggregated field against its dates.
pub fn render_ascii_trend(trend: &TimeSeries, field: Field, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let series = trend.series(field).unwrap_or_default();
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return format!("{}: (no data)\n", field.display_name());
    };
    let (start, end) = (first.0, last.0);

    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|&(d, v)| ((d - start).num_days() as f64, v))
        .collect();
    let x_max = points.last().map(|p| p.0).unwrap_or(0.0).max(1.0);
    let (y_lo, y_hi) = y_range(&points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_lo, y_hi, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, &points, 0.0, x_max, y_min, y_max);

    let mut out = format!(
        "{}: {start} .. {end} | y=[{y_lo:.0}, {y_hi:.0}]\n",
        field.display_name()
    );
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn y_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat series: centre it.
        Some((min_y - 1.0, min_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], points: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        let xx = map_x(x, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, '-');
        } else {
            grid[yy][xx] = '-';
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
