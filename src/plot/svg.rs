//! SVG chart files.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::error::AppError;
use crate::plot::{ChartKind, ChartSet, ChartStyle, draw_chart};

/// Render one chart to an SVG document.
pub fn render_chart_svg(set: &ChartSet, kind: ChartKind, size: (u32, u32)) -> Result<String, AppError> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, size).into_drawing_area();
        draw_chart(&root, set, kind, &ChartStyle::svg())
            .map_err(|e| AppError::runtime(format!("Failed to draw chart '{}': {e}", kind.file_name())))?;
        root.present()
            .map_err(|e| AppError::runtime(format!("Failed to finish chart '{}': {e}", kind.file_name())))?;
    }
    Ok(buf)
}

/// Write every chart of the set into `out_dir` (created if missing).
pub fn write_charts(set: &ChartSet, out_dir: &Path, size: (u32, u32)) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(out_dir)
        .map_err(|e| AppError::runtime(format!("Failed to create chart directory '{}': {e}", out_dir.display())))?;

    let mut written = Vec::new();
    for kind in set.kinds() {
        let svg = render_chart_svg(set, kind, size)?;
        let path = out_dir.join(kind.file_name());
        fs::write(&path, svg)
            .map_err(|e| AppError::runtime(format!("Failed to write chart '{}': {e}", path.display())))?;
        info!(chart = %path.display(), "chart written");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Field, Metrics, RankEntry, Ranking, Record, RecordDate, Snapshot, TimePoint, TimeSeries};
    use crate::plot::{BarSeries, BubbleSeries, Palette, TrendSeries};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    fn sample_set() -> ChartSet {
        let ranking = Ranking {
            field: Field::TotalCases,
            entries: vec![
                RankEntry { entity: "Atlantis".to_string(), date: day(2), value: 1200.0 },
                RankEntry { entity: "Testland".to_string(), date: day(2), value: 150.0 },
            ],
        };
        let trend = TimeSeries {
            fields: vec![Field::NewCases, Field::NewDeaths],
            points: vec![
                TimePoint { date: day(1), values: vec![10.0, 1.0] },
                TimePoint { date: day(2), values: vec![20.0, 2.0] },
            ],
        };
        let mut metrics = Metrics::default();
        metrics.set(Field::TotalCases, Some(1200.0));
        metrics.set(Field::TotalDeaths, Some(30.0));
        metrics.set(Field::Population, Some(5e6));
        let snapshot = Snapshot {
            records: vec![Record {
                entity: "Atlantis".to_string(),
                date: RecordDate::Parsed(day(2)),
                metrics,
            }],
        };

        ChartSet {
            top_cases: BarSeries::from_ranking(ChartKind::TopCases, &ranking, Palette::Reds),
            top_deaths: BarSeries::from_ranking(ChartKind::TopDeaths, &Ranking::empty(Field::TotalDeaths), Palette::Greys),
            trend: TrendSeries::from_time_series(&trend, false),
            bubbles: BubbleSeries::from_snapshot(&snapshot),
            top_vaccinations: None,
        }
    }

    #[test]
    fn bar_chart_carries_title_and_names() {
        let svg = render_chart_svg(&sample_set(), ChartKind::TopCases, (800, 500)).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Top Countries by Total COVID-19 Cases"));
        assert!(svg.contains("Atlantis"));
        assert!(svg.contains("1,200"));
    }

    #[test]
    fn empty_ranking_renders_no_data() {
        let svg = render_chart_svg(&sample_set(), ChartKind::TopDeaths, (800, 500)).unwrap();
        assert!(svg.contains("No data"));
        assert!(svg.contains("Top Countries by Total COVID-19 Deaths"));
    }

    #[test]
    fn trend_and_bubbles_render() {
        let set = sample_set();
        let trend = render_chart_svg(&set, ChartKind::GlobalTrend, (800, 500)).unwrap();
        assert!(trend.contains("New Cases"));
        assert!(trend.contains("New Deaths"));
        assert!(!trend.contains("No data"));

        let bubbles = render_chart_svg(&set, ChartKind::CasesVsDeaths, (800, 500)).unwrap();
        assert!(bubbles.contains("<circle"));
    }

    #[test]
    fn write_charts_skips_unreported_vaccinations() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        let written = write_charts(&sample_set(), &out, (640, 400)).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["top_cases.svg", "top_deaths.svg", "global_trend.svg", "cases_vs_deaths.svg"]
        );
        assert!(out.join("top_cases.svg").exists());
        assert!(!out.join("top_vaccinations.svg").exists());
    }
}
