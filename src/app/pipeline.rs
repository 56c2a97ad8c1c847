//! Shared preparation pipeline used by every front-end (report, charts, TUI).
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> clean -> snapshot -> rank -> aggregate -> describe -> insights
//!
//! The front-ends can then focus on presentation (printing, SVG files, widgets).

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{Dataset, Field, Record, RunConfig, Snapshot, TimeSeries};
use crate::error::AppError;
use crate::io::ingest::{Loaded, SourceInfo};
use crate::prepare;
use crate::report::{ColumnSummary, Insights, Rankings};

/// Rows shown in the dataset overview.
pub const HEAD_ROWS: usize = 5;

/// Fields summed per date for the global trend.
pub const TREND_FIELDS: [Field; 3] = [Field::NewCases, Field::NewDeaths, Field::TotalVaccinations];

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: SourceInfo,
    /// First rows as loaded (before cleaning).
    pub head: Vec<Record>,
    /// Cleaned dataset.
    pub dataset: Dataset,
    pub snapshot: Snapshot,
    pub rankings: Rankings,
    pub trend: TimeSeries,
    pub summary: Vec<ColumnSummary>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub insights: Insights,
    /// Whether any vaccinations were reported at all.
    pub vaccinations_reported: bool,
}

/// Load the configured source and run the full pipeline.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    let loaded = crate::io::ingest::load(&config.source, &config.schema)?;
    Ok(run_from_loaded(loaded, config.top_n))
}

/// Run the pipeline on an already-loaded dataset.
///
/// Nothing past loading can fail: empty intermediate results flow through as empty outputs.
pub fn run_from_loaded(loaded: Loaded, top_n: usize) -> RunOutput {
    let Loaded { dataset, source } = loaded;
    let head: Vec<Record> = dataset.records.iter().take(HEAD_ROWS).cloned().collect();

    let dataset = prepare::clean(dataset);
    let snapshot = prepare::snapshot(&dataset);
    let rankings = crate::report::build_rankings(&dataset, &snapshot, top_n);
    let trend = prepare::aggregate_over_time(&dataset, &TREND_FIELDS);
    let summary = crate::report::describe(&dataset);
    let date_range = crate::report::date_range(&dataset);
    let insights = crate::report::build_insights(&dataset, &snapshot);
    let vaccinations_reported = prepare::has_reported(&dataset, Field::TotalVaccinations);

    info!(
        rows = dataset.records.len(),
        entities = snapshot.len(),
        dates = trend.points.len(),
        "pipeline finished"
    );

    RunOutput {
        source,
        head,
        dataset,
        snapshot,
        rankings,
        trend,
        summary,
        date_range,
        insights,
        vaccinations_reported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Schema;
    use crate::io::ingest::load_from_reader;

    const CSV: &str = "\
location,date,total_cases,new_cases,total_deaths,new_deaths,population
Testland,2021-01-01,10,10,1,1,1000
Testland,2021-01-02,20,10,2,1,1000
Testland,2021-01-03,30,10,3,1,1000
Otherland,2021-01-03,50,50,,,
Otherland,not-a-date,999,999,99,99,
";

    #[test]
    fn runs_end_to_end_without_vaccinations() {
        let loaded = load_from_reader(CSV.as_bytes(), "inline", &Schema::default()).unwrap();
        let run = run_from_loaded(loaded, 10);

        assert_eq!(run.head.len(), HEAD_ROWS);
        assert_eq!(run.dataset.records.len(), 4);
        assert_eq!(run.dataset.dropped_rows, 1);
        assert_eq!(run.snapshot.len(), 2);

        assert_eq!(run.rankings.cases.entries[0].entity, "Otherland");
        assert_eq!(run.rankings.deaths.entries[0].entity, "Testland");
        assert!(run.rankings.vaccinations.is_empty());
        assert!(!run.vaccinations_reported);

        let new_cases = run.trend.series(Field::NewCases).unwrap();
        assert_eq!(new_cases.last().unwrap().1, 60.0);
        assert_eq!(run.insights.entities_tracked, 2);
        assert_eq!(run.insights.highest_vaccinations, None);

        let (first, last) = run.date_range.unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2021, 1, 3).unwrap());
    }

    #[test]
    fn blank_location_never_leads_a_ranking() {
        let csv = "location,date,total_cases,total_deaths\n,2021-01-01,999,99\nA,2021-01-01,5,1\n";
        let loaded = load_from_reader(csv.as_bytes(), "inline", &Schema::default()).unwrap();
        let run = run_from_loaded(loaded, 10);

        assert_eq!(run.dataset.records.len(), 2);
        assert_eq!(run.snapshot.len(), 1);
        assert_eq!(run.insights.entities_tracked, 1);
        assert_eq!(run.insights.highest_cases.as_deref(), Some("A"));
        assert_eq!(run.rankings.cases.entries.len(), 1);
        assert_eq!(run.rankings.cases.entries[0].entity, "A");
    }

    #[test]
    fn header_only_input_yields_empty_outputs() {
        let csv = "location,date,total_cases\n";
        let loaded = load_from_reader(csv.as_bytes(), "inline", &Schema::default()).unwrap();
        let run = run_from_loaded(loaded, 10);

        assert!(run.dataset.is_empty());
        assert!(run.snapshot.is_empty());
        assert!(run.rankings.cases.is_empty());
        assert!(run.trend.is_empty());
        assert_eq!(run.date_range, None);
        assert_eq!(run.insights.highest_cases, None);
    }
}
