//! Read/write the run summary JSON.
//!
//! The summary is the portable result of a run:
//! - source facts (label, shape, projection outcome)
//! - entity count and date range
//! - the three rankings and the insight lines

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app::pipeline::RunOutput;
use crate::domain::{Field, Ranking};
use crate::error::AppError;
use crate::report::Insights;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryFile {
    pub tool: String,
    pub source: String,
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_dropped: usize,
    pub columns_retained: Vec<String>,
    pub columns_substituted: Vec<Field>,
    pub entities: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub rankings: Vec<Ranking>,
    pub insights: SummaryInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryInsights {
    pub highest_cases: Option<String>,
    pub highest_deaths: Option<String>,
    pub highest_vaccinations: Option<String>,
}

impl From<&Insights> for SummaryInsights {
    fn from(value: &Insights) -> Self {
        Self {
            highest_cases: value.highest_cases.clone(),
            highest_deaths: value.highest_deaths.clone(),
            highest_vaccinations: value.highest_vaccinations.clone(),
        }
    }
}

impl SummaryFile {
    pub fn from_run(run: &RunOutput) -> Self {
        Self {
            tool: "covid".to_string(),
            source: run.source.label.clone(),
            rows_read: run.source.rows_read,
            rows_used: run.dataset.records.len(),
            rows_dropped: run.dataset.dropped_rows,
            columns_retained: run.dataset.retained.iter().map(|c| c.name().to_string()).collect(),
            columns_substituted: run.dataset.substituted.clone(),
            entities: run.insights.entities_tracked,
            first_date: run.date_range.map(|(first, _)| first),
            last_date: run.date_range.map(|(_, last)| last),
            rankings: vec![
                run.rankings.cases.clone(),
                run.rankings.deaths.clone(),
                run.rankings.vaccinations.clone(),
            ],
            insights: SummaryInsights::from(&run.insights),
        }
    }
}

/// Write a summary JSON file.
pub fn write_summary_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::runtime(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &SummaryFile::from_run(run))
        .map_err(|e| AppError::runtime(format!("Failed to write summary JSON: {e}")))
}

/// Read a summary JSON file.
pub fn read_summary_json(path: &Path) -> Result<SummaryFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open summary JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid summary JSON: {e}")))
}
