//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built by the CSV loader
//! - reshaped by the preparation pipeline
//! - exported to CSV/JSON and drawn by the chart layer

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Numeric columns carried by every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Field {
    TotalCases,
    NewCases,
    TotalDeaths,
    NewDeaths,
    TotalVaccinations,
    Population,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::TotalCases,
        Field::NewCases,
        Field::TotalDeaths,
        Field::NewDeaths,
        Field::TotalVaccinations,
        Field::Population,
    ];

    /// Column header in the source CSV.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::TotalCases => "total_cases",
            Field::NewCases => "new_cases",
            Field::TotalDeaths => "total_deaths",
            Field::NewDeaths => "new_deaths",
            Field::TotalVaccinations => "total_vaccinations",
            Field::Population => "population",
        }
    }

    /// Human-readable label for terminal output and chart axes.
    pub fn display_name(self) -> &'static str {
        match self {
            Field::TotalCases => "Total Cases",
            Field::NewCases => "New Cases",
            Field::TotalDeaths => "Total Deaths",
            Field::NewDeaths => "New Deaths",
            Field::TotalVaccinations => "Total Vaccinations",
            Field::Population => "Population",
        }
    }

    /// Running totals, as opposed to daily deltas.
    pub fn is_cumulative(self) -> bool {
        matches!(self, Field::TotalCases | Field::TotalDeaths | Field::TotalVaccinations)
    }

    fn index(self) -> usize {
        match self {
            Field::TotalCases => 0,
            Field::NewCases => 1,
            Field::TotalDeaths => 2,
            Field::NewDeaths => 3,
            Field::TotalVaccinations => 4,
            Field::Population => 5,
        }
    }
}

/// Every column the loader knows how to project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Location,
    Date,
    Metric(Field),
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Location => "location",
            Column::Date => "date",
            Column::Metric(field) => field.column_name(),
        }
    }
}

/// Whether the loader may substitute a placeholder when the column is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Loading fails when the column is missing.
    Required,
    /// A column of empty values is substituted when missing.
    Optional,
}

/// What `clean` does with absent values of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Leave absent values alone.
    Keep,
    /// Replace absent values with `0`.
    Zero,
}

/// One entry of the declared schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub column: Column,
    pub presence: Presence,
    pub fill: Fill,
    /// Excluded columns are treated as absent from the source.
    pub included: bool,
}

/// Declared input schema: `{column: presence + fill policy}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub columns: Vec<ColumnSpec>,
}

impl Default for Schema {
    fn default() -> Self {
        let keyed = |column, presence| ColumnSpec {
            column,
            presence,
            fill: Fill::Keep,
            included: true,
        };
        let metric = |field, fill| ColumnSpec {
            column: Column::Metric(field),
            presence: Presence::Optional,
            fill,
            included: true,
        };

        Self {
            columns: vec![
                keyed(Column::Location, Presence::Required),
                keyed(Column::Date, Presence::Required),
                metric(Field::TotalCases, Fill::Zero),
                metric(Field::NewCases, Fill::Zero),
                metric(Field::TotalDeaths, Fill::Zero),
                metric(Field::NewDeaths, Fill::Zero),
                metric(Field::TotalVaccinations, Fill::Zero),
                metric(Field::Population, Fill::Keep),
            ],
        }
    }
}

impl Schema {
    /// Default schema with the given optional fields switched off.
    pub fn without(fields: &[Field]) -> Self {
        let mut schema = Self::default();
        for spec in &mut schema.columns {
            if let Column::Metric(field) = spec.column {
                if fields.contains(&field) {
                    spec.included = false;
                }
            }
        }
        schema
    }

    pub fn spec(&self, column: Column) -> Option<&ColumnSpec> {
        self.columns.iter().find(|s| s.column == column)
    }

    /// Fields whose absent values `clean` replaces with zero.
    pub fn zero_filled(&self) -> Vec<Field> {
        self.columns
            .iter()
            .filter(|s| s.fill == Fill::Zero)
            .filter_map(|s| match s.column {
                Column::Metric(field) => Some(field),
                _ => None,
            })
            .collect()
    }
}

/// Numeric values of one record, indexed by `Field`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    values: [Option<f64>; 6],
}

impl Metrics {
    pub fn get(&self, field: Field) -> Option<f64> {
        self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: Option<f64>) {
        self.values[field.index()] = value;
    }

    /// Absent counts as zero.
    pub fn get_or_zero(&self, field: Field) -> f64 {
        self.get(field).unwrap_or(0.0)
    }

    /// Replace an absent value; present values are left alone.
    pub fn fill(&mut self, field: Field, value: f64) {
        let slot = &mut self.values[field.index()];
        if slot.is_none() {
            *slot = Some(value);
        }
    }
}

/// Date cell of a record: raw text until `clean` resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDate {
    Raw(String),
    Parsed(NaiveDate),
}

/// One row per (entity, date).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub entity: String,
    pub date: RecordDate,
    pub metrics: Metrics,
}

impl Record {
    /// Resolved calendar date, if `clean` has parsed it.
    pub fn date(&self) -> Option<NaiveDate> {
        match self.date {
            RecordDate::Parsed(d) => Some(d),
            RecordDate::Raw(_) => None,
        }
    }

    pub fn value(&self, field: Field) -> Option<f64> {
        self.metrics.get(field)
    }

    /// Blank entity cells are kept for per-date sums but never form an entity.
    pub fn has_entity(&self) -> bool {
        !self.entity.trim().is_empty()
    }
}

/// The full (projected) table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Schema in force when the dataset was loaded.
    pub schema: Schema,
    /// Schema columns found in the source, in schema order.
    pub retained: Vec<Column>,
    /// Optional columns that were missing (or excluded) and substituted with empty values.
    pub substituted: Vec<Field>,
    pub records: Vec<Record>,
    /// Rows removed by `clean` because their date could not be parsed.
    pub dropped_rows: usize,
}

impl Dataset {
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            retained: Vec::new(),
            substituted: Vec::new(),
            records: Vec::new(),
            dropped_rows: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Most-recent record per entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub records: Vec<Record>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, entity: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.entity == entity)
    }
}

/// One row of a top-N ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub entity: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// Top-N entities by one field, descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub field: Field,
    pub entries: Vec<RankEntry>,
}

impl Ranking {
    pub fn empty(field: Field) -> Self {
        Self {
            field,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-date sums of the requested fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub fields: Vec<Field>,
    pub points: Vec<TimePoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    pub date: NaiveDate,
    /// Same order as `TimeSeries::fields`.
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(date, value)` pairs for one field, or `None` if it was not aggregated.
    pub fn series(&self, field: Field) -> Option<Vec<(NaiveDate, f64)>> {
        let idx = self.fields.iter().position(|f| *f == field)?;
        Some(self.points.iter().map(|p| (p.date, p.values[idx])).collect())
    }
}

/// Where the raw CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn label(&self) -> String {
        match self {
            DataSource::Path(p) => p.display().to_string(),
            DataSource::Url(u) => u.clone(),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: DataSource,
    pub schema: Schema,
    pub top_n: usize,

    pub plot: bool,
    pub plot_width: usize,

    pub export_snapshot: Option<PathBuf>,
    pub export_trend: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,
}
