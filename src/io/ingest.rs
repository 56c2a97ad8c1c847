//! CSV ingest and column projection.
//!
//! This module turns a wide epidemiological CSV (dozens of columns) into a
//! `Dataset` restricted to the declared schema.
//!
//! Design goals:
//! - **Required keys** (`location`, `date`) fail early with exit code 2
//! - **Optional columns** are substituted with empty values instead of failing
//! - **No cleaning here**: dates stay raw text and gaps stay absent until `prepare::clean`

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{Column, DataSource, Dataset, Field, Metrics, Presence, Record, RecordDate, Schema};
use crate::error::AppError;

/// Facts about the source file, kept for the dataset overview.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub label: String,
    /// Every header in the source, in file order.
    pub columns: Vec<String>,
    /// Data rows read (including malformed ones).
    pub rows_read: usize,
    /// Rows the CSV reader could not parse.
    pub malformed_rows: usize,
}

/// Loader output: projected dataset + source facts.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: Dataset,
    pub source: SourceInfo,
}

/// Load a dataset from a file path or URL.
pub fn load(source: &DataSource, schema: &Schema) -> Result<Loaded, AppError> {
    match source {
        DataSource::Path(path) => {
            let file = File::open(path)
                .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
            load_from_reader(file, &source.label(), schema)
        }
        DataSource::Url(url) => {
            let body = crate::data::fetch_csv(url)?;
            load_from_reader(body.as_bytes(), url, schema)
        }
    }
}

/// Load a dataset from any CSV reader.
pub fn load_from_reader<R: Read>(input: R, label: &str, schema: &Schema) -> Result<Loaded, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers from '{label}': {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let projection = project_columns(schema, &header_map)?;

    info!(
        source = label,
        columns = headers.len(),
        retained = projection.retained.len(),
        "loaded CSV header"
    );
    for field in &projection.substituted {
        info!(column = field.column_name(), "column not found, substituted with empty values");
    }

    let mut records = Vec::new();
    let mut rows_read = 0usize;
    let mut malformed_rows = 0usize;

    for (idx, result) in reader.records().enumerate() {
        rows_read += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                // +2: 1-based lines, plus the header row.
                debug!(line = idx + 2, error = %e, "skipping malformed CSV row");
                malformed_rows += 1;
                continue;
            }
        };
        records.push(project_row(&record, &projection));
    }

    if malformed_rows > 0 {
        warn!(malformed_rows, "skipped rows the CSV reader could not parse");
    }

    let dataset = Dataset {
        schema: schema.clone(),
        retained: projection.retained,
        substituted: projection.substituted,
        records,
        dropped_rows: 0,
    };

    Ok(Loaded {
        dataset,
        source: SourceInfo {
            label: label.to_string(),
            columns: headers.iter().map(str::to_string).collect(),
            rows_read,
            malformed_rows,
        },
    })
}

/// Resolved column positions for the schema.
#[derive(Debug)]
struct Projection {
    location: usize,
    date: usize,
    metrics: Vec<(Field, usize)>,
    retained: Vec<Column>,
    substituted: Vec<Field>,
}

fn project_columns(schema: &Schema, header_map: &HashMap<String, usize>) -> Result<Projection, AppError> {
    let mut location = None;
    let mut date = None;
    let mut metrics = Vec::new();
    let mut retained = Vec::new();
    let mut substituted = Vec::new();

    for spec in &schema.columns {
        let idx = if spec.included {
            header_map.get(spec.column.name()).copied()
        } else {
            None
        };

        let Some(idx) = idx else {
            if spec.presence == Presence::Required {
                return Err(AppError::input(format!(
                    "Missing required column: `{}`",
                    spec.column.name()
                )));
            }
            if let Column::Metric(field) = spec.column {
                substituted.push(field);
            }
            continue;
        };

        retained.push(spec.column);
        match spec.column {
            Column::Location => location = Some(idx),
            Column::Date => date = Some(idx),
            Column::Metric(field) => metrics.push((field, idx)),
        }
    }

    let location = location.ok_or_else(|| AppError::input("Schema does not declare a `location` column."))?;
    let date = date.ok_or_else(|| AppError::input("Schema does not declare a `date` column."))?;

    Ok(Projection {
        location,
        date,
        metrics,
        retained,
        substituted,
    })
}

fn project_row(record: &StringRecord, projection: &Projection) -> Record {
    let entity = record.get(projection.location).unwrap_or("").to_string();
    let date = record.get(projection.date).unwrap_or("").to_string();

    let mut metrics = Metrics::default();
    for &(field, idx) in &projection.metrics {
        metrics.set(field, parse_opt_f64(record.get(idx)));
    }

    Record {
        entity,
        date: RecordDate::Raw(date),
        metrics,
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
