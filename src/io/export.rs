//! Export derived tables to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use crate::domain::{Field, Snapshot, TimeSeries};
use crate::error::AppError;

/// Write the per-entity snapshot: `location,date,<every field>`.
pub fn write_snapshot_csv(path: &Path, snapshot: &Snapshot) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;

    let mut header = vec!["location", "date"];
    header.extend(Field::ALL.iter().map(|f| f.column_name()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::runtime(format!("Failed to write export CSV header: {e}")))?;

    for r in &snapshot.records {
        let mut row = vec![
            r.entity.clone(),
            r.date().map(|d| d.to_string()).unwrap_or_default(),
        ];
        row.extend(Field::ALL.iter().map(|&f| r.value(f).map(fmt_cell).unwrap_or_default()));
        writer
            .write_record(&row)
            .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush export CSV: {e}")))
}

/// Write the global time series: `date,<aggregated fields>`.
pub fn write_trend_csv(path: &Path, trend: &TimeSeries) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;

    let mut header = vec!["date"];
    header.extend(trend.fields.iter().map(|f| f.column_name()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::runtime(format!("Failed to write export CSV header: {e}")))?;

    for p in &trend.points {
        let mut row = vec![p.date.to_string()];
        row.extend(p.values.iter().map(|&v| fmt_cell(v)));
        writer
            .write_record(&row)
            .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush export CSV: {e}")))
}

fn create_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::runtime(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    Ok(csv::Writer::from_writer(file))
}

fn fmt_cell(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_have_no_decimals() {
        assert_eq!(fmt_cell(1200.0), "1200");
        assert_eq!(fmt_cell(0.5), "0.5");
    }
}
