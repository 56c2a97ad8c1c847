//! Descriptive statistics for the numeric columns of a cleaned dataset.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Dataset, Field};

/// Summary of one numeric column. Absent values are skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub field: Field,
    pub count: usize,
    /// `None` when the column has no values.
    pub distribution: Option<Distribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Summaries for every schema field, in `Field::ALL` order.
pub fn describe(dataset: &Dataset) -> Vec<ColumnSummary> {
    Field::ALL
        .iter()
        .map(|&field| {
            let mut values: Vec<f64> = dataset.records.iter().filter_map(|r| r.value(field)).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            ColumnSummary {
                field,
                count: values.len(),
                distribution: distribution(&values),
            }
        })
        .collect()
}

/// Earliest and latest resolved dates.
pub fn date_range(dataset: &Dataset) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = dataset.records.iter().filter_map(|r| r.date());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// `sorted` must be ascending.
fn distribution(sorted: &[f64]) -> Option<Distribution> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n as f64 - 1.0)).sqrt()
    });

    Some(Distribution {
        mean,
        std,
        min: sorted[0],
        q25: quantile(sorted, 0.25),
        median: quantile(sorted, 0.5),
        q75: quantile(sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metrics, Record, RecordDate, Schema};

    fn row(date: NaiveDate, cases: Option<f64>) -> Record {
        let mut metrics = Metrics::default();
        metrics.set(Field::TotalCases, cases);
        Record {
            entity: "A".to_string(),
            date: RecordDate::Parsed(date),
            metrics,
        }
    }

    #[test]
    fn describe_matches_hand_computed_values() {
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let ds = Dataset {
            records: vec![
                row(d, Some(1.0)),
                row(d, Some(2.0)),
                row(d, Some(3.0)),
                row(d, Some(4.0)),
                row(d, None),
            ],
            ..Dataset::empty(Schema::default())
        };

        let summary = describe(&ds);
        let cases = summary.iter().find(|s| s.field == Field::TotalCases).unwrap();
        assert_eq!(cases.count, 4);
        let dist = cases.distribution.as_ref().unwrap();
        assert!((dist.mean - 2.5).abs() < 1e-12);
        assert!((dist.std.unwrap() - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert!((dist.q25 - 1.75).abs() < 1e-12);
        assert!((dist.median - 2.5).abs() < 1e-12);
        assert!((dist.q75 - 3.25).abs() < 1e-12);
        assert_eq!(dist.min, 1.0);
        assert_eq!(dist.max, 4.0);

        let pop = summary.iter().find(|s| s.field == Field::Population).unwrap();
        assert_eq!(pop.count, 0);
        assert!(pop.distribution.is_none());
    }

    #[test]
    fn single_value_has_no_std() {
        let dist = distribution(&[5.0]).unwrap();
        assert_eq!(dist.std, None);
        assert_eq!(dist.median, 5.0);
    }

    #[test]
    fn date_range_spans_records() {
        let a = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let ds = Dataset {
            records: vec![row(a, None), row(b, None)],
            ..Dataset::empty(Schema::default())
        };
        assert_eq!(date_range(&ds), Some((b, a)));
        assert_eq!(date_range(&Dataset::empty(Schema::default())), None);
    }
}
