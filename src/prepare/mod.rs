//! Dataset preparation: cleaning and the derived views every report reads.
//!
//! Pipeline: `load` (see `io::ingest`) → `clean` → `snapshot` → `rank` /
//! `aggregate_over_time`. Nothing in here fails; bad rows are dropped and
//! gaps are zero-filled per the schema.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info};

use crate::domain::{Dataset, Field, RankEntry, Ranking, Record, RecordDate, Snapshot, TimePoint, TimeSeries};

pub mod dates;

pub use dates::parse_mixed_date;

/// Stand-in population for snapshot rows with an absent or zero population.
pub const POPULATION_SENTINEL: f64 = 1.0;

/// Resolve dates, drop rows whose date cannot be parsed, zero-fill gaps.
///
/// Idempotent: already-parsed dates and present values are left untouched.
pub fn clean(mut dataset: Dataset) -> Dataset {
    let before = dataset.records.len();
    dataset.records.retain_mut(resolve_date);
    let dropped = before - dataset.records.len();
    if dropped > 0 {
        info!(dropped, "dropped rows with unparseable dates");
    }
    dataset.dropped_rows += dropped;

    let fill = dataset.schema.zero_filled();
    for record in &mut dataset.records {
        for &field in &fill {
            record.metrics.fill(field, 0.0);
        }
    }

    debug!(rows = dataset.records.len(), "cleaned dataset");
    dataset
}

/// Parse a raw date in place; `false` means the row should be dropped.
fn resolve_date(record: &mut Record) -> bool {
    let parsed = match &record.date {
        RecordDate::Parsed(_) => return true,
        RecordDate::Raw(raw) => parse_mixed_date(raw),
    };
    match parsed {
        Some(d) => {
            record.date = RecordDate::Parsed(d);
            true
        }
        None => false,
    }
}

/// Latest record per entity.
///
/// Records are stable-sorted by date and the last one per entity is kept, so
/// among rows sharing an entity's latest date the one that appears last in
/// input order wins. Output order follows the date-sorted sequence. Rows whose
/// date is still raw, or whose entity is blank, are ignored.
pub fn snapshot(dataset: &Dataset) -> Snapshot {
    let mut ordered: Vec<&Record> = dataset
        .records
        .iter()
        .filter(|r| r.date().is_some() && r.has_entity())
        .collect();
    ordered.sort_by_key(|r| r.date());

    let mut last: HashMap<&str, usize> = HashMap::new();
    for (pos, record) in ordered.iter().enumerate() {
        last.insert(record.entity.as_str(), pos);
    }

    let mut keep: Vec<usize> = last.into_values().collect();
    keep.sort_unstable();

    let records = keep
        .into_iter()
        .map(|pos| {
            let mut record = ordered[pos].clone();
            let population = record.metrics.get(Field::Population).unwrap_or(0.0);
            if population == 0.0 {
                record.metrics.set(Field::Population, Some(POPULATION_SENTINEL));
            }
            record
        })
        .collect();

    Snapshot { records }
}

/// Top-`top_n` snapshot rows by `field`, descending.
///
/// The sort is stable: equal values keep snapshot order. Absent values count as zero.
pub fn rank(snapshot: &Snapshot, field: Field, top_n: usize) -> Ranking {
    let mut sorted: Vec<&Record> = snapshot.records.iter().collect();
    sorted.sort_by(|a, b| {
        let (a, b) = (a.metrics.get_or_zero(field), b.metrics.get_or_zero(field));
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });

    let entries = sorted
        .into_iter()
        .filter_map(|r| {
            Some(RankEntry {
                entity: r.entity.clone(),
                date: r.date()?,
                value: r.metrics.get_or_zero(field),
            })
        })
        .take(top_n)
        .collect();

    Ranking { field, entries }
}

/// Per-date sums of `fields` across all entities, ascending by date.
pub fn aggregate_over_time(dataset: &Dataset, fields: &[Field]) -> TimeSeries {
    let mut by_date: BTreeMap<chrono::NaiveDate, Vec<f64>> = BTreeMap::new();
    for record in &dataset.records {
        let Some(date) = record.date() else { continue };
        let sums = by_date.entry(date).or_insert_with(|| vec![0.0; fields.len()]);
        for (sum, &field) in sums.iter_mut().zip(fields) {
            *sum += record.metrics.get_or_zero(field);
        }
    }

    TimeSeries {
        fields: fields.to_vec(),
        points: by_date
            .into_iter()
            .map(|(date, values)| TimePoint { date, values })
            .collect(),
    }
}

/// Whether `field` was ever reported, i.e. sums to a positive value.
pub fn has_reported(dataset: &Dataset, field: Field) -> bool {
    let total: f64 = dataset
        .records
        .iter()
        .filter(|r| r.date().is_some())
        .map(|r| r.metrics.get_or_zero(field))
        .sum();
    total > 0.0
}

/// Number of distinct non-blank entities with a resolved date.
pub fn distinct_entities(dataset: &Dataset) -> usize {
    dataset
        .records
        .iter()
        .filter(|r| r.date().is_some() && r.has_entity())
        .map(|r| r.entity.as_str())
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Metrics, Schema};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn raw(entity: &str, date: &str, values: &[(Field, f64)]) -> Record {
        let mut metrics = Metrics::default();
        for &(f, v) in values {
            metrics.set(f, Some(v));
        }
        Record {
            entity: entity.to_string(),
            date: RecordDate::Raw(date.to_string()),
            metrics,
        }
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        Dataset {
            records,
            ..Dataset::empty(Schema::default())
        }
    }

    fn testland() -> Dataset {
        dataset(vec![
            raw("Testland", "2021-01-02", &[(Field::TotalCases, 20.0)]),
            raw("Testland", "2021-01-01", &[(Field::TotalCases, 10.0)]),
            raw("Testland", "2021-01-03", &[(Field::TotalCases, 30.0)]),
        ])
    }

    #[test]
    fn clean_drops_unparseable_dates_and_fills_zero() {
        let ds = dataset(vec![
            raw("A", "2021-01-01", &[]),
            raw("A", "not-a-date", &[(Field::TotalCases, 99.0)]),
        ]);
        let cleaned = clean(ds);
        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.dropped_rows, 1);

        let r = &cleaned.records[0];
        assert_eq!(r.date(), Some(d(2021, 1, 1)));
        for field in cleaned.schema.zero_filled() {
            assert_eq!(r.value(field), Some(0.0));
        }
        assert_eq!(r.value(Field::Population), None);
    }

    #[test]
    fn clean_is_idempotent() {
        let once = clean(testland());
        let twice = clean(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn snapshot_keeps_latest_row_per_entity() {
        let snap = snapshot(&clean(testland()));
        assert_eq!(snap.len(), 1);
        let r = snap.get("Testland").unwrap();
        assert_eq!(r.date(), Some(d(2021, 1, 3)));
        assert_eq!(r.value(Field::TotalCases), Some(30.0));
    }

    #[test]
    fn snapshot_date_ties_keep_last_input_row() {
        let ds = clean(dataset(vec![
            raw("A", "2021-01-05", &[(Field::TotalCases, 1.0)]),
            raw("A", "2021-01-05", &[(Field::TotalCases, 2.0)]),
            raw("A", "2021-01-04", &[(Field::TotalCases, 3.0)]),
        ]));
        let snap = snapshot(&ds);
        assert_eq!(snap.get("A").unwrap().value(Field::TotalCases), Some(2.0));
    }

    #[test]
    fn snapshot_orders_by_latest_date_and_sets_population_sentinel() {
        let ds = clean(dataset(vec![
            raw("B", "2021-01-03", &[(Field::Population, 0.0)]),
            raw("A", "2021-01-01", &[(Field::Population, 500.0)]),
            raw("C", "2021-01-02", &[]),
        ]));
        let snap = snapshot(&ds);
        let order: Vec<&str> = snap.records.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["A", "C", "B"]);
        assert_eq!(snap.get("A").unwrap().value(Field::Population), Some(500.0));
        assert_eq!(snap.get("B").unwrap().value(Field::Population), Some(POPULATION_SENTINEL));
        assert_eq!(snap.get("C").unwrap().value(Field::Population), Some(POPULATION_SENTINEL));
    }

    #[test]
    fn snapshot_ignores_uncleaned_rows() {
        let snap = snapshot(&testland());
        assert!(snap.is_empty());
    }

    #[test]
    fn rank_is_non_increasing_and_bounded() {
        let mut records = Vec::new();
        for i in 0..15 {
            records.push(raw(
                &format!("E{i:02}"),
                "2021-01-01",
                &[(Field::TotalDeaths, ((i * 7) % 11) as f64)],
            ));
        }
        let snap = snapshot(&clean(dataset(records)));

        let top = rank(&snap, Field::TotalDeaths, 10);
        assert_eq!(top.entries.len(), 10);
        assert!(top.entries.windows(2).all(|w| w[0].value >= w[1].value));

        let all = rank(&snap, Field::TotalDeaths, 100);
        assert_eq!(all.entries.len(), 15);
    }

    #[test]
    fn rank_ties_keep_snapshot_order() {
        let ds = clean(dataset(vec![
            raw("First", "2021-01-01", &[(Field::TotalCases, 5.0)]),
            raw("Second", "2021-01-02", &[(Field::TotalCases, 5.0)]),
        ]));
        let top = rank(&snapshot(&ds), Field::TotalCases, 10);
        assert_eq!(top.entries[0].entity, "First");
        assert_eq!(top.entries[1].entity, "Second");
    }

    #[test]
    fn aggregate_sums_per_date_in_order() {
        let ds = clean(dataset(vec![
            raw("A", "2021-01-02", &[(Field::NewCases, 3.0), (Field::NewDeaths, 1.0)]),
            raw("B", "2021-01-02", &[(Field::NewCases, 4.0)]),
            raw("A", "2021-01-01", &[(Field::NewCases, 1.0)]),
            raw("B", "garbage", &[(Field::NewCases, 100.0)]),
        ]));
        let ts = aggregate_over_time(&ds, &[Field::NewCases, Field::NewDeaths]);
        assert_eq!(ts.points.len(), 2);
        assert_eq!(ts.points[0].date, d(2021, 1, 1));
        assert_eq!(ts.points[0].values, vec![1.0, 0.0]);
        assert_eq!(ts.points[1].values, vec![7.0, 1.0]);
        assert_eq!(
            ts.series(Field::NewCases).unwrap(),
            vec![(d(2021, 1, 1), 1.0), (d(2021, 1, 2), 7.0)]
        );
        assert!(ts.series(Field::TotalCases).is_none());
    }

    #[test]
    fn invalid_date_row_never_reaches_derived_views() {
        let ds = clean(dataset(vec![
            raw("Ghost", "not-a-date", &[(Field::TotalCases, 1e9)]),
            raw("Real", "2021-01-01", &[(Field::TotalCases, 1.0)]),
        ]));
        let snap = snapshot(&ds);
        assert!(snap.get("Ghost").is_none());
        assert_eq!(rank(&snap, Field::TotalCases, 10).entries.len(), 1);
        let ts = aggregate_over_time(&ds, &[Field::TotalCases]);
        assert_eq!(ts.points[0].values, vec![1.0]);
        assert_eq!(distinct_entities(&ds), 1);
    }

    #[test]
    fn blank_entity_counts_in_sums_only() {
        let ds = clean(dataset(vec![
            raw("", "2021-01-01", &[(Field::TotalCases, 999.0), (Field::NewCases, 99.0)]),
            raw("  ", "2021-01-01", &[(Field::NewCases, 1.0)]),
            raw("A", "2021-01-01", &[(Field::TotalCases, 5.0), (Field::NewCases, 5.0)]),
        ]));

        let snap = snapshot(&ds);
        let entities: Vec<&str> = snap.records.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(entities, vec!["A"]);
        assert_eq!(distinct_entities(&ds), 1);

        let top = rank(&snap, Field::TotalCases, 10);
        assert_eq!(top.entries.len(), 1);
        assert_eq!(top.entries[0].entity, "A");

        let ts = aggregate_over_time(&ds, &[Field::NewCases]);
        assert_eq!(ts.points[0].values, vec![105.0]);
    }

    #[test]
    fn empty_dataset_gives_empty_views() {
        let ds = clean(dataset(Vec::new()));
        let snap = snapshot(&ds);
        assert!(snap.is_empty());
        assert!(rank(&snap, Field::TotalCases, 10).is_empty());
        assert!(aggregate_over_time(&ds, &[Field::NewCases]).is_empty());
        assert!(!has_reported(&ds, Field::TotalVaccinations));
        assert_eq!(distinct_entities(&ds), 0);
    }

    #[test]
    fn has_reported_requires_positive_total() {
        let ds = clean(dataset(vec![raw("A", "2021-01-01", &[(Field::TotalVaccinations, 3.0)])]));
        assert!(has_reported(&ds, Field::TotalVaccinations));
        assert!(!has_reported(&ds, Field::TotalCases));
    }
}
