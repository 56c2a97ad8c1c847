//! Reporting: rankings, insight lines, descriptive statistics, and text formatting.

use serde::Serialize;

use crate::domain::{Dataset, Field, Ranking, Snapshot};
use crate::prepare;

pub mod format;
pub mod stats;

pub use format::*;
pub use stats::{ColumnSummary, Distribution, date_range, describe};

/// The three top-N tables shown by every front-end.
#[derive(Debug, Clone, Serialize)]
pub struct Rankings {
    pub cases: Ranking,
    pub deaths: Ranking,
    /// Empty when vaccinations were never reported.
    pub vaccinations: Ranking,
}

/// Rank the snapshot by cases, deaths and (when reported) vaccinations.
pub fn build_rankings(dataset: &Dataset, snapshot: &Snapshot, top_n: usize) -> Rankings {
    let vaccinations = if prepare::has_reported(dataset, Field::TotalVaccinations) {
        prepare::rank(snapshot, Field::TotalVaccinations, top_n)
    } else {
        Ranking::empty(Field::TotalVaccinations)
    };

    Rankings {
        cases: prepare::rank(snapshot, Field::TotalCases, top_n),
        deaths: prepare::rank(snapshot, Field::TotalDeaths, top_n),
        vaccinations,
    }
}

/// One-line takeaways printed at the end of the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    pub entities_tracked: usize,
    pub highest_cases: Option<String>,
    pub highest_deaths: Option<String>,
    /// `None` when vaccinations were never reported.
    pub highest_vaccinations: Option<String>,
}

pub fn build_insights(dataset: &Dataset, snapshot: &Snapshot) -> Insights {
    let highest_vaccinations = if prepare::has_reported(dataset, Field::TotalVaccinations) {
        leader(snapshot, Field::TotalVaccinations)
    } else {
        None
    };

    Insights {
        entities_tracked: prepare::distinct_entities(dataset),
        highest_cases: leader(snapshot, Field::TotalCases),
        highest_deaths: leader(snapshot, Field::TotalDeaths),
        highest_vaccinations,
    }
}

/// Entity holding the maximum of `field`; the first one in snapshot order on ties.
pub fn leader(snapshot: &Snapshot, field: Field) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for record in &snapshot.records {
        let value = record.metrics.get_or_zero(field);
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((record.entity.as_str(), value)),
        }
    }
    best.map(|(entity, _)| entity.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metrics, Record, RecordDate, Schema};

    fn dataset(rows: &[(&str, &str, f64, f64)]) -> Dataset {
        let records = rows
            .iter()
            .map(|&(entity, date, cases, vax)| {
                let mut metrics = Metrics::default();
                metrics.set(Field::TotalCases, Some(cases));
                metrics.set(Field::TotalVaccinations, Some(vax));
                Record {
                    entity: entity.to_string(),
                    date: RecordDate::Raw(date.to_string()),
                    metrics,
                }
            })
            .collect();
        prepare::clean(Dataset {
            records,
            ..Dataset::empty(Schema::default())
        })
    }

    #[test]
    fn leader_prefers_first_maximum() {
        let ds = dataset(&[("A", "2021-01-01", 5.0, 0.0), ("B", "2021-01-02", 5.0, 0.0)]);
        let snap = prepare::snapshot(&ds);
        assert_eq!(leader(&snap, Field::TotalCases).as_deref(), Some("A"));
        assert_eq!(leader(&Snapshot::default(), Field::TotalCases), None);
    }

    #[test]
    fn unreported_vaccinations_yield_empty_ranking_and_no_insight() {
        let ds = dataset(&[("A", "2021-01-01", 5.0, 0.0), ("B", "2021-01-01", 7.0, 0.0)]);
        let snap = prepare::snapshot(&ds);

        let rankings = build_rankings(&ds, &snap, 10);
        assert!(rankings.vaccinations.is_empty());
        assert_eq!(rankings.cases.entries[0].entity, "B");

        let insights = build_insights(&ds, &snap);
        assert_eq!(insights.entities_tracked, 2);
        assert_eq!(insights.highest_cases.as_deref(), Some("B"));
        assert_eq!(insights.highest_vaccinations, None);
    }

    #[test]
    fn reported_vaccinations_are_ranked() {
        let ds = dataset(&[("A", "2021-01-01", 1.0, 9.0), ("B", "2021-01-01", 7.0, 3.0)]);
        let snap = prepare::snapshot(&ds);
        let rankings = build_rankings(&ds, &snap, 10);
        assert_eq!(rankings.vaccinations.entries[0].entity, "A");
        assert_eq!(build_insights(&ds, &snap).highest_vaccinations.as_deref(), Some("A"));
    }
}
