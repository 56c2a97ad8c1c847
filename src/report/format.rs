//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the preparation code stays clean and testable
//! - output changes are localized

use chrono::NaiveDate;

use crate::app::pipeline::RunOutput;
use crate::domain::{Column, Field, Ranking, Record, RecordDate, TimeSeries};
use crate::io::ingest::SourceInfo;
use crate::report::{ColumnSummary, Insights, Rankings};

/// How many source columns the overview lists.
const OVERVIEW_COLUMNS: usize = 10;

/// Format the full text report (overview, statistics, rankings, trend, insights).
pub fn format_report(run: &RunOutput) -> String {
    let mut out = String::new();
    out.push_str(&format_overview(&run.source, &run.dataset.retained, &run.dataset.substituted));
    out.push('\n');
    out.push_str(&format_head(&run.head));
    out.push('\n');
    out.push_str(&format_summary(
        &run.summary,
        run.date_range,
        run.insights.entities_tracked,
        run.dataset.dropped_rows,
    ));
    out.push('\n');
    out.push_str(&format_rankings(&run.rankings));
    out.push('\n');
    out.push_str(&format_trend(&run.trend));
    out.push('\n');
    out.push_str(&format_insights(&run.insights));
    out
}

/// Shape, available columns, and the projection outcome.
pub fn format_overview(source: &SourceInfo, retained: &[Column], substituted: &[Field]) -> String {
    let mut out = String::new();
    out.push_str("=== covid - dataset overview ===\n");
    out.push_str(&format!("Source: {}\n", source.label));
    out.push_str(&format!(
        "Shape: {} rows x {} columns\n",
        source.rows_read,
        source.columns.len()
    ));
    if source.malformed_rows > 0 {
        out.push_str(&format!("Malformed rows skipped: {}\n", source.malformed_rows));
    }

    let shown: Vec<&str> = source.columns.iter().take(OVERVIEW_COLUMNS).map(String::as_str).collect();
    out.push_str(&format!("Columns available: [{}]\n", shown.join(", ")));

    let kept: Vec<&str> = retained.iter().map(|c| c.name()).collect();
    out.push_str(&format!("Columns retained: [{}]\n", kept.join(", ")));

    for field in substituted {
        out.push_str(&format!(
            "Note: '{}' column not found, added as empty.\n",
            field.column_name()
        ));
    }
    out
}

/// First rows as loaded (before cleaning).
pub fn format_head(rows: &[Record]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<20} {:<12}", "location", "date"));
    for field in Field::ALL {
        out.push_str(&format!(" {:>18}", field.column_name()));
    }
    out.push('\n');

    if rows.is_empty() {
        out.push_str("(no rows)\n");
        return out;
    }

    for row in rows {
        let date = match &row.date {
            RecordDate::Raw(s) => s.clone(),
            RecordDate::Parsed(d) => d.to_string(),
        };
        out.push_str(&format!("{:<20} {:<12}", truncate(&row.entity, 20), truncate(&date, 12)));
        for field in Field::ALL {
            let cell = row.value(field).map(fmt_plain).unwrap_or_else(|| "NaN".to_string());
            out.push_str(&format!(" {cell:>18}"));
        }
        out.push('\n');
    }
    out
}

/// Descriptive statistics table plus dataset-level counts.
pub fn format_summary(
    summary: &[ColumnSummary],
    date_range: Option<(NaiveDate, NaiveDate)>,
    entities: usize,
    dropped_rows: usize,
) -> String {
    let mut out = String::new();
    out.push_str("Data summary:\n");
    out.push_str(
        format!(
            "{:<20} {:>10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )
        .trim_end(),
    );
    out.push('\n');

    for s in summary {
        let cells = match &s.distribution {
            Some(d) => [
                fmt_stat(d.mean),
                d.std.map(fmt_stat).unwrap_or_else(|| "NaN".to_string()),
                fmt_stat(d.min),
                fmt_stat(d.q25),
                fmt_stat(d.median),
                fmt_stat(d.q75),
                fmt_stat(d.max),
            ],
            None => std::array::from_fn(|_| "NaN".to_string()),
        };
        out.push_str(&format!("{:<20} {:>10}", s.field.column_name(), s.count));
        for cell in cells {
            out.push_str(&format!(" {cell:>12}"));
        }
        out.push('\n');
    }

    match date_range {
        Some((first, last)) => out.push_str(&format!("Dates: {first} .. {last}\n")),
        None => out.push_str("Dates: -\n"),
    }
    if dropped_rows > 0 {
        out.push_str(&format!("Rows dropped (unparseable date): {dropped_rows}\n"));
    }
    out.push_str(&format!("Number of countries/locations: {entities}\n"));
    out
}

/// The top-N tables.
pub fn format_rankings(rankings: &Rankings) -> String {
    let mut out = String::new();
    for ranking in [&rankings.cases, &rankings.deaths, &rankings.vaccinations] {
        out.push_str(&format_ranking(ranking));
        out.push('\n');
    }
    out
}

pub fn format_ranking(ranking: &Ranking) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Top {} by {}:\n",
        ranking.entries.len(),
        ranking.field.display_name()
    ));
    if ranking.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    out.push_str(format!("{:>3} {:<28} {:>18} {:<10}", "#", "location", "value", "as of").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<3} {:-<28} {:-<18} {:-<10}", "", "", "", "").trim_end());
    out.push('\n');
    for (idx, e) in ranking.entries.iter().enumerate() {
        out.push_str(
            format!(
                "{:>3} {:<28} {:>18} {:<10}",
                idx + 1,
                truncate(&e.entity, 28),
                fmt_thousands(e.value),
                e.date
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Latest global totals and the peak day of each aggregated series.
pub fn format_trend(trend: &TimeSeries) -> String {
    let mut out = String::new();
    out.push_str("Global trend:\n");
    let Some(last) = trend.points.last() else {
        out.push_str("(no data)\n");
        return out;
    };

    out.push_str(&format!(
        "Days: {} | latest: {}\n",
        trend.points.len(),
        last.date
    ));
    for (idx, field) in trend.fields.iter().enumerate() {
        let peak = trend
            .points
            .iter()
            .map(|p| (p.date, p.values[idx]))
            .fold(None, |best: Option<(NaiveDate, f64)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            });
        let Some((peak_date, peak_value)) = peak else { continue };
        out.push_str(&format!(
            "- {:<20} latest={:>16} peak={:>16} on {peak_date}\n",
            field.display_name(),
            fmt_thousands(last.values[idx]),
            fmt_thousands(peak_value),
        ));
    }
    out
}

/// Closing "key insights" block.
pub fn format_insights(insights: &Insights) -> String {
    let mut out = String::new();
    out.push_str("Key insights:\n");
    out.push_str(&format!("- Total countries tracked: {}\n", insights.entities_tracked));
    if let Some(name) = &insights.highest_cases {
        out.push_str(&format!("- Country with highest total cases: {name}\n"));
    }
    if let Some(name) = &insights.highest_deaths {
        out.push_str(&format!("- Country with highest total deaths: {name}\n"));
    }
    if let Some(name) = &insights.highest_vaccinations {
        out.push_str(&format!("- Country with highest total vaccinations: {name}\n"));
    }
    if insights.entities_tracked == 0 {
        out.push_str("- No data to show.\n");
    }
    out
}

/// Round to an integer and group thousands with commas (`1234567.4` -> `1,234,567`).
pub fn fmt_thousands(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn fmt_plain(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.3}")
    }
}

fn fmt_stat(v: f64) -> String {
    if v.abs() >= 1e7 {
        format!("{v:.3e}")
    } else {
        format!("{v:.2}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RankEntry;

    #[test]
    fn thousands_grouping() {
        assert_eq!(fmt_thousands(0.0), "0");
        assert_eq!(fmt_thousands(999.0), "999");
        assert_eq!(fmt_thousands(1000.0), "1,000");
        assert_eq!(fmt_thousands(1_234_567.4), "1,234,567");
        assert_eq!(fmt_thousands(-12_345.0), "-12,345");
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("Testland", 20), "Testland");
        assert_eq!(truncate("Democratic Republic of Congo", 10), "Democrati.");
    }

    #[test]
    fn empty_ranking_says_no_data() {
        let txt = format_ranking(&Ranking::empty(Field::TotalVaccinations));
        assert_eq!(txt, "Top 0 by Total Vaccinations:\n(no data)\n");
    }

    #[test]
    fn ranking_table_lists_entries_in_order() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
        let ranking = Ranking {
            field: Field::TotalCases,
            entries: vec![
                RankEntry { entity: "Big".to_string(), date, value: 30_000.0 },
                RankEntry { entity: "Small".to_string(), date, value: 30.0 },
            ],
        };
        let txt = format_ranking(&ranking);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "Top 2 by Total Cases:");
        assert!(lines[3].contains("Big") && lines[3].contains("30,000"));
        assert!(lines[4].contains("Small"));
    }

    #[test]
    fn insights_for_empty_dataset() {
        let txt = format_insights(&Insights::default());
        assert!(txt.contains("Total countries tracked: 0"));
        assert!(txt.contains("No data to show."));
    }

    #[test]
    fn trend_reports_peak_and_latest() {
        let d = |day| NaiveDate::from_ymd_opt(2021, 1, day).unwrap();
        let trend = TimeSeries {
            fields: vec![Field::NewCases],
            points: vec![
                crate::domain::TimePoint { date: d(1), values: vec![5.0] },
                crate::domain::TimePoint { date: d(2), values: vec![9.0] },
                crate::domain::TimePoint { date: d(3), values: vec![2.0] },
            ],
        };
        let txt = format_trend(&trend);
        assert!(txt.contains("Days: 3 | latest: 2021-01-03"));
        assert!(txt.contains("on 2021-01-02"));
    }
}
