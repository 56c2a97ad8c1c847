//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - resolves the data source (flags, environment, picker)
//! - runs the preparation pipeline
//! - prints the report, writes charts, or starts the TUI
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{ChartArgs, Command, RunArgs};
use crate::data::{ENV_DATA_PATH, ENV_DATA_URL};
use crate::domain::{DataSource, Field, RunConfig, Schema};
use crate::error::AppError;
use crate::logging::{DEFAULT_FILTER, QUIET_FILTER, init_logging};
use crate::plot::ChartSet;

pub mod pipeline;

use pipeline::RunOutput;

/// Height of the ASCII trend chart (rows).
const TREND_HEIGHT: usize = 12;

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `covid` and `covid -f data.csv` behave like `covid report ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => {
            init_logging(DEFAULT_FILTER);
            handle_report(&args)
        }
        Command::Charts(args) => {
            init_logging(DEFAULT_FILTER);
            handle_charts(&args)
        }
        Command::Tui(args) => {
            init_logging(QUIET_FILTER);
            handle_tui(&args)
        }
    }
}

fn handle_report(args: &RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args)?;
    let run = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_report(&run));
    if config.plot {
        println!("{}", format_ascii_charts(&run, config.plot_width));
    }

    write_exports(&config, &run)
}

fn handle_charts(args: &ChartArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.run)?;
    let run = pipeline::run_pipeline(&config)?;

    let set = ChartSet::from_run(&run);
    let written = crate::plot::write_charts(&set, &args.out_dir, (args.chart_width, args.chart_height))?;
    for path in &written {
        println!("{}", path.display());
    }

    write_exports(&config, &run)
}

fn handle_tui(args: &RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args)?;
    let run = pipeline::run_pipeline(&config)?;
    write_exports(&config, &run)?;
    crate::tui::run(&run)
}

/// ASCII bars per ranking plus the daily new-case trend.
fn format_ascii_charts(run: &RunOutput, width: usize) -> String {
    let mut out = String::new();
    out.push_str(&crate::plot::render_ascii_bars(&run.rankings.cases, width));
    out.push('\n');
    out.push_str(&crate::plot::render_ascii_bars(&run.rankings.deaths, width));
    if run.vaccinations_reported {
        out.push('\n');
        out.push_str(&crate::plot::render_ascii_bars(&run.rankings.vaccinations, width));
    }
    out.push('\n');
    out.push_str(&crate::plot::render_ascii_trend(&run.trend, Field::NewCases, width, TREND_HEIGHT));
    out
}

fn write_exports(config: &RunConfig, run: &RunOutput) -> Result<(), AppError> {
    if let Some(path) = &config.export_snapshot {
        crate::io::write_snapshot_csv(path, &run.snapshot)?;
        info!(path = %path.display(), "snapshot exported");
    }
    if let Some(path) = &config.export_trend {
        crate::io::write_trend_csv(path, &run.trend)?;
        info!(path = %path.display(), "trend exported");
    }
    if let Some(path) = &config.export_summary {
        crate::io::write_summary_json(path, run)?;
        info!(path = %path.display(), "summary exported");
    }
    Ok(())
}

pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let source = match source_from_args(args, |key| std::env::var(key).ok()) {
        Some(source) => source,
        None => DataSource::Path(crate::cli::picker::prompt_for_csv_path()?),
    };

    Ok(RunConfig {
        source,
        schema: Schema::without(&args.without),
        top_n: args.top as usize,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        export_snapshot: args.export_snapshot.clone(),
        export_trend: args.export_trend.clone(),
        export_summary: args.export_summary.clone(),
    })
}

/// Source from flags first, then the environment. `None` means "ask the user".
fn source_from_args(args: &RunArgs, env: impl Fn(&str) -> Option<String>) -> Option<DataSource> {
    if let Some(path) = &args.file {
        return Some(DataSource::Path(path.clone()));
    }
    if let Some(url) = &args.url {
        return Some(DataSource::Url(url.clone()));
    }

    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
    if let Some(path) = non_empty(ENV_DATA_PATH) {
        return Some(DataSource::Path(path.into()));
    }
    non_empty(ENV_DATA_URL).map(DataSource::Url)
}

/// Rewrite argv so `covid` defaults to `covid report`.
///
/// Rules:
/// - `covid`                      -> `covid report`
/// - `covid -f data.csv ...`      -> `covid report -f data.csv ...`
/// - `covid --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "charts" | "tui");
    if is_subcommand {
        return argv;
    }

    // A leading flag belongs to `report`.
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn parse_run(items: &[&str]) -> RunArgs {
        match crate::cli::Cli::parse_from(rewrite_args(argv(items))).command {
            Command::Report(args) | Command::Tui(args) => args,
            Command::Charts(args) => args.run,
        }
    }

    #[test]
    fn rewrite_defaults_to_report() {
        assert_eq!(rewrite_args(argv(&["covid"])), argv(&["covid", "report"]));
        assert_eq!(
            rewrite_args(argv(&["covid", "-f", "a.csv"])),
            argv(&["covid", "report", "-f", "a.csv"])
        );
        assert_eq!(rewrite_args(argv(&["covid", "--help"])), argv(&["covid", "--help"]));
        assert_eq!(rewrite_args(argv(&["covid", "tui"])), argv(&["covid", "tui"]));
    }

    #[test]
    fn flags_win_over_environment() {
        let args = parse_run(&["covid", "-f", "local.csv"]);
        let env = |key: &str| (key == ENV_DATA_URL).then(|| "https://example.org/x.csv".to_string());
        assert_eq!(
            source_from_args(&args, env),
            Some(DataSource::Path(PathBuf::from("local.csv")))
        );
    }

    #[test]
    fn environment_path_then_url() {
        let args = parse_run(&["covid", "report"]);

        let both = |key: &str| match key {
            ENV_DATA_PATH => Some("env.csv".to_string()),
            ENV_DATA_URL => Some("https://example.org/x.csv".to_string()),
            _ => None,
        };
        assert_eq!(source_from_args(&args, both), Some(DataSource::Path(PathBuf::from("env.csv"))));

        let url_only = |key: &str| match key {
            ENV_DATA_PATH => Some("  ".to_string()),
            ENV_DATA_URL => Some("https://example.org/x.csv".to_string()),
            _ => None,
        };
        assert_eq!(
            source_from_args(&args, url_only),
            Some(DataSource::Url("https://example.org/x.csv".to_string()))
        );

        assert_eq!(source_from_args(&args, |_| None), None);
    }

    #[test]
    fn config_carries_schema_and_plot_switch() {
        let args = parse_run(&["covid", "-f", "a.csv", "--without", "population", "--no-plot", "--top", "3"]);
        let config = run_config_from_args(&args).unwrap();
        assert_eq!(config.top_n, 3);
        assert!(!config.plot);
        assert_eq!(config.schema, Schema::without(&[Field::Population]));
    }
}
