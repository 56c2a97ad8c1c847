//! Command-line parsing for the COVID dataset preparer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! preparation and rendering code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::DEFAULT_DATA_URL;
use crate::domain::Field;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid", version, about = "COVID-19 dataset preparer: rankings, trends and charts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the dataset overview, statistics, rankings, trend and insights.
    Report(RunArgs),
    /// Render the charts as SVG files.
    Charts(ChartArgs),
    /// Browse the charts in an interactive terminal UI.
    Tui(RunArgs),
}

/// Options shared by every command: data source, schema and report output.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Input CSV path (falls back to COVID_DATA_PATH, then an interactive picker).
    #[arg(short = 'f', long = "file", value_name = "CSV", conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Download the CSV from a URL; bare `--url` uses the Our World in Data export.
    #[arg(long, value_name = "URL", num_args = 0..=1, default_missing_value = DEFAULT_DATA_URL)]
    pub url: Option<String>,

    /// Number of entities in each ranking.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub top: u32,

    /// Treat an optional column as absent from the source (repeatable).
    #[arg(long, value_enum, value_name = "FIELD")]
    pub without: Vec<Field>,

    /// Render ASCII charts in the report (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the ASCII charts.
    #[arg(long)]
    pub no_plot: bool,

    /// ASCII chart width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Export the per-entity snapshot to CSV.
    #[arg(long = "export-snapshot", value_name = "CSV")]
    pub export_snapshot: Option<PathBuf>,

    /// Export the global trend to CSV.
    #[arg(long = "export-trend", value_name = "CSV")]
    pub export_trend: Option<PathBuf>,

    /// Export the run summary (rankings + insights) to JSON.
    #[arg(long = "export-summary", value_name = "JSON")]
    pub export_summary: Option<PathBuf>,
}

/// Options for rendering SVG charts.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Directory the SVG files are written to.
    #[arg(long, value_name = "DIR", default_value = "charts")]
    pub out_dir: PathBuf,

    /// Chart width in pixels.
    #[arg(long, default_value_t = 1000)]
    pub chart_width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = 600)]
    pub chart_height: u32,
}
