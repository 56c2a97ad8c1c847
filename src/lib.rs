//! `covid-insights` library crate.
//!
//! The binary (`covid`) is a thin wrapper around this library so that:
//!
//! - the preparation pipeline is testable without spawning processes
//! - report, chart and TUI front-ends share one set of derived tables

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod prepare;
pub mod report;
pub mod tui;
