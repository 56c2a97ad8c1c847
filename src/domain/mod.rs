//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed column set (`Field`, `Column`) and the declared `Schema`
//! - records, the full `Dataset`, and the per-entity `Snapshot`
//! - derived views (`Ranking`, `TimeSeries`) and the run configuration

pub mod types;

pub use types::*;
