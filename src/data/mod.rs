//! Remote data sources.

pub mod fetch;

pub use fetch::*;
