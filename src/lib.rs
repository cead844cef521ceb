//! # Stat Grabber
//!
//! Retrieves player and vehicle statistics from the World of Tanks web API
//! and emits a tabular (CSV) report with derived per-player metrics.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (player identity, stats, vehicles, tier catalog)
//! - **fetch**: Remote API client and envelope normalization
//! - **calculate**: Tier aggregation and the weighted low-tier activity metric
//! - **report**: Output schema, row building, CSV emission
//! - **pipeline**: Sequential batch driver
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod report;

pub use models::*;
