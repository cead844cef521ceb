//! Core data models for the stats pipeline.

mod player;
mod summary;
mod vehicle;

pub use player::*;
pub use summary::*;
pub use vehicle::*;
