//! Results aggregation and ranking for sim-racing leagues.
//!
//! Every computation is a pure function of a loaded [`data::Dataset`] and an
//! explicit [`scoring::ScoringConfig`]. Empty scopes come back as `None` or an
//! empty `Vec`; refusals come back as [`error::EngineError`].
pub mod config;
pub mod data;
pub mod error;
pub mod laps;
pub mod output;
pub mod records;
pub mod scoring;
pub mod standings;
pub mod time_attack;

pub use error::{EngineError, EngineResult};
