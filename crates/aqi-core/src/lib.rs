//! Core observation pipeline for current air-quality data
//!
//! Decoded observations flow through three steps: per-pollutant
//! classification, threshold alerting, and the orchestrator that ties them to
//! a remote [`ObservationSource`].

pub mod alerts;
pub mod classify;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alerts::*;
pub use classify::*;
pub use error::*;
pub use pipeline::*;
pub use types::*;
