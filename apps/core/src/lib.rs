//! HomeBridge analysis engine.
//!
//! Journal entry in, [`analysis::AnalysisResult`] out. The engine never fails
//! an analysis call: every step has a documented default.

pub mod analysis;
pub mod config;
pub mod error;
pub mod telemetry;

pub use analysis::{AnalysisResponse, AnalysisResult, WellnessAnalyzer};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};

#[cfg(test)]
mod tests;
