use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Engine-wide error type.
///
/// None of these variants ever reaches the caller of `WellnessAnalyzer::analyze`:
/// every one of them is recovered by the fallback table in `analysis::fallback`.
/// They exist so that sub-steps can report *why* a default was substituted.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The lexicon/strategy catalog file does not exist.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(PathBuf),

    /// The lexicon/strategy catalog file exists but could not be understood.
    #[error("Configuration invalid: {0}")]
    ConfigurationInvalid(String),

    /// The external analysis provider could not be reached or refused the request.
    #[error("External provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The external analysis provider did not answer in time.
    #[error("External provider timed out after {0:?}")]
    ProviderTimeout(Duration),

    /// The external analysis provider answered with something unusable.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// A pipeline step produced a value outside its contract.
    #[error("Invalid output from {step}: {detail}")]
    InvalidOutput { step: &'static str, detail: String },

    /// The strategy catalog has nothing to draw from.
    #[error("Strategy catalog is empty")]
    EmptyCatalog,

    /// Standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl EngineError {
    pub fn invalid_output(step: &'static str, detail: impl Into<String>) -> Self {
        EngineError::InvalidOutput {
            step,
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        // The client sets no deadline of its own; `assess_within` owns timeouts
        EngineError::ProviderUnavailable(format!("HTTP error: {}", err))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
