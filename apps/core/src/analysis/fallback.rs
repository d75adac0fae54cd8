//! Fallback policy.
//!
//! One table, one place: each pipeline step that can fail maps to the default
//! the orchestrator substitutes for it. Failures are logged here exactly once
//! and never travel further.
//!
//! | Step       | Default                               |
//! |------------|---------------------------------------|
//! | provider   | none (local computation)              |
//! | sentiment  | `0.0`                                 |
//! | themes     | `{General}`                           |
//! | severity   | `5`                                   |
//! | strategies | built-in default strategies           |

use tracing::{debug, warn};

use super::catalog::{default_strategies, Strategy};
use super::themes::ThemeScores;
use crate::error::{EngineError, EngineResult};

pub const DEFAULT_SENTIMENT: f32 = 0.0;
pub const DEFAULT_SEVERITY: u8 = 5;

/// Pipeline step a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Provider,
    Sentiment,
    Themes,
    Severity,
    Strategies,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Provider => "provider",
            Step::Sentiment => "sentiment",
            Step::Themes => "themes",
            Step::Severity => "severity",
            Step::Strategies => "strategies",
        }
    }
}

/// Unwrap `result`, or log the failure and substitute `default`.
pub fn recover<T>(step: Step, result: EngineResult<T>, default: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log_failure(step, &e);
            default()
        }
    }
}

fn log_failure(step: Step, error: &EngineError) {
    match error {
        // Expected whenever the provider is slow or down
        EngineError::ProviderTimeout(_) | EngineError::ProviderUnavailable(_) => {
            debug!(step = step.name(), error = %error, "Step failed, using local result")
        }
        _ => warn!(step = step.name(), error = %error, "Step failed, using default"),
    }
}

pub fn sentiment(result: EngineResult<f32>) -> f32 {
    recover(Step::Sentiment, result, || DEFAULT_SENTIMENT)
}

pub fn severity(result: EngineResult<u8>) -> u8 {
    recover(Step::Severity, result, || DEFAULT_SEVERITY)
}

/// Empty theme sets are promoted to `{General}` as well.
pub fn themes(result: EngineResult<ThemeScores>) -> ThemeScores {
    recover(Step::Themes, result, ThemeScores::general).or_general()
}

pub fn strategies(result: EngineResult<Vec<Strategy>>) -> Vec<Strategy> {
    recover(Step::Strategies, result, default_strategies)
}
