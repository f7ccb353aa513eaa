// Error types for planisphere-e2e

use thiserror::Error;

use crate::pages::plans::PlanDiagnostics;

/// Result type alias for suite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while driving the hotel site
#[derive(Debug, Error)]
pub enum Error {
    /// Error reported by the browser automation engine
    #[error("Browser error: {0}")]
    Browser(#[from] playwright_rs::Error),

    /// A bounded wait elapsed
    ///
    /// Load-state and race waits treat this as a non-fatal outcome; every
    /// other caller surfaces it.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Element never became visible within its bounded wait
    #[error("Element not found: selector '{0}'")]
    ElementNotFound(String),

    /// Test assertion failed
    ///
    /// Always carries the expected and actual values so failures are
    /// diagnosable from the report alone.
    #[error("Assertion failed: {message} (expected: {expected}, actual: {actual})")]
    Assertion {
        message: String,
        expected: String,
        actual: String,
    },

    /// Navigation target is not registered on the base page
    #[error("Unknown navigation target '{name}' (registered: {registered})")]
    UnknownNavTarget { name: String, registered: String },

    /// Plan card or its reserve control could not be used
    #[error("Failed to select plan '{plan}': {source} (cards on page: {:?})", .diagnostics.card_titles)]
    PlanSelection {
        plan: String,
        diagnostics: PlanDiagnostics,
        #[source]
        source: Box<Error>,
    },

    /// Stopwatch measurement crossed its threshold
    #[error("{description} took {elapsed_ms}ms, threshold is {threshold_ms}ms")]
    ThresholdExceeded {
        description: String,
        elapsed_ms: u128,
        threshold_ms: u128,
    },

    /// Invalid suite configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Malformed URL pattern
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Screenshot decode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }

    /// Builds an assertion failure from expected/actual values.
    pub fn assertion(
        message: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Error::Assertion {
            message: message.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Returns true when the error is a bounded wait elapsing.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Context(_, inner) => inner.is_timeout(),
            _ => false,
        }
    }
}
