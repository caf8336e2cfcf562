//! Open-data fetch error types.
//!
//! Both types are `Clone` because an in-flight fetch cycle may be
//! shared by several callers, each of which receives the outcome.

/// Failure of a single source attempt.
///
/// These are absorbed by the orchestrator's fallback logic; only the
/// last one survives into a terminal [`FetchError`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// Transport-level failure (connection refused, timeout, TLS, ...)
    #[error("network error: {message}")]
    Network { message: String },

    /// The source answered with a non-success status
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// The body was not valid JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network {
            message: err.to_string(),
        }
    }
}

/// Terminal failure of a full fetch cycle.
///
/// Raised only after every configured source has failed on both the
/// initial pass and the single retry pass.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("no sources configured")]
    NoSources,

    /// All sources exhausted; carries the last underlying cause.
    #[error("all {attempts} source attempts failed; last error: {last}")]
    Exhausted { attempts: u32, last: SourceError },
}
