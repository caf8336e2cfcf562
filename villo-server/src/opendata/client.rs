//! HTTP client for open-data sources.

use serde_json::Value;

use super::error::SourceError;

/// Default per-attempt timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent sent to the open-data platform.
const USER_AGENT: &str = "VilloApp/1.0";

/// Configuration for the source client.
#[derive(Debug, Clone)]
pub struct SourceClientConfig {
    /// Per-attempt request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SourceClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SourceClientConfig {
    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for fetching a JSON payload from one source URL.
///
/// An attempt succeeds iff the transport completes, the status is
/// successful, and the body parses as JSON. Anything else is a
/// [`SourceError`] for the orchestrator's fallback logic to absorb.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: reqwest::Client,
}

impl SourceClient {
    /// Create a new source client.
    pub fn new(config: SourceClientConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http })
    }

    /// Fetch and decode one source URL.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, SourceError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| SourceError::Json {
            message: e.to_string(),
        })
    }
}
