//! Fetch orchestration with layered source fallback.
//!
//! Sources are tried strictly in priority order; the first one that
//! yields valid JSON wins and later sources are never contacted. If a
//! full pass fails, the list is retried exactly once after a fixed
//! backoff, then the cycle fails terminally with the last cause.
//!
//! At most one cycle is in flight per orchestrator instance: a fetch
//! issued while a cycle is outstanding joins it and resolves to the
//! same outcome, so overlapping triggers (manual refresh, auto-refresh
//! timer, visibility change) never produce parallel upstream calls.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::client::SourceClient;
use super::error::{FetchError, SourceError};

/// Raw decoded JSON from an upstream source; shape unknown until the
/// normalizer inspects it.
pub type RawPayload = Value;

/// Default direct endpoint (explore API, availability dataset).
const DEFAULT_PRIMARY_URL: &str = "https://opendata.brussels.be/api/explore/v2.1/catalog/datasets/disponibilite-en-temps-reel-des-velos-villo-rbc/records?limit=100";

/// Default mirror endpoint, the dataset copy the application proxy
/// historically forwarded to.
const DEFAULT_PROXY_URL: &str = "https://bruxellesdata.opendatasoft.com/api/explore/v2.1/catalog/datasets/stations-villo-bruxelles-rbc/records?limit=343";

/// Default public CORS relay wrapping the primary endpoint.
const DEFAULT_RELAY_URL: &str = "https://api.allorigins.win/raw?url=https%3A%2F%2Fopendata.brussels.be%2Fapi%2Fexplore%2Fv2.1%2Fcatalog%2Fdatasets%2Fdisponibilite-en-temps-reel-des-velos-villo-rbc%2Frecords%3Flimit%3D100";

/// Backoff before the single retry pass.
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// One candidate data source.
#[derive(Debug, Clone)]
pub struct Source {
    /// Short label used in logs
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Configuration for the fetch orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Candidate sources in priority order
    pub sources: Vec<Source>,
    /// Delay before the single retry of the full source list
    pub retry_backoff: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                Source::new("direct", DEFAULT_PRIMARY_URL),
                Source::new("proxy", DEFAULT_PROXY_URL),
                Source::new("relay", DEFAULT_RELAY_URL),
            ],
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl OrchestratorConfig {
    /// Config with an explicit source list.
    pub fn new(sources: Vec<Source>) -> Self {
        Self {
            sources,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Set the retry backoff.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Default sources with per-source URL overrides from the
    /// environment (`VILLO_PRIMARY_URL`, `VILLO_PROXY_URL`,
    /// `VILLO_RELAY_URL`).
    pub fn from_env() -> Self {
        let url = |var: &str, default: &str| {
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        };
        Self::new(vec![
            Source::new("direct", url("VILLO_PRIMARY_URL", DEFAULT_PRIMARY_URL)),
            Source::new("proxy", url("VILLO_PROXY_URL", DEFAULT_PROXY_URL)),
            Source::new("relay", url("VILLO_RELAY_URL", DEFAULT_RELAY_URL)),
        ])
    }
}

/// A fetch cycle shared by every caller that joins it.
type CycleFuture = Shared<BoxFuture<'static, Result<Arc<RawPayload>, FetchError>>>;

/// Obtains a raw availability payload, tolerating upstream outages via
/// layered fallback.
pub struct FetchOrchestrator {
    inner: Arc<Inner>,
    /// Slot holding the in-flight cycle, if any.
    in_flight: Mutex<Option<CycleFuture>>,
}

struct Inner {
    client: SourceClient,
    sources: Vec<Source>,
    retry_backoff: Duration,
}

impl FetchOrchestrator {
    /// Create a new orchestrator.
    pub fn new(client: SourceClient, config: OrchestratorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                sources: config.sources,
                retry_backoff: config.retry_backoff,
            }),
            in_flight: Mutex::new(None),
        }
    }

    /// Fetch the current availability payload.
    ///
    /// If a cycle is already outstanding, this joins it instead of
    /// starting a second one; every joined caller receives the same
    /// outcome. A completed cycle is never reused — the next call
    /// starts fresh.
    pub async fn fetch(&self) -> Result<Arc<RawPayload>, FetchError> {
        let cycle = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(cycle) if cycle.peek().is_none() => cycle.clone(),
                _ => {
                    let inner = Arc::clone(&self.inner);
                    let cycle = async move { inner.run_cycle().await }.boxed().shared();
                    *slot = Some(cycle.clone());
                    cycle
                }
            }
        };

        cycle.await
    }
}

impl Inner {
    /// One full cycle: the source list in priority order, retried once.
    async fn run_cycle(&self) -> Result<Arc<RawPayload>, FetchError> {
        let mut attempts: u32 = 0;
        let mut last: Option<SourceError> = None;

        for pass in 0..2 {
            if pass > 0 {
                warn!(backoff = ?self.retry_backoff, "all sources failed, retrying once");
                tokio::time::sleep(self.retry_backoff).await;
            }

            for source in &self.sources {
                attempts += 1;
                match self.client.fetch_json(&source.url).await {
                    Ok(payload) => {
                        info!(source = %source.name, attempts, "fetched availability payload");
                        return Ok(Arc::new(payload));
                    }
                    Err(e) => {
                        warn!(source = %source.name, error = %e, "source attempt failed");
                        last = Some(e);
                    }
                }
            }
        }

        match last {
            Some(last) => Err(FetchError::Exhausted { attempts, last }),
            None => Err(FetchError::NoSources),
        }
    }
}
