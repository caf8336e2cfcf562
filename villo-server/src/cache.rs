//! Caching layer over fetch + normalization.
//!
//! Normalized station lists are ephemeral in-memory state, replaced
//! wholesale on every successful fetch cycle. A short TTL keeps
//! overlapping presentation-layer requests from multiplying upstream
//! calls beyond the orchestrator's own single-flight coalescing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache as MokaCache;
use tracing::info;

use crate::domain::Station;
use crate::opendata::{FetchError, FetchOrchestrator, normalize};

/// Configuration for the station list cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL of a normalized list.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
        }
    }
}

/// Failure to produce a station list.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The fetch succeeded but every record was filtered out.
    #[error("no stations left after normalization")]
    NoData,
}

/// Serves the current normalized station list, fetching through the
/// orchestrator when the cached copy has expired.
///
/// Readers holding an `Arc` to the previous list keep it valid while a
/// new one is installed.
pub struct StationProvider {
    orchestrator: Arc<FetchOrchestrator>,
    // Single-entry cache; moka supplies TTL eviction.
    current: MokaCache<(), Arc<Vec<Station>>>,
}

impl StationProvider {
    /// Create a new provider around an orchestrator.
    pub fn new(orchestrator: Arc<FetchOrchestrator>, config: &CacheConfig) -> Self {
        let current = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();

        Self {
            orchestrator,
            current,
        }
    }

    /// The current station list, fetched and normalized on cache miss.
    pub async fn stations(&self) -> Result<Arc<Vec<Station>>, ProviderError> {
        if let Some(cached) = self.current.get(&()).await {
            return Ok(cached);
        }

        let payload = self.orchestrator.fetch().await?;
        let stations = normalize(&payload, Utc::now());

        if stations.is_empty() {
            return Err(ProviderError::NoData);
        }

        info!(count = stations.len(), "normalized station list installed");
        let entry = Arc::new(stations);
        self.current.insert((), entry.clone()).await;

        Ok(entry)
    }

    /// Drop the cached list so the next read fetches fresh data
    /// (manual-refresh affordance).
    pub fn invalidate(&self) {
        self.current.invalidate_all();
    }
}
