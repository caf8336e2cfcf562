//! Application state for the web layer.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::StationProvider;
use crate::opendata::FetchOrchestrator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator, used directly by the raw proxy endpoint
    pub orchestrator: Arc<FetchOrchestrator>,

    /// Cached normalized station lists
    pub stations: Arc<StationProvider>,

    /// Favorite station ids. Ephemeral per the service contract; the
    /// station records themselves stay immutable per fetch cycle.
    pub favorites: Arc<RwLock<HashSet<String>>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(orchestrator: Arc<FetchOrchestrator>, stations: StationProvider) -> Self {
        Self {
            orchestrator,
            stations: Arc::new(stations),
            favorites: Arc::new(RwLock::new(HashSet::new())),
        }
    }
}
