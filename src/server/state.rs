//! Shared application state.

use std::sync::Arc;
use std::time::Instant;

use crate::store::{MetricStore, StoreLimits};

/// State shared across handlers.
///
/// Owns the single [`MetricStore`] instance for the process; handlers
/// receive it by injection through axum's `State` extractor, so tests can
/// isolate themselves with a fresh instance.
#[derive(Clone)]
pub struct AppState {
    /// The metric store
    pub store: Arc<MetricStore>,
    started_at: Instant,
}

impl AppState {
    /// Create fresh state with an empty store.
    #[must_use]
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            store: Arc::new(MetricStore::with_limits(limits)),
            started_at: Instant::now(),
        }
    }

    /// Seconds since this state was created.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
