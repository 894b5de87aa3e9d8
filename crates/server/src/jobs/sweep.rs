//! Background eviction of expired terminal jobs.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::store::JobStore;

/// Spawn the retention sweep loop. Terminal jobs older than `retention`
/// are evicted every `interval`; live jobs are never touched.
pub fn spawn_retention_sweep(
    store: Arc<JobStore>,
    retention: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; nothing can have expired yet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = store.sweep_expired(retention);
            if evicted > 0 {
                tracing::debug!(evicted, retained = store.len(), "Evicted expired jobs");
            }
        }
    })
}
