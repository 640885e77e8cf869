//! The snapshot store seam.
//!
//! The pipeline hands each finished [`MarketSnapshot`] to an explicitly
//! constructed, injectable store rather than an ambient global connection.
//! Compression, expiry, and the concrete backend (Redis in production) are
//! the store's concern, not the pipeline's.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use candela_types::{CandelaError, MarketSnapshot};

/// Keyed storage for finished snapshots, one per timeframe.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Liveness check; callers run this once before a collection cycle.
    async fn ping(&self) -> Result<(), CandelaError>;

    /// Load the snapshot cached under a timeframe key, if any.
    async fn get(&self, timeframe: &str) -> Result<Option<MarketSnapshot>, CandelaError>;

    /// Replace the snapshot cached under a timeframe key wholesale.
    async fn put(&self, timeframe: &str, snapshot: &MarketSnapshot) -> Result<(), CandelaError>;
}

/// In-process store backed by a map. Used by tests, demos, and as a
/// fallback when no external backend is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, MarketSnapshot>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn ping(&self) -> Result<(), CandelaError> {
        Ok(())
    }

    async fn get(&self, timeframe: &str) -> Result<Option<MarketSnapshot>, CandelaError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| CandelaError::store(e.to_string()))?;
        Ok(inner.get(timeframe).cloned())
    }

    async fn put(&self, timeframe: &str, snapshot: &MarketSnapshot) -> Result<(), CandelaError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| CandelaError::store(e.to_string()))?;
        inner.insert(timeframe.to_string(), snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_types::Audit;

    fn snapshot(timeframe: &str) -> MarketSnapshot {
        MarketSnapshot {
            timeframe: timeframe.to_string(),
            open_time: 0,
            close_time: 0,
            data: vec![],
            audit: Audit {
                timestamp: 1,
                source: "test".into(),
                symbols_in_final_list: 0,
            },
        }
    }

    #[tokio::test]
    async fn put_replaces_wholesale() {
        let store = MemoryStore::new();
        assert!(store.get("4h").await.unwrap().is_none());

        let first = snapshot("4h");
        store.put("4h", &first).await.unwrap();
        assert_eq!(store.get("4h").await.unwrap(), Some(first));

        let mut second = snapshot("4h");
        second.open_time = 42;
        store.put("4h", &second).await.unwrap();
        assert_eq!(store.get("4h").await.unwrap(), Some(second));
    }
}
