use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::models::Product;

/// Point-in-time copy of the accumulated products
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub items: Vec<Product>,
    pub batches: u64,
    pub last_received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Accumulated {
    items: Vec<Product>,
    batches: u64,
    last_received_at: Option<DateTime<Utc>>,
}

/// Append-only sequence of every product the aggregator has received
///
/// Appends and snapshots take the same lock, so a snapshot never sees half a
/// batch. Nothing is ever evicted: memory grows for the life of the process.
#[derive(Debug, Default)]
pub struct AccumulationStore {
    inner: Mutex<Accumulated>,
}

impl AccumulationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a whole batch as one unit
    pub async fn append(&self, batch: Vec<Product>) {
        let count = batch.len();
        let mut inner = self.inner.lock().await;
        inner.items.extend(batch);
        inner.batches += 1;
        inner.last_received_at = Some(Utc::now());
        tracing::debug!(count, total = inner.items.len(), "Batch appended");
    }

    /// Returns a copy isolated from later appends
    pub async fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock().await;
        Snapshot {
            items: inner.items.clone(),
            batches: inner.batches,
            last_received_at: inner.last_received_at,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
