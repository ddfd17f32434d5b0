use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{StoreError, StoreResult, SubscriberRecord, SubscriberStore, ValidSubscriber};

/// An in-process store with the same insert contract as `PgStore`.
/// Can be marked unavailable to simulate a lost database connection.
#[derive(Debug)]
pub struct MemoryStore {
    records: Mutex<Vec<SubscriberRecord>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    /// A store that fails every insert as if the connection was down.
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.set_available(false);
        store
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// Snapshot of all stored records in insertion order.
    pub async fn records(&self) -> Vec<SubscriberRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn insert_valid(&self, subscriber: ValidSubscriber) -> StoreResult<SubscriberRecord> {
        if !self.available.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable);
        }

        let record = SubscriberRecord::new(subscriber, Utc::now());
        self.records.lock().await.push(record.clone());

        Ok(record)
    }
}
