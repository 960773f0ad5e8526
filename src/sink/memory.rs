use super::{OrderRecord, OrderSink, SinkError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Keeps saved records in memory. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<OrderRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record saved so far, in save order.
    pub fn records(&self) -> Vec<OrderRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl OrderSink for MemorySink {
    async fn save(&self, record: &OrderRecord) -> Result<(), SinkError> {
        let mut records = self.records.lock();
        records.push(record.clone());
        debug!(id = %record.id, size = records.len(), "Saved");
        Ok(())
    }
}
