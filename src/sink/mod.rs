//! Persistence sink: durable recording of completed orders.
//!
//! The platform only knows the [`OrderSink`] contract. Two sinks ship with the crate:
//!
//! - [`MemorySink`] keeps records in process.
//! - [`JournalSink`] hands records to a [`JournalWriter`] task that appends them to a
//!   JSON-lines file.

pub mod error;
mod journal;
mod memory;

pub use error::*;
pub use journal::*;
pub use memory::*;

use crate::model::{Order, OrderKey, OrderStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The persisted form of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub customer_name: String,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn new(key: OrderKey, order: &Order) -> Self {
        Self {
            id: key.to_string(),
            customer_name: order.customer().name.clone(),
            total_price: order.total_price(),
            status: order.status(),
            created_at: order.created_at(),
        }
    }
}

/// Durable storage for completed orders.
///
/// Called at most once per completed order. Implementations own their retry policy, if any.
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn save(&self, record: &OrderRecord) -> Result<(), SinkError>;
}
