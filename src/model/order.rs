//! Represents a customer order.
//!
//! # Registry
//! This struct implements the [`Entity`](crate::framework::Entity) trait,
//! allowing it to be stored in a [`ResourceRegistry`](crate::framework::ResourceRegistry).
//!
//! The id is bound exactly once by the registry and the status only ever moves
//! out of [`OrderStatus::Created`] once, so an `Order` can be shared as `Arc<Order>`
//! between the registry, the platform and readers without further locking.
use crate::framework::Entity;
use crate::model::{Customer, Dish};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Type-safe key issued by the registry for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderKey(pub u64);

impl From<u64> for OrderKey {
    fn from(seq: u64) -> Self {
        Self(seq)
    }
}

impl Display for OrderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Lifecycle status of an order. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Created)
    }

    fn as_u8(self) -> u8 {
        match self {
            OrderStatus::Created => 0,
            OrderStatus::Completed => 1,
            OrderStatus::Cancelled => 2,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => OrderStatus::Completed,
            2 => OrderStatus::Cancelled,
            _ => OrderStatus::Created,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

/// Errors raised by order construction and status transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    /// An order must contain at least one line.
    #[error("Order has no items")]
    Empty,

    /// Quantities must be positive.
    #[error("Zero quantity for dish: {0}")]
    ZeroQuantity(String),

    /// Only `Created -> Completed` and `Created -> Cancelled` are allowed.
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },
}

#[derive(Debug)]
pub struct Order {
    id: OnceLock<OrderKey>,
    items: HashMap<Dish, u32>,
    customer: Arc<Customer>,
    status: AtomicU8,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new Order in status `Created`.
    ///
    /// # Arguments
    /// * `customer` - The ordering customer (shared, never mutated)
    /// * `items` - `(dish, quantity)` lines; repeated dishes are merged
    ///
    /// # Notes
    /// The id stays unset until the order is registered.
    pub fn new(
        customer: impl Into<Arc<Customer>>,
        items: impl IntoIterator<Item = (Dish, u32)>,
    ) -> Result<Self, OrderError> {
        let mut lines: HashMap<Dish, u32> = HashMap::new();
        for (dish, quantity) in items {
            if quantity == 0 {
                return Err(OrderError::ZeroQuantity(dish.name));
            }
            *lines.entry(dish).or_insert(0) += quantity;
        }
        if lines.is_empty() {
            return Err(OrderError::Empty);
        }

        Ok(Self {
            id: OnceLock::new(),
            items: lines,
            customer: customer.into(),
            status: AtomicU8::new(OrderStatus::Created.as_u8()),
            created_at: Utc::now(),
        })
    }

    pub fn key(&self) -> Option<OrderKey> {
        self.id.get().copied()
    }

    pub fn items(&self) -> &HashMap<Dish, u32> {
        &self.items
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of price × quantity over all lines.
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(|(dish, quantity)| dish.price * Decimal::from(*quantity))
            .sum()
    }

    /// Moves the order from `Created` to a terminal status.
    pub(crate) fn transition(&self, to: OrderStatus) -> Result<(), OrderError> {
        let from = OrderStatus::Created;
        if !to.is_terminal() {
            return Err(OrderError::IllegalTransition { from: self.status(), to });
        }
        self.status
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|current| OrderError::IllegalTransition {
                from: OrderStatus::from_u8(current),
                to,
            })
    }
}

impl Entity for Order {
    type Id = OrderKey;

    fn id(&self) -> Option<&OrderKey> {
        self.id.get()
    }

    fn assign_id(&self, id: OrderKey) -> Result<(), OrderKey> {
        self.id.set(id)
    }
}
