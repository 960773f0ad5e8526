//! Error types for the Delivery Platform.

use crate::framework::RegistryError;
use crate::model::{OrderError, OrderKey, OrderStatus};
use thiserror::Error;

/// Errors that make a single submission fail.
///
/// Preparation and persistence failures are not here: they are recovered inside the
/// submission and show up on the [`Receipt`](crate::platform::Receipt) instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The order could not be registered (registry full, key space exhausted,
    /// or the order was already registered).
    #[error("Registration failed: {0}")]
    Registration(#[from] RegistryError),

    /// The order already reached a terminal status and cannot be submitted again.
    #[error("Order {key:?} is already {status}")]
    AlreadyTerminal {
        key: Option<OrderKey>,
        status: OrderStatus,
    },

    /// A status transition was refused.
    #[error(transparent)]
    Transition(#[from] OrderError),
}
