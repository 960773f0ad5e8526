//! Preparation service: decides whether an order can be prepared.
//!
//! The decision is injected behind [`PreparationService`] so the platform never
//! depends on a concrete kitchen. [`RandomKitchen`] is the simulated kitchen used
//! by the running system; [`FixedKitchen`] always gives the same answer.

pub mod error;
mod random;

pub use error::*;
pub use random::*;

use crate::model::Order;
use async_trait::async_trait;

/// A kitchen that attempts to prepare orders.
///
/// Implementations only decide. They must not change the order's status and have
/// no access to the registry; the platform performs the transition.
#[async_trait]
pub trait PreparationService: Send + Sync {
    async fn prepare(&self, order: &Order) -> Result<(), PreparationError>;
}

/// A kitchen with a predetermined outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedKitchen {
    succeed: bool,
}

impl FixedKitchen {
    pub fn succeeding() -> Self {
        Self { succeed: true }
    }

    pub fn failing() -> Self {
        Self { succeed: false }
    }
}

#[async_trait]
impl PreparationService for FixedKitchen {
    async fn prepare(&self, _order: &Order) -> Result<(), PreparationError> {
        if self.succeed {
            Ok(())
        } else {
            Err(PreparationError::Failed("kitchen refused the order".into()))
        }
    }
}
