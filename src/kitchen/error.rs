//! Error types for the preparation step.

use std::time::Duration;
use thiserror::Error;

/// Reasons a preparation attempt did not succeed.
///
/// The platform treats every variant the same way: the order is cancelled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreparationError {
    /// The kitchen could not prepare the order.
    #[error("Order preparation failed: {0}")]
    Failed(String),

    /// The kitchen did not answer within the allotted time.
    #[error("Order preparation timed out after {0:?}")]
    TimedOut(Duration),
}
