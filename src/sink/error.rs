//! Error types for the persistence sink.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while saving an order record.
///
/// A sink error never changes an order's status; it is reported on the receipt.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The journal could not be written.
    #[error("Sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be encoded.
    #[error("Sink encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backend refused the record.
    #[error("Sink rejected record: {0}")]
    Rejected(String),

    /// The save did not finish in time.
    #[error("Sink timed out after {0:?}")]
    TimedOut(Duration),

    /// The writer task is gone.
    #[error("Journal writer closed")]
    WriterClosed,

    /// The writer task dropped the response channel.
    #[error("Journal writer dropped response channel")]
    WriterDropped,
}
