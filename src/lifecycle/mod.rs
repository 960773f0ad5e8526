//! Runtime orchestration and lifecycle management.
//!
//! - [`DeliverySystem`] - builds the kitchen, sink and platform from a [`PlatformConfig`](crate::config::PlatformConfig),
//!   starts background tasks and shuts them down gracefully
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod delivery_system;
pub mod tracing;

pub use delivery_system::*;
pub use self::tracing::*;
