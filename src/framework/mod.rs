//! Generic registry framework for shared resources.
//!
//! This module provides the concurrent building blocks the platform stores its orders in.
//!
//! # Main Components
//!
//! - [`Entity`] - Trait that resource types implement to be stored in a registry
//! - [`ResourceRegistry`] - Atomic key issuance plus a sharded concurrent map
//! - [`RegistryError`] - Registration failures
//!
//! # Testing
//!
//! See [`mock`] module for collaborators that make platform tests deterministic.

pub mod core;
pub mod mock;

// Re-export core types for convenience
pub use core::*;
