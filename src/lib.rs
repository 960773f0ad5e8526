#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Delivery Platform
//!
//! > **Concurrent order intake with a small, strict status lifecycle.**
//!
//! Many callers submit delivery orders at the same time. Each order receives a unique
//! key, goes through a simulated kitchen that may refuse it, ends up `Completed` or
//! `Cancelled`, and completed orders are handed to a persistence sink.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One serialization point
//!
//! The only state shared between submissions is the order registry: an atomic key
//! counter plus a sharded concurrent map. Issuing a key is a single atomic step,
//! inserting touches one shard. Preparation and persistence, which may be slow, run
//! outside any shared lock, so unrelated orders never wait on each other.
//!
//! ### Injected collaborators
//!
//! The kitchen ([`PreparationService`](kitchen::PreparationService)) and the storage
//! backend ([`OrderSink`](sink::OrderSink)) are traits. The running system uses a
//! random kitchen and a JSON-lines journal; tests inject deterministic ones from
//! [`framework::mock`].
//!
//! ### Terminal means terminal
//!
//! An order's status moves out of `Created` exactly once, through a compare-and-swap.
//! A failed save never rolls a `Completed` order back: the in-memory status is the source
//! of truth and the sink is best effort.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: Generic concurrent registry that issues keys and stores entities.
//! - **Key items**: [`Entity`](framework::Entity), [`ResourceRegistry`](framework::ResourceRegistry).
//!
//! ### 2. The Orchestrator ([`platform`])
//! - **Role**: `submit_order` and the read-only query surface; enforces the state machine.
//! - **Key items**: [`DeliveryPlatform`](platform::DeliveryPlatform), [`Receipt`](platform::Receipt).
//!
//! ### 3. The Collaborators ([`kitchen`], [`sink`])
//! - **Role**: Decide whether an order can be prepared; durably record completed orders.
//!
//! ### 4. The Data ([`model`])
//! - **Role**: [`Order`](model::Order), [`Customer`](model::Customer), [`Dish`](model::Dish).
//!
//! ### 5. Wiring ([`config`], [`lifecycle`])
//! - **Role**: Load configuration, start the system, set up tracing, shut down gracefully.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Simulate 10 orders from 4 concurrent workers
//! RUST_LOG=info cargo run
//!
//! # Persist completed orders to a journal
//! RUST_LOG=info cargo run -- --orders 100 --workers 8 --journal ./data/orders.jsonl
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod config;
pub mod framework;
pub mod kitchen;
pub mod lifecycle;
pub mod model;
pub mod platform;
pub mod sink;
