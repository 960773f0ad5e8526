//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//!
//! - **Configurable log levels** via the `RUST_LOG` environment variable
//! - **Compact format** that shows spans inline and hides module paths
//!
//! ## What Gets Traced
//!
//! - **Submissions**: every `submit_order` call runs in a span carrying the order key
//! - **Outcomes**: `Completed`, `Cancelled` (with the preparation error at `warn`),
//!   `Persisted` or `Persistence failed` (at `error`)
//! - **Registry**: registrations at `info`, lookups and scans at `debug`
//! - **Journal writer**: startup, each append, shutdown
//!
//! ## Usage Examples
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=debug cargo run -- --orders 20 --workers 8
//! RUST_LOG=delivery_platform::platform=debug cargo run
//! ```
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Registered entity_type="Order" id=order_1 seq=1
//! INFO submit_order{key=order_1}: Completed total=27.50
//! INFO Appended id="order_1" appended=1
//! INFO submit_order{key=order_1}: Persisted
//! WARN submit_order{key=order_2}: Preparation failed, cancelling error=Order preparation failed: ...
//! INFO submit_order{key=order_2}: Cancelled
//! ```

/// Initializes the tracing subscriber. Call once, at program start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
