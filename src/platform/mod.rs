//! # Delivery Platform
//!
//! The intake API and the order state machine.
//!
//! ```text
//! Created ──register──▶ Created(key) ──prepare ok──▶ Completed ──save──▶ Completed (persisted | unpersisted)
//!                            │
//!                            └──prepare failed──▶ Cancelled
//! ```
//!
//! Each submission registers its order, asks the kitchen, commits the terminal status and
//! only then talks to the sink. Registration is the only step that touches shared state;
//! preparation and persistence of different orders run fully in parallel.

pub mod error;

pub use error::*;

use crate::config::PlatformConfig;
use crate::framework::ResourceRegistry;
use crate::kitchen::{PreparationError, PreparationService};
use crate::model::{Customer, Order, OrderKey, OrderStatus};
use crate::sink::{OrderRecord, OrderSink, SinkError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn, Span};

/// Outcome of the persistence step.
#[derive(Debug)]
pub enum Persistence {
    /// The sink recorded the order.
    Saved,
    /// The sink failed or timed out. The order stays `Completed`.
    Failed(SinkError),
    /// The order was cancelled, so the sink was not called.
    NotAttempted,
}

/// What a caller gets back from [`DeliveryPlatform::submit_order`].
#[derive(Debug)]
pub struct Receipt {
    pub key: OrderKey,
    pub status: OrderStatus,
    pub persistence: Persistence,
}

impl Receipt {
    pub fn is_persisted(&self) -> bool {
        matches!(self.persistence, Persistence::Saved)
    }
}

/// The order intake and query surface.
///
/// Cheap to clone; clones share the same registry and collaborators, so any number of
/// tasks or threads may call [`submit_order`](Self::submit_order) concurrently.
#[derive(Clone)]
pub struct DeliveryPlatform {
    registry: Arc<ResourceRegistry<Order>>,
    kitchen: Arc<dyn PreparationService>,
    sink: Arc<dyn OrderSink>,
    prep_timeout: Duration,
    sink_timeout: Duration,
}

impl DeliveryPlatform {
    pub const DEFAULT_PREP_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(2);

    /// Creates a platform with an unbounded registry and default timeouts.
    pub fn new(kitchen: Arc<dyn PreparationService>, sink: Arc<dyn OrderSink>) -> Self {
        Self {
            registry: Arc::new(ResourceRegistry::new(OrderKey::from)),
            kitchen,
            sink,
            prep_timeout: Self::DEFAULT_PREP_TIMEOUT,
            sink_timeout: Self::DEFAULT_SINK_TIMEOUT,
        }
    }

    /// Creates a platform with capacity and timeouts taken from `config`.
    pub fn from_config(
        config: &PlatformConfig,
        kitchen: Arc<dyn PreparationService>,
        sink: Arc<dyn OrderSink>,
    ) -> Self {
        Self::new(kitchen, sink)
            .with_capacity(config.max_orders)
            .with_prep_timeout(config.prep_timeout())
            .with_sink_timeout(config.sink_timeout())
    }

    /// Replaces the registry with one bounded to `max_orders`. Meant for construction.
    pub fn with_capacity(mut self, max_orders: Option<usize>) -> Self {
        self.registry = Arc::new(ResourceRegistry::with_capacity(max_orders, OrderKey::from));
        self
    }

    pub fn with_prep_timeout(mut self, prep_timeout: Duration) -> Self {
        self.prep_timeout = prep_timeout;
        self
    }

    pub fn with_sink_timeout(mut self, sink_timeout: Duration) -> Self {
        self.sink_timeout = sink_timeout;
        self
    }

    /// Registers, prepares and (on success) persists an order.
    ///
    /// # Returns
    ///
    /// - `Ok(receipt)` with status `Completed` or `Cancelled`. A persistence failure is
    ///   reported in [`Receipt::persistence`] and does not make the call fail.
    /// - `Err(PlatformError)` if the order could not be registered or was already
    ///   submitted. Other submissions are unaffected.
    #[instrument(skip_all, fields(key = tracing::field::Empty))]
    pub async fn submit_order(
        &self,
        order: impl Into<Arc<Order>>,
    ) -> Result<Receipt, PlatformError> {
        let order: Arc<Order> = order.into();
        debug!(customer = %order.customer().name, "submit_order called");

        let status = order.status();
        if status.is_terminal() {
            warn!(key = ?order.key(), %status, "Rejected resubmission");
            return Err(PlatformError::AlreadyTerminal {
                key: order.key(),
                status,
            });
        }

        let key = self.registry.register(Arc::clone(&order))?;
        Span::current().record("key", tracing::field::display(key));

        // From here on the order must end up terminal, even if this future is dropped.
        let guard = CancelOnDrop(&order);

        let prepared = timeout(self.prep_timeout, self.kitchen.prepare(&order))
            .await
            .unwrap_or(Err(PreparationError::TimedOut(self.prep_timeout)));

        let receipt = match prepared {
            Ok(()) => {
                order.transition(OrderStatus::Completed)?;
                info!(total = %order.total_price(), "Completed");
                let persistence = self.persist(key, &order).await;
                Receipt {
                    key,
                    status: OrderStatus::Completed,
                    persistence,
                }
            }
            Err(e) => {
                warn!(error = %e, "Preparation failed, cancelling");
                order.transition(OrderStatus::Cancelled)?;
                info!("Cancelled");
                Receipt {
                    key,
                    status: OrderStatus::Cancelled,
                    persistence: Persistence::NotAttempted,
                }
            }
        };

        drop(guard);
        Ok(receipt)
    }

    async fn persist(&self, key: OrderKey, order: &Order) -> Persistence {
        let record = OrderRecord::new(key, order);
        match timeout(self.sink_timeout, self.sink.save(&record)).await {
            Ok(Ok(())) => {
                info!("Persisted");
                Persistence::Saved
            }
            Ok(Err(e)) => {
                error!(error = %e, "Persistence failed");
                Persistence::Failed(e)
            }
            Err(_) => {
                let e = SinkError::TimedOut(self.sink_timeout);
                error!(error = %e, "Persistence failed");
                Persistence::Failed(e)
            }
        }
    }

    /// Looks up an order by key.
    pub fn find_order_by_id(&self, key: OrderKey) -> Option<Arc<Order>> {
        self.registry.get(&key)
    }

    /// All registered orders placed by `customer`, in registration order.
    pub fn find_orders_by_customer(&self, customer: &Customer) -> Vec<Arc<Order>> {
        sorted_by_key(self.registry.find(|order| order.customer() == customer))
    }

    /// All registered orders currently in `status`, in registration order.
    pub fn find_orders_by_status(&self, status: OrderStatus) -> Vec<Arc<Order>> {
        sorted_by_key(self.registry.find(|order| order.status() == status))
    }

    /// Number of registered orders.
    pub fn order_count(&self) -> usize {
        self.registry.len()
    }
}

fn sorted_by_key(mut orders: Vec<Arc<Order>>) -> Vec<Arc<Order>> {
    orders.sort_by_key(|order| order.key());
    orders
}

/// Cancels a registered order whose submission was abandoned before reaching a terminal status.
struct CancelOnDrop<'a>(&'a Order);

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        if self.0.status() == OrderStatus::Created && self.0.transition(OrderStatus::Cancelled).is_ok() {
            warn!(key = ?self.0.key(), "Submission abandoned, order cancelled");
        }
    }
}
