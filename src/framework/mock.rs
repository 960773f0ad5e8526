//! # Mock Collaborators
//!
//! Utilities for testing the platform without a real kitchen or storage backend.
//!
//! - [`MockSink`] records every save and answers from a queue of expectations.
//! - [`ScriptedKitchen`] answers preparations from a queue of outcomes.

use crate::kitchen::{PreparationError, PreparationService};
use crate::model::Order;
use crate::sink::{OrderRecord, OrderSink, SinkError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected `save` call and how to answer it.
enum Expectation {
    Save {
        delay: Option<Duration>,
        response: Result<(), SinkError>,
    },
}

/// A mock sink with expectation tracking for fluent testing.
///
/// # Example
/// ```ignore
/// let mock = MockSink::new();
/// mock.expect_save().return_ok();
/// mock.expect_save().return_err(SinkError::Rejected("disk full".into()));
///
/// let sink = Arc::new(mock.clone());
/// // Hand `sink` to the platform...
/// mock.verify(); // Ensures all expectations were met
/// ```
///
/// A `save` with no expectation left panics, so a test that expects no persistence
/// can simply register no expectations.
#[derive(Clone, Default)]
pub struct MockSink {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    saved: Arc<Mutex<Vec<OrderRecord>>>,
}

impl MockSink {
    /// Creates a new mock sink with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `save` call.
    pub fn expect_save(&self) -> SaveExpectationBuilder {
        SaveExpectationBuilder {
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Records passed to `save`, in call order.
    pub fn saved(&self) -> Vec<OrderRecord> {
        self.saved.lock().unwrap().clone()
    }

    /// Number of `save` calls so far.
    pub fn calls(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

#[async_trait]
impl OrderSink for MockSink {
    async fn save(&self, record: &OrderRecord) -> Result<(), SinkError> {
        self.saved.lock().unwrap().push(record.clone());
        let expectation = self.expectations.lock().unwrap().pop_front();

        match expectation {
            Some(Expectation::Save { delay, response }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => panic!("Unexpected save for {}", record.id),
        }
    }
}

/// Builder for `save` expectations.
pub struct SaveExpectationBuilder {
    delay: Option<Duration>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl SaveExpectationBuilder {
    /// Delays the answer, e.g. to exercise the platform's sink timeout.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self) {
        self.push(Ok(()));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: SinkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<(), SinkError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Save {
            delay: self.delay,
            response,
        });
    }
}

// =============================================================================
// SCRIPTED KITCHEN
// =============================================================================

/// A kitchen that replays a script of outcomes and then falls back to a default.
#[derive(Clone)]
pub struct ScriptedKitchen {
    script: Arc<Mutex<VecDeque<bool>>>,
    fallback: bool,
    delay: Option<Duration>,
    calls: Arc<Mutex<usize>>,
}

impl ScriptedKitchen {
    /// `outcomes` are consumed in call order (`true` = prepared).
    pub fn new(outcomes: impl IntoIterator<Item = bool>, fallback: bool) -> Self {
        Self {
            script: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            fallback,
            delay: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Every preparation waits `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PreparationService for ScriptedKitchen {
    async fn prepare(&self, _order: &Order) -> Result<(), PreparationError> {
        *self.calls.lock().unwrap() += 1;
        let prepared = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if prepared {
            Ok(())
        } else {
            Err(PreparationError::Failed("scripted failure".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Customer, Dish, DishSize, OrderStatus};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn record() -> OrderRecord {
        OrderRecord {
            id: "order_1".into(),
            customer_name: "Test".into(),
            total_price: dec!(1.00),
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mock_sink_with_expectations() {
        let mock = MockSink::new();

        // Set up expectations
        mock.expect_save().return_ok();
        mock.expect_save().return_err(SinkError::Rejected("disk full".into()));

        // Execute operations
        assert!(mock.save(&record()).await.is_ok());
        let err = mock.save(&record()).await.unwrap_err();
        assert!(matches!(err, SinkError::Rejected(_)));

        // Verify all expectations were met
        assert_eq!(mock.calls(), 2);
        mock.verify();
    }

    #[test]
    #[should_panic(expected = "Not all expectations were met")]
    fn test_mock_sink_verify_fails_on_unmet_expectation() {
        let mock = MockSink::new();
        mock.expect_save().return_ok();
        mock.verify();
    }

    #[tokio::test]
    async fn test_scripted_kitchen_replays_then_falls_back() {
        let kitchen = ScriptedKitchen::new([false, true], false);
        let order = Order::new(
            Customer::new("Test", "Nowhere"),
            [(Dish::new("Soup", dec!(4.00), DishSize::Small), 1)],
        )
        .unwrap();

        assert!(kitchen.prepare(&order).await.is_err());
        assert!(kitchen.prepare(&order).await.is_ok());
        assert!(kitchen.prepare(&order).await.is_err());
        assert_eq!(kitchen.calls(), 3);
    }
}
