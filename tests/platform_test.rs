use async_trait::async_trait;
use delivery_platform::framework::mock::{MockSink, ScriptedKitchen};
use delivery_platform::kitchen::{FixedKitchen, PreparationError, PreparationService};
use delivery_platform::model::{Customer, Dish, DishSize, Order, OrderKey, OrderStatus};
use delivery_platform::platform::{DeliveryPlatform, Persistence};
use delivery_platform::sink::{MemorySink, SinkError};
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn menu() -> Vec<Dish> {
    vec![
        Dish::new("Pizza Margherita", dec!(15.50), DishSize::Large),
        Dish::new("Burger Deluxe", dec!(12.00), DishSize::Medium),
    ]
}

fn customers() -> [Arc<Customer>; 2] {
    [
        Arc::new(Customer::new("Jean Dupont", "123 Rue de la Paix, Paris")),
        Arc::new(Customer::new("Marie Martin", "456 Avenue des Fleurs, Lyon")),
    ]
}

fn order_for(customer: &Arc<Customer>) -> Order {
    Order::new(Arc::clone(customer), menu().into_iter().map(|dish| (dish, 1))).unwrap()
}

/// 100 orders from 8 concurrent callers, kitchen forced to fail:
/// 100 distinct keys, 100 cancelled orders, zero sink calls.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_failures_cancel_everything() {
    let mock = MockSink::new();
    let platform = DeliveryPlatform::new(Arc::new(FixedKitchen::failing()), Arc::new(mock.clone()));
    let [jean, _] = customers();

    let mut handles = vec![];
    for caller in 0..8 {
        let platform = platform.clone();
        let jean = Arc::clone(&jean);
        handles.push(tokio::spawn(async move {
            let mut keys = vec![];
            for _ in (caller..100).step_by(8) {
                let receipt = platform.submit_order(order_for(&jean)).await.unwrap();
                assert_eq!(receipt.status, OrderStatus::Cancelled);
                assert!(matches!(receipt.persistence, Persistence::NotAttempted));
                keys.push(receipt.key);
            }
            keys
        }));
    }

    let mut keys = HashSet::new();
    for handle in handles {
        for key in handle.await.unwrap() {
            assert!(keys.insert(key), "duplicate key {}", key);
        }
    }

    assert_eq!(keys.len(), 100);
    assert_eq!(keys, (1..=100).map(OrderKey).collect::<HashSet<_>>());
    assert_eq!(platform.order_count(), 100);
    assert_eq!(platform.find_orders_by_status(OrderStatus::Cancelled).len(), 100);
    assert!(platform.find_orders_by_status(OrderStatus::Completed).is_empty());
    assert_eq!(mock.calls(), 0);
}

/// Every successful order is saved exactly once, and every order ends terminal.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_successes_persist_each_order_once() {
    let mock = MockSink::new();
    for _ in 0..64 {
        mock.expect_save().return_ok();
    }
    let platform = DeliveryPlatform::new(Arc::new(FixedKitchen::succeeding()), Arc::new(mock.clone()));
    let [jean, marie] = customers();

    let mut handles = vec![];
    for n in 0..64 {
        let platform = platform.clone();
        let customer = if n % 2 == 0 { Arc::clone(&jean) } else { Arc::clone(&marie) };
        handles.push(tokio::spawn(async move {
            platform.submit_order(order_for(&customer)).await.unwrap()
        }));
    }
    for handle in handles {
        let receipt = handle.await.unwrap();
        assert_eq!(receipt.status, OrderStatus::Completed);
        assert!(receipt.is_persisted());
    }

    let saved: HashSet<String> = mock.saved().into_iter().map(|r| r.id).collect();
    assert_eq!(saved.len(), 64);
    assert_eq!(mock.calls(), 64);
    mock.verify();

    assert_eq!(platform.find_orders_by_customer(&jean).len(), 32);
    assert_eq!(platform.find_orders_by_customer(&marie).len(), 32);
    assert!(platform.find_orders_by_status(OrderStatus::Created).is_empty());
}

/// Customer queries return exactly that customer's orders, whatever the interleaving.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_find_by_customer_matches_registrations() {
    let kitchen = ScriptedKitchen::new(Vec::new(), false);
    let platform = DeliveryPlatform::new(Arc::new(kitchen), Arc::new(MockSink::new()));
    let [jean, marie] = customers();
    let stranger = Customer::new("Jean Dupont", "somewhere else");

    let mut handles = vec![];
    for n in 0..40 {
        let platform = platform.clone();
        let customer = if n % 4 == 0 { Arc::clone(&marie) } else { Arc::clone(&jean) };
        handles.push(tokio::spawn(async move {
            let receipt = platform.submit_order(order_for(&customer)).await.unwrap();
            (receipt.key, customer)
        }));
    }

    let mut expected_marie = vec![];
    for handle in handles {
        let (key, customer) = handle.await.unwrap();
        if *customer == *marie {
            expected_marie.push(key);
        }
    }
    expected_marie.sort();

    let found: Vec<OrderKey> = platform
        .find_orders_by_customer(&marie)
        .iter()
        .filter_map(|o| o.key())
        .collect();
    assert_eq!(found, expected_marie);
    assert_eq!(platform.find_orders_by_customer(&jean).len(), 30);
    // Same name, different address: a different customer
    assert!(platform.find_orders_by_customer(&stranger).is_empty());
}

/// One order, kitchen forced to succeed, sink failing: still completed, no error to the caller.
#[tokio::test]
async fn test_sink_failure_is_not_fatal() {
    let mock = MockSink::new();
    mock.expect_save()
        .return_err(SinkError::Rejected("database unreachable".into()));
    let platform = DeliveryPlatform::new(Arc::new(FixedKitchen::succeeding()), Arc::new(mock.clone()));
    let [jean, _] = customers();

    let receipt = platform.submit_order(order_for(&jean)).await.unwrap();

    assert_eq!(receipt.status, OrderStatus::Completed);
    assert!(!receipt.is_persisted());
    assert_eq!(mock.calls(), 1);
    mock.verify();

    // Re-querying never shows a further transition
    for _ in 0..3 {
        let stored = platform.find_order_by_id(receipt.key).unwrap();
        assert_eq!(stored.status(), OrderStatus::Completed);
    }
}

/// A kitchen that holds one customer's orders until released.
struct HoldFor {
    customer: &'static str,
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl PreparationService for HoldFor {
    async fn prepare(&self, order: &Order) -> Result<(), PreparationError> {
        if order.customer().name == self.customer {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(())
    }
}

/// A slow preparation for one order does not hold up other submissions or lookups.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_order_does_not_block_others() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let kitchen = HoldFor {
        customer: "Marie Martin",
        entered: Arc::clone(&entered),
        release: Arc::clone(&release),
    };
    let sink = MemorySink::new();
    let platform = DeliveryPlatform::new(Arc::new(kitchen), Arc::new(sink.clone()));
    let [jean, marie] = customers();

    let slow_order = {
        let platform = platform.clone();
        tokio::spawn(async move { platform.submit_order(order_for(&marie)).await })
    };

    // The slow submission is registered and parked in the kitchen
    entered.notified().await;

    // Generous bound, only there so a regression fails instead of hanging
    let receipt = tokio::time::timeout(Duration::from_secs(30), platform.submit_order(order_for(&jean)))
        .await
        .expect("fast submission should not wait on the slow one")
        .unwrap();
    assert_eq!(receipt.key, OrderKey(2));
    assert_eq!(receipt.status, OrderStatus::Completed);

    // The slow order is registered but still being prepared
    let pending = platform.find_order_by_id(OrderKey(1)).unwrap();
    assert_eq!(pending.status(), OrderStatus::Created);
    assert_eq!(platform.find_orders_by_status(OrderStatus::Created).len(), 1);

    release.notify_one();
    let done = slow_order.await.unwrap().unwrap();
    assert_eq!(done.key, OrderKey(1));
    assert_eq!(done.status, OrderStatus::Completed);
    assert_eq!(pending.status(), OrderStatus::Completed);
    assert_eq!(sink.len(), 2);
}
