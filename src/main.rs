//! # Delivery Platform Simulation
//!
//! Submits a batch of orders from several concurrent workers and reports how they ended.
//!
//! ```bash
//! RUST_LOG=info cargo run -- --orders 10 --workers 4
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use delivery_platform::config::PlatformConfig;
use delivery_platform::lifecycle::{setup_tracing, DeliverySystem};
use delivery_platform::model::{Customer, Dish, DishSize, Order, OrderStatus};
use delivery_platform::platform::{DeliveryPlatform, Persistence, Receipt};
use rust_decimal_macros::dec;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[derive(Parser, Debug)]
#[command(name = "delivery-platform", about = "Simulate concurrent delivery order intake")]
struct Args {
    /// Number of orders to submit
    #[arg(long, default_value_t = 10)]
    orders: usize,

    /// Number of concurrent workers submitting orders
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Probability that the kitchen prepares an order (overrides the config file)
    #[arg(long)]
    success_rate: Option<f64>,

    /// Append completed orders to this JSON-lines journal (overrides the config file)
    #[arg(long)]
    journal: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PlatformConfig::from_file(path)?,
        None => PlatformConfig::default(),
    };
    if let Some(rate) = args.success_rate {
        config.success_rate = rate;
    }
    if let Some(journal) = args.journal.clone() {
        config.journal_path = Some(journal);
    }

    info!(orders = args.orders, workers = args.workers, "Starting simulation");
    let system = DeliverySystem::start(config)
        .await
        .context("Failed to start delivery system")?;

    let receipts = run_workers(&system.platform, args.orders, args.workers.max(1)).await?;

    let completed = receipts.iter().filter(|r| r.status == OrderStatus::Completed).count();
    let cancelled = receipts.iter().filter(|r| r.status == OrderStatus::Cancelled).count();
    let unpersisted = receipts
        .iter()
        .filter(|r| matches!(r.persistence, Persistence::Failed(_)))
        .count();
    info!(
        submitted = receipts.len(),
        completed,
        cancelled,
        unpersisted,
        registered = system.platform.order_count(),
        "Simulation finished"
    );
    if let Some(path) = system.journal_path() {
        info!(journal = %path.display(), "Completed orders journaled");
    }

    system.shutdown().await?;
    Ok(())
}

/// Spreads `orders` submissions over `workers` tasks, like restaurants placing orders at once.
async fn run_workers(platform: &DeliveryPlatform, orders: usize, workers: usize) -> Result<Vec<Receipt>> {
    let pizza = Dish::new("Pizza Margherita", dec!(15.50), DishSize::Large);
    let burger = Dish::new("Burger Deluxe", dec!(12.00), DishSize::Medium);
    let customers = [
        Arc::new(Customer::new("Jean Dupont", "123 Rue de la Paix, Paris")),
        Arc::new(Customer::new("Marie Martin", "456 Avenue des Fleurs, Lyon")),
    ];

    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let platform = platform.clone();
        let menu = [pizza.clone(), burger.clone()];
        let customers = customers.clone();

        let span = tracing::info_span!("worker", worker);
        handles.push(tokio::spawn(
            async move {
                let mut receipts = Vec::new();
                for n in (worker..orders).step_by(workers) {
                    let customer = Arc::clone(&customers[n % 2]);
                    let order = Order::new(customer, menu.iter().cloned().map(|dish| (dish, 1)))?;
                    info!(simulation = n + 1, "Placing order");
                    match platform.submit_order(order).await {
                        Ok(receipt) => receipts.push(receipt),
                        Err(e) => error!(error = %e, "Submission failed"),
                    }
                }
                anyhow::Ok(receipts)
            }
            .instrument(span),
        ));
    }

    let mut receipts = Vec::with_capacity(orders);
    for handle in handles {
        receipts.extend(handle.await.context("Worker task panicked")??);
    }
    receipts.sort_by_key(|r| r.key);
    Ok(receipts)
}
