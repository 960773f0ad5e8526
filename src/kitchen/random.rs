use super::{PreparationError, PreparationService};
use crate::model::Order;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, instrument};

/// Simulated kitchen: succeeds with probability `success_rate`.
///
/// `prep_time` is slept before the outcome is reported, which stands in for the
/// time a real kitchen takes. It only delays the order being prepared.
#[derive(Debug, Clone)]
pub struct RandomKitchen {
    success_rate: f64,
    prep_time: Duration,
}

impl RandomKitchen {
    /// Default split: four out of five orders are prepared.
    pub const DEFAULT_SUCCESS_RATE: f64 = 0.8;

    /// Creates a kitchen. `success_rate` is clamped to `[0.0, 1.0]`; NaN counts as 0.
    pub fn new(success_rate: f64, prep_time: Duration) -> Self {
        let success_rate = if success_rate.is_nan() {
            0.0
        } else {
            success_rate.clamp(0.0, 1.0)
        };
        Self {
            success_rate,
            prep_time,
        }
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }
}

impl Default for RandomKitchen {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SUCCESS_RATE, Duration::ZERO)
    }
}

#[async_trait]
impl PreparationService for RandomKitchen {
    #[instrument(skip_all, fields(key = ?order.key()))]
    async fn prepare(&self, order: &Order) -> Result<(), PreparationError> {
        // ThreadRng is not Send, so draw before awaiting.
        let prepared = rand::thread_rng().gen_bool(self.success_rate);

        if !self.prep_time.is_zero() {
            tokio::time::sleep(self.prep_time).await;
        }

        debug!(prepared, "Preparation decided");
        if prepared {
            Ok(())
        } else {
            Err(PreparationError::Failed(format!(
                "kitchen could not prepare {} item(s)",
                order.items().values().sum::<u32>()
            )))
        }
    }
}
