use crate::config::{ConfigError, PlatformConfig};
use crate::kitchen::RandomKitchen;
use crate::platform::DeliveryPlatform;
use crate::sink::{JournalWriter, MemorySink, OrderSink, SinkError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Errors raised while starting or stopping the system.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot open journal: {0}")]
    Sink(#[from] SinkError),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// The runtime orchestrator for the delivery platform.
///
/// `DeliverySystem` is responsible for:
/// - **Wiring**: building the kitchen and the sink the configuration asks for and
///   injecting them into the [`DeliveryPlatform`]
/// - **Lifecycle Management**: spawning the journal writer and stopping it again
///
/// # Example
///
/// ```ignore
/// let system = DeliverySystem::start(PlatformConfig::default()).await?;
///
/// let receipt = system.platform.submit_order(order).await?;
///
/// // Gracefully shut down when done
/// system.shutdown().await?;
/// ```
pub struct DeliverySystem {
    /// The intake and query surface.
    pub platform: DeliveryPlatform,

    /// The in-memory sink, when no journal is configured.
    memory: Option<MemorySink>,

    journal_path: Option<PathBuf>,

    /// Task handles for background tasks (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl DeliverySystem {
    /// Validates `config`, builds the collaborators and starts background tasks.
    pub async fn start(config: PlatformConfig) -> Result<Self, SystemError> {
        config.validate()?;

        let kitchen = Arc::new(RandomKitchen::new(config.success_rate, config.prep_time()));

        let mut handles = Vec::new();
        let mut memory = None;
        let sink: Arc<dyn OrderSink> = match &config.journal_path {
            Some(path) => {
                let (writer, sink) = JournalWriter::open(path, config.journal_buffer).await?;
                handles.push(tokio::spawn(writer.run()));
                Arc::new(sink)
            }
            None => {
                let sink = MemorySink::new();
                memory = Some(sink.clone());
                Arc::new(sink)
            }
        };

        let platform = DeliveryPlatform::from_config(&config, kitchen, sink);

        info!(
            success_rate = config.success_rate,
            max_orders = ?config.max_orders,
            journal = ?config.journal_path,
            "Delivery system started"
        );

        Ok(Self {
            platform,
            memory,
            journal_path: config.journal_path,
            handles,
        })
    }

    /// The in-memory sink, if the system was started without a journal.
    pub fn memory_sink(&self) -> Option<&MemorySink> {
        self.memory.as_ref()
    }

    pub fn journal_path(&self) -> Option<&PathBuf> {
        self.journal_path.as_ref()
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the platform closes the journal channel once every clone handed out
    /// to callers has been dropped too; the writer then drains and exits.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        drop(self.platform);
        drop(self.memory);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Background task failed: {:?}", e);
                return Err(SystemError::TaskFailed(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
