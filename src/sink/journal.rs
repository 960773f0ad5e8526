//! # Journal Sink
//!
//! An append-only JSON-lines journal owned by a single writer task.
//!
//! The [`JournalWriter`] is the "server" half: it owns the file and the receiver and
//! processes append requests one after another, so the file needs no lock. The
//! [`JournalSink`] is the cheap, cloneable "client" half handed to the platform.

use super::{OrderRecord, OrderSink, SinkError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Type alias for the one-shot response channel used by the writer.
pub type Response<T> = oneshot::Sender<Result<T, SinkError>>;

/// Message sent to the writer task.
#[derive(Debug)]
pub enum JournalRequest {
    Append {
        record: OrderRecord,
        respond_to: Response<()>,
    },
}

/// The task that owns the journal file.
pub struct JournalWriter {
    receiver: mpsc::Receiver<JournalRequest>,
    file: File,
    path: PathBuf,
    appended: u64,
}

impl JournalWriter {
    /// Opens (or creates) the journal at `path` for appending.
    ///
    /// `buffer_size` bounds how many append requests may queue up before senders wait.
    pub async fn open(
        path: impl Into<PathBuf>,
        buffer_size: usize,
    ) -> Result<(Self, JournalSink), SinkError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let writer = Self {
            receiver,
            file,
            path,
            appended: 0,
        };
        Ok((writer, JournalSink::new(sender)))
    }

    /// Runs the writer loop until every [`JournalSink`] clone has been dropped.
    pub async fn run(mut self) {
        info!(path = %self.path.display(), "Journal writer started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                JournalRequest::Append { record, respond_to } => {
                    // The caller timed out or went away and already reports this record as unsaved.
                    if respond_to.is_closed() {
                        warn!(id = %record.id, "Caller gone, append skipped");
                        continue;
                    }
                    debug!(id = %record.id, "Append");
                    let result = self.append(&record).await;
                    match &result {
                        Ok(()) => info!(id = %record.id, appended = self.appended, "Appended"),
                        Err(e) => warn!(id = %record.id, error = %e, "Append failed"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(appended = self.appended, "Journal writer shutdown");
    }

    async fn append(&mut self, record: &OrderRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let offset = self.file.metadata().await?.len();
        if let Err(e) = self.write_line(&line).await {
            // Drop the partial line so the next record starts on a clean one
            if let Err(truncate) = self.file.set_len(offset).await {
                warn!(offset, error = %truncate, "Could not truncate partial line");
            }
            return Err(e.into());
        }
        self.appended += 1;
        Ok(())
    }

    async fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.file.write_all(line).await?;
        self.file.flush().await
    }
}

/// Client handle for a running [`JournalWriter`].
#[derive(Clone)]
pub struct JournalSink {
    sender: mpsc::Sender<JournalRequest>,
}

impl JournalSink {
    pub fn new(sender: mpsc::Sender<JournalRequest>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl OrderSink for JournalSink {
    async fn save(&self, record: &OrderRecord) -> Result<(), SinkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(JournalRequest::Append {
                record: record.clone(),
                respond_to,
            })
            .await
            .map_err(|_| SinkError::WriterClosed)?;
        response.await.map_err(|_| SinkError::WriterDropped)?
    }
}

/// Reads every record from a journal file.
///
/// Malformed lines (e.g. left behind by a crash mid-write) are skipped with a warning.
pub async fn read_journal(path: impl AsRef<Path>) -> Result<Vec<OrderRecord>, SinkError> {
    let path = path.as_ref();
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut records = Vec::new();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(path = %path.display(), line = line_no, error = %e, "Skipping malformed journal line"),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn record(id: &str) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            customer_name: "Jean Dupont".to_string(),
            total_price: dec!(27.50),
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_journal_appends_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal").join("orders.jsonl");

        // Start writer
        let (writer, sink) = JournalWriter::open(&path, 8).await.unwrap();
        let handle = tokio::spawn(writer.run());

        sink.save(&record("order_1")).await.unwrap();
        sink.save(&record("order_2")).await.unwrap();

        // Dropping the last sink closes the channel and stops the writer
        drop(sink);
        handle.await.unwrap();

        let records = read_journal(&path).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "order_1");
        assert_eq!(records[1].id, "order_2");
        assert_eq!(records[0].total_price, dec!(27.50));
        assert_eq!(records[0].status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_journal_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.jsonl");

        for id in ["order_1", "order_2"] {
            let (writer, sink) = JournalWriter::open(&path, 1).await.unwrap();
            let handle = tokio::spawn(writer.run());
            sink.save(&record(id)).await.unwrap();
            drop(sink);
            handle.await.unwrap();
        }

        let ids: Vec<String> = read_journal(&path)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["order_1", "order_2"]);
    }

    #[tokio::test]
    async fn test_abandoned_append_is_not_journaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.jsonl");
        let (writer, sink) = JournalWriter::open(&path, 4).await.unwrap();

        // Queue a request whose caller gives up before the writer gets to it
        let (respond_to, response) = oneshot::channel();
        sink.sender
            .send(JournalRequest::Append {
                record: record("order_1"),
                respond_to,
            })
            .await
            .unwrap();
        drop(response);

        let handle = tokio::spawn(writer.run());
        sink.save(&record("order_2")).await.unwrap();
        drop(sink);
        handle.await.unwrap();

        let ids: Vec<String> = read_journal(&path)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["order_2"]);
    }

    #[tokio::test]
    async fn test_read_journal_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.jsonl");

        let good = |id| serde_json::to_string(&record(id)).unwrap();
        let contents = format!("{}\n{{\"id\":\"order_2\",\"cust\n{}\n", good("order_1"), good("order_3"));
        tokio::fs::write(&path, contents).await.unwrap();

        let ids: Vec<String> = read_journal(&path)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["order_1", "order_3"]);
    }

    #[tokio::test]
    async fn test_save_after_writer_gone_reports_closed() {
        let (sender, receiver) = mpsc::channel(1);
        let sink = JournalSink::new(sender);
        drop(receiver);

        let err = sink.save(&record("order_1")).await.unwrap_err();
        assert!(matches!(err, SinkError::WriterClosed));
    }

    #[tokio::test]
    async fn test_save_with_dropped_responder_reports_dropped() {
        let (sender, mut receiver) = mpsc::channel(1);
        let sink = JournalSink::new(sender);

        // Fake writer that swallows the request
        let fake = tokio::spawn(async move {
            let request = receiver.recv().await;
            drop(request);
        });

        let err = sink.save(&record("order_1")).await.unwrap_err();
        assert!(matches!(err, SinkError::WriterDropped));
        fake.await.unwrap();
    }
}
