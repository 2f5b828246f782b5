use std::sync::Arc;

use futures::StreamExt;
use store::{StatsStore, StatsWriter};
use thiserror::Error;

use super::{
    config::SourceMode,
    message::{Extraction, ParsedMessage, extract_message, split_words},
    source::{LineSource, SourceError},
    window::{Clock, CompletedWindow, SystemClock, WindowAggregator},
};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Failed to read from source: {0}")]
    Read(#[from] std::io::Error),
}

/// What one `run` went through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: u64,
    /// Lines without a candidate payload.
    pub skipped: u64,
    pub messages: u64,
    pub malformed: u64,
    pub windows_flushed: u64,
}

/// Ingests chat lines into the aggregate store.
///
/// Lines are handled one at a time and each message write is awaited before
/// the next line is read. Completed one-second windows are written from a
/// detached task so a slow store never stalls ingestion.
pub struct MessageWorker {
    source: LineSource,
    writer: StatsWriter,
    clock: Arc<dyn Clock>,
    window: WindowAggregator,
}

impl MessageWorker {
    pub fn new(store: Arc<dyn StatsStore>, mode: SourceMode) -> Result<Self, SourceError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let window = WindowAggregator::new(clock.now_seconds());
        Ok(Self {
            source: LineSource::new(mode)?,
            writer: StatsWriter::new(store),
            clock,
            window,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.window = WindowAggregator::new(clock.now_seconds());
        self.clock = clock;
        self
    }

    /// Ingest everything `locator` yields. Returns once the source is exhausted,
    /// or with an error if it cannot be opened or breaks mid-stream.
    pub async fn run(&mut self, locator: &str) -> Result<RunSummary, WorkerError> {
        self.window = WindowAggregator::new(self.clock.now_seconds());
        let mut lines = self.source.open(locator).await?;
        tracing::info!("Processing messages from {}", locator);

        let mut summary = RunSummary::default();
        while let Some(line) = lines.next().await {
            let line = line?;
            summary.lines += 1;

            match extract_message(&line) {
                Extraction::NoCandidate => {
                    summary.skipped += 1;
                    continue;
                }
                Extraction::Parsed(message) => {
                    self.write_message(&message).await;
                    summary.messages += 1;
                }
                Extraction::Malformed { candidate, error } => {
                    tracing::warn!("Quarantining malformed payload {:?}: {}", candidate, error);
                    self.quarantine(&line).await;
                    summary.malformed += 1;
                }
            }

            if let Some(window) = self.window.observe(self.clock.now_seconds()) {
                self.flush_window(window);
                summary.windows_flushed += 1;
            }
        }

        tracing::info!(
            "Finished processing {}: {} lines, {} messages, {} malformed, {} skipped",
            locator,
            summary.lines,
            summary.messages,
            summary.malformed,
            summary.skipped
        );
        Ok(summary)
    }

    /// Release the store connection. Call once `run` has returned.
    pub async fn close(&self) {
        self.writer.store().close().await;
    }

    async fn write_message(&self, message: &ParsedMessage) {
        let words = split_words(&message.body);
        // Counters may be partially applied at this point; ingestion carries on regardless.
        if let Err(e) = self
            .writer
            .record_message(&message.room, &message.nick, words.as_slice())
            .await
        {
            tracing::error!("Failed to record message counters: {}", e);
        }
    }

    async fn quarantine(&self, raw: &str) {
        if let Err(e) = self.writer.record_failure(raw).await {
            tracing::error!("Failed to quarantine line: {}", e);
        }
    }

    fn flush_window(&self, window: CompletedWindow) {
        let writer = self.writer.clone();
        tokio::spawn(async move {
            writer.record_window(window.second, window.count).await;
            tracing::debug!(
                "Flushed window {} with {} messages",
                window.second,
                window.count
            );
        });
    }
}
