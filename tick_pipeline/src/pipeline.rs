//! Per-run ingestion session.
//!
//! A `Pipeline` owns everything one ticker stream needs: the trading date for
//! decoding, the `MonotonicGate`, the optional `BatchWriter` and the run
//! counters. Nothing is global, so several tickers can run side by side, each
//! with its own pipeline and therefore its own gate state.
//!
//! Without a writer (dry run) the pipeline still decodes and gates, and logs
//! every accepted update instead of sending it.
use chrono::NaiveDate;
use log::{error, info, warn};
use tick_common::{IngestError, MarketUpdate, Record, Result};

use crate::decoder::decode;
use crate::gate::MonotonicGate;
use crate::store::BatchStore;
use crate::writer::{BatchWriter, WriterSummary};

/// Plain values a run is configured with.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Ticker, used as the measurement name.
    pub ticker: String,
    /// Trading date the time-of-day fields belong to.
    pub date: NaiveDate,
    /// Stop after this many accepted updates.
    pub limit: Option<u64>,
}

/// Outcome of feeding one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Passed the gate and was handed to the writer.
    Accepted,
    /// Dropped by the gate (duplicate or earlier timestamp).
    Rejected,
    /// Could not be decoded; skipped.
    Malformed,
    /// Accepted, and the configured limit is now reached.
    LimitReached,
}

/// Counters of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records read from the source.
    pub records: u64,
    /// Records skipped because they did not decode.
    pub malformed: u64,
    /// Updates that passed the gate.
    pub accepted: u64,
    /// Updates dropped by the gate.
    pub rejected: u64,
    /// Updates the store confirmed.
    pub written: usize,
    /// Store calls issued.
    pub batches: usize,
}

/// Ingestion session for one ticker stream.
pub struct Pipeline {
    config: PipelineConfig,
    gate: MonotonicGate,
    writer: Option<BatchWriter>,
    dry_run: bool,
    summary: RunSummary,
}

impl Pipeline {
    /// Create a session. `writer: None` runs dry.
    pub fn new(config: PipelineConfig, writer: Option<BatchWriter>) -> Self {
        Self {
            config,
            gate: MonotonicGate::new(),
            dry_run: writer.is_none(),
            writer,
            summary: RunSummary::default(),
        }
    }

    /// Spawn a writer for `config.ticker` on `store` and build the session around it.
    pub fn with_store<S: BatchStore>(config: PipelineConfig, store: S) -> Result<Self> {
        let writer = BatchWriter::spawn(store, &config.ticker)?;
        Ok(Self::new(config, Some(writer)))
    }

    /// `true` without a writer.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Gate `update` and hand it to the writer. Returns whether it was accepted.
    ///
    /// If the writer has stopped, it is closed here and its fatal error returned.
    pub fn submit(&mut self, update: MarketUpdate) -> Result<bool> {
        if !self.gate.accept(&update) {
            self.summary.rejected += 1;
            return Ok(false);
        }
        self.summary.accepted += 1;

        let Some(writer) = &self.writer else {
            if !self.dry_run {
                return Err(IngestError::ChannelSend(format!(
                    "writer for {} is closed",
                    self.config.ticker
                )));
            }
            info!("unique update: {}", serde_json::to_string(&update)?);
            return Ok(true);
        };
        if let Err(send_error) = writer.send(update) {
            return Err(match self.writer.take().map(BatchWriter::close) {
                Some(Err(fatal)) => fatal,
                _ => send_error,
            });
        }
        Ok(true)
    }

    /// Decode and submit one record. Decode errors are logged and skipped.
    pub fn process(&mut self, record: &Record) -> Result<Step> {
        self.summary.records += 1;
        let update = match decode(&record.fields, self.config.date) {
            Ok(update) => update,
            Err(e) => {
                warn!("line {} error: {} {:?}", record.line, e, record.fields);
                self.summary.malformed += 1;
                return Ok(Step::Malformed);
            }
        };

        if !self.submit(update)? {
            return Ok(Step::Rejected);
        }
        match self.config.limit {
            Some(limit) if self.summary.accepted >= limit => Ok(Step::LimitReached),
            _ => Ok(Step::Accepted),
        }
    }

    /// Feed `records` until exhausted or the limit is reached, then close.
    ///
    /// A source error or a fatal writer error ends the run with that error. If
    /// the flush after a source error fails too, the write error is returned.
    pub fn run<I>(mut self, records: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    // Flush what was accepted before reporting the source error.
                    if let Err(fatal) = self.close_writer() {
                        error!("source error: {}", e);
                        return Err(fatal);
                    }
                    return Err(e);
                }
            };
            if self.process(&record)? == Step::LimitReached {
                info!("Reached limit of {} updates", self.summary.accepted);
                break;
            }
        }
        self.close()
    }

    /// Close intake, wait for the final flush and return the counters.
    pub fn close(mut self) -> Result<RunSummary> {
        self.close_writer()?;
        info!(
            "{}: {} records, {} accepted, {} rejected, {} malformed, {} written",
            self.config.ticker,
            self.summary.records,
            self.summary.accepted,
            self.summary.rejected,
            self.summary.malformed,
            self.summary.written
        );
        Ok(self.summary)
    }

    fn close_writer(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            let WriterSummary { written, batches } = writer.close()?;
            self.summary.written = written;
            self.summary.batches = batches;
        }
        Ok(())
    }
}
