//! Background batch writer.
//!
//! One worker thread owns the batch buffer and the `BatchStore`. The producer
//! hands accepted updates over a rendezvous channel (`bounded(0)`): every
//! `send` blocks until the worker takes the update, so a slow store throttles
//! decoding without any buffering beyond the batch itself.
//!
//! Worker lifecycle:
//! - Running — receive, append, flush every `BATCH_SIZE` updates.
//! - Draining — intake closed; flush whatever is left, even a single update.
//! - Done — report the outcome on the completion channel and exit.
//!
//! A failed write stops the worker on the spot. Buffered and not yet sent
//! updates are lost; the error comes back from `close` (and makes further
//! `send`s fail).
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};
use log::{debug, error, info};
use tick_common::{IngestError, MarketUpdate, Result};

use crate::point::WriteBatch;
use crate::store::BatchStore;

/// Number of updates written per store call.
pub const BATCH_SIZE: usize = 50;

/// What the worker did before it exited cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterSummary {
    /// Updates written to the store.
    pub written: usize,
    /// Store calls issued.
    pub batches: usize,
}

/// Producer-side handle of the writer worker.
pub struct BatchWriter {
    intake: Sender<MarketUpdate>,
    done: Receiver<Result<WriterSummary>>,
    handle: JoinHandle<()>,
    measurement: String,
}

impl BatchWriter {
    /// Start the worker thread writing to `store` under `measurement`.
    pub fn spawn<S: BatchStore>(store: S, measurement: &str) -> Result<Self> {
        let (intake, intake_rx) = bounded::<MarketUpdate>(0);
        let (done_tx, done) = bounded::<Result<WriterSummary>>(1);

        let worker = Worker {
            store,
            measurement: measurement.to_string(),
            buffer: Vec::with_capacity(BATCH_SIZE),
            summary: WriterSummary::default(),
        };
        let handle = thread::Builder::new()
            .name(format!("writer-{}", measurement))
            .spawn(move || worker.run(intake_rx, done_tx))?;

        Ok(Self {
            intake,
            done,
            handle,
            measurement: measurement.to_string(),
        })
    }

    /// Hand `update` to the worker, blocking until it is taken.
    ///
    /// Fails once the worker has stopped; `close` then returns the reason.
    pub fn send(&self, update: MarketUpdate) -> Result<()> {
        self.intake
            .send(update)
            .map_err(|_| IngestError::ChannelSend(format!("writer for {} has stopped", self.measurement)))
    }

    /// Close intake and wait until the worker has flushed and exited.
    pub fn close(self) -> Result<WriterSummary> {
        let BatchWriter {
            intake,
            done,
            handle,
            measurement,
        } = self;
        drop(intake);

        let outcome = done.recv();
        if handle.join().is_err() {
            return Err(IngestError::WorkerPanicked(format!("writer for {}", measurement)));
        }
        outcome.map_err(|e| IngestError::ChannelRecv(e.to_string()))?
    }
}

/// Worker-side state; lives on the writer thread only.
struct Worker<S> {
    store: S,
    measurement: String,
    buffer: Vec<MarketUpdate>,
    summary: WriterSummary,
}

impl<S: BatchStore> Worker<S> {
    fn run(mut self, intake: Receiver<MarketUpdate>, done: Sender<Result<WriterSummary>>) {
        let outcome = self.drain(intake);
        match &outcome {
            Ok(summary) => info!(
                "Finished {} updates in {} batches to {} ({})",
                summary.written,
                summary.batches,
                self.measurement,
                self.store.backend_type()
            ),
            Err(e) => error!("Writer for {} stopped: {}", self.measurement, e),
        }
        // The handle may already be gone if the pipeline was dropped without closing.
        let _ = done.send(outcome);
    }

    fn drain(&mut self, intake: Receiver<MarketUpdate>) -> Result<WriterSummary> {
        for update in intake.iter() {
            debug!("Update: {:?}", update);
            self.buffer.push(update);
            if self.buffer.len() == BATCH_SIZE {
                self.flush()?;
            }
        }
        // Intake closed.
        self.flush()?;
        Ok(self.summary)
    }

    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let batch = WriteBatch::new(self.store.database(), &self.measurement, &self.buffer);
        self.buffer.clear();
        self.store.write_batch(&batch)?;

        self.summary.written += batch.len();
        self.summary.batches += 1;
        info!("Wrote {} OK", batch.len());
        Ok(())
    }
}
