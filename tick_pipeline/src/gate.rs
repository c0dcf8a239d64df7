//! Strictly increasing timestamp filter.
//!
//! Feeds repeat or jitter within the same instant; the first update seen for
//! a timestamp wins and anything at or before the last accepted timestamp is
//! dropped. Nothing is queued or reordered.
use chrono::{DateTime, Local};
use log::trace;
use tick_common::MarketUpdate;

/// Ordering gate for one ticker stream.
#[derive(Debug, Default)]
pub struct MonotonicGate {
    /// Timestamp of the last accepted update, `None` until the first one.
    last: Option<DateTime<Local>>,
}

impl MonotonicGate {
    /// Create a gate that accepts any first timestamp.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and remembers the timestamp iff it advances the stream.
    pub fn accept(&mut self, update: &MarketUpdate) -> bool {
        match self.last {
            Some(last) if update.timestamp <= last => {
                trace!("dropping update at {} (last {})", update.timestamp, last);
                false
            }
            _ => {
                self.last = Some(update.timestamp);
                true
            }
        }
    }

    /// Timestamp of the last accepted update.
    pub fn last_accepted(&self) -> Option<DateTime<Local>> {
        self.last
    }
}
