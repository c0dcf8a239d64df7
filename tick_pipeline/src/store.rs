//! Destination stores.
//!
//! `BatchStore` is the seam between the writer worker and the time-series
//! database. `InfluxStore` speaks the InfluxDB 1.x HTTP API:
//! - `GET /ping` once at connect time; it must succeed before any write
//! - `POST /write?db=<db>&precision=ns` per batch, body in line protocol
//!
//! The store is synchronous: a slow write blocks the worker, which blocks the
//! producer through the rendezvous intake.
use std::time::{Duration, Instant};

use log::{debug, info};
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use tick_common::net::base_url;
use tick_common::{IngestError, Result};

use crate::point::WriteBatch;

/// Bound on establishing a TCP connection. Requests as a whole are not timed out.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Header carrying the server version in `/ping` answers.
const VERSION_HEADER: &str = "X-Influxdb-Version";

/// Where flushed batches go.
pub trait BatchStore: Send + 'static {
    /// Database rows are written to.
    fn database(&self) -> &str;

    /// Write one batch. Any error is fatal for the run.
    fn write_batch(&mut self, batch: &WriteBatch) -> Result<()>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}

/// Error body returned by InfluxDB, e.g. `{"error":"database not found: \"x\""}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// InfluxDB 1.x HTTP client bound to one database.
pub struct InfluxStore {
    client: Client,
    base_url: String,
    database: String,
    version: String,
}

impl InfluxStore {
    /// Build the client and ping `host` (`host:port`). Fails if the ping does not succeed.
    pub fn connect(host: &str, database: &str) -> Result<Self> {
        let connect_error = |reason: String| IngestError::Connect {
            host: host.to_string(),
            reason,
        };

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| connect_error(e.to_string()))?;

        let base_url = base_url(host);
        let started = Instant::now();
        let response = client
            .get(format!("{}/ping", base_url))
            .send()
            .map_err(|e| connect_error(e.to_string()))?;
        let elapsed = started.elapsed();

        if !response.status().is_success() {
            return Err(connect_error(error_reason(response)));
        }

        let version = response
            .headers()
            .get(VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        info!("Ping in {:?}. Version: {}", elapsed, version);

        Ok(Self {
            client,
            base_url,
            database: database.to_string(),
            version,
        })
    }

    /// Server version reported by the handshake.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl BatchStore for InfluxStore {
    fn database(&self) -> &str {
        &self.database
    }

    fn write_batch(&mut self, batch: &WriteBatch) -> Result<()> {
        let write_error = |reason: String| IngestError::Write {
            measurement: batch.measurement.clone(),
            count: batch.len(),
            reason,
        };

        let body = batch.to_line_protocol()?;
        let url = Url::parse_with_params(
            &format!("{}/write", self.base_url),
            &[("db", batch.database.as_str()), ("precision", "ns")],
        )
        .map_err(|e| write_error(e.to_string()))?;
        let response = self
            .client
            .post(url)
            .body(body)
            .send()
            .map_err(|e| write_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(write_error(error_reason(response)));
        }
        debug!("Results: {} for {} points", status, batch.len());
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "InfluxDB"
    }
}

/// Extracts the server's explanation from a failed response.
fn error_reason(response: Response) -> String {
    let status = response.status();
    let text = response.text().unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => format!("{}: {}", status, body.error),
        Err(_) if text.trim().is_empty() => status.to_string(),
        Err(_) => format!("{}: {}", status, text.trim()),
    }
}
