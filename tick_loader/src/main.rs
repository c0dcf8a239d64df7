//! Tick Loader — reads one day of quotes for one ticker from a CSV file and
//! writes them to InfluxDB in batches, dropping duplicate and out-of-order
//! timestamps on the way.
//!
//! Usage example (CLI):
//! ```bash
//! tick_loader --host localhost:8086 --db marketdata --count 1000 ./CSGN_2010-12-16.csv
//! tick_loader --dry-run ./CSGN_2010-12-16.csv
//! ```
//!
//! The file name carries the ticker and the trading date, see `source`.
//! Each line looks like `09:04:16.717000,38.19,2781,38.25,3308,38.21,638,Trading`.
//!
//! Malformed lines are reported and skipped. A failed connection or a failed
//! batch write stops the run with a non-zero exit code. Ctrl+C stops reading
//! input; what was accepted so far is still flushed.
#![warn(missing_docs)]
mod args;
mod source;

use crate::args::Args;
use crate::source::{open_records, parse_filename};
use clap::Parser;
use log::{error, info};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tick_common::{IngestError, Result};
use tick_pipeline::{InfluxStore, Pipeline, PipelineConfig};

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();
    info!("{:?}", args);

    let outcome = run(args);
    if let Err(e) = &outcome {
        error!("{}", e);
    }
    outcome
}

fn run(args: Args) -> Result<()> {
    let info = parse_filename(&args.file)?;
    info!("{} on {}", info.ticker, info.date);

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Flushing and shutting down...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| IngestError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let config = PipelineConfig {
        ticker: info.ticker.clone(),
        date: info.date,
        limit: args.count,
    };
    let records = open_records(&args.file, &info)?;
    let pipeline = if args.dry_run {
        Pipeline::new(config, None)
    } else {
        let store = InfluxStore::connect(&args.host, &args.db)?;
        Pipeline::with_store(config, store)?
    };

    let summary = pipeline.run(records.take_while(|_| !shutdown.load(Ordering::Relaxed)))?;
    info!(
        "Done: {} accepted, {} written in {} batches",
        summary.accepted, summary.written, summary.batches
    );
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
