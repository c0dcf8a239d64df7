//! Command-line arguments for the tick loader.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use std::path::PathBuf;
use tick_common::net::{DEFAULT_DATABASE, DEFAULT_HOST};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Input file named `TICKER_YYYY-MM-DD.csv`.
    pub file: PathBuf,

    /// Which InfluxDB host:port to connect to.
    #[clap(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Database the updates are written to.
    #[clap(long, default_value = DEFAULT_DATABASE)]
    pub db: String,

    /// How many accepted updates to process before stopping.
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,

    /// Do not send the updates to InfluxDB; decode and gate only.
    #[clap(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_common_destination() {
        let args = Args::parse_from(["tick_loader", "CSGN_2010-12-16.csv"]);
        assert_eq!(args.host, "localhost:8086");
        assert_eq!(args.db, "marketdata");
        assert_eq!(args.count, None);
        assert!(!args.dry_run);
    }

    #[test]
    fn zero_count_is_refused() {
        assert!(Args::try_parse_from(["tick_loader", "--count", "0", "x.csv"]).is_err());
        let args = Args::try_parse_from(["tick_loader", "--count", "5", "--dry-run", "x.csv"]).unwrap();
        assert_eq!(args.count, Some(5));
        assert!(args.dry_run);
    }
}
