//! Destination defaults used by the loader.

/// InfluxDB `host:port` used when none is given.
pub const DEFAULT_HOST: &str = "localhost:8086";
/// Database the updates are written to when none is given.
pub const DEFAULT_DATABASE: &str = "marketdata";

/// Helper to build the base HTTP URL of a destination like "http://host:port".
pub fn base_url(host: &str) -> String {
    format!("http://{}", host.trim_end_matches('/'))
}
