//! Destination write-batch format.
//!
//! A `WriteBatch` is what one flush hands to a `BatchStore`: a database, a
//! measurement (the ticker) and one `Point` per update with six named fields.
//! `to_line_protocol` renders it in InfluxDB line protocol with nanosecond
//! timestamps.
use std::fmt::Write;

use chrono::{DateTime, Local};
use strum::IntoEnumIterator;
use tick_common::{Field, FieldValue, IngestError, MarketUpdate, Result};

/// One stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Instant of the row.
    pub timestamp: DateTime<Local>,
    /// Field values in `Field` order.
    pub fields: Vec<(Field, FieldValue)>,
}

impl From<&MarketUpdate> for Point {
    fn from(update: &MarketUpdate) -> Self {
        Point {
            timestamp: update.timestamp,
            fields: Field::iter().map(|f| (f, update.value(f))).collect(),
        }
    }
}

/// Rows written by a single store call.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBatch {
    /// Target database.
    pub database: String,
    /// Series the rows are grouped under.
    pub measurement: String,
    /// Rows, in acceptance order.
    pub points: Vec<Point>,
}

impl WriteBatch {
    /// Builds a batch from buffered updates.
    pub fn new(database: &str, measurement: &str, updates: &[MarketUpdate]) -> Self {
        WriteBatch {
            database: database.to_string(),
            measurement: measurement.to_string(),
            points: updates.iter().map(Point::from).collect(),
        }
    }

    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` when the batch holds no rows.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Renders the batch as newline separated line protocol.
    pub fn to_line_protocol(&self) -> Result<String> {
        let measurement = escape_measurement(&self.measurement);
        let mut body = String::with_capacity(self.points.len() * 96);

        for point in &self.points {
            let nanos = point.timestamp.timestamp_nanos_opt().ok_or_else(|| {
                IngestError::Format(format!("timestamp {} out of nanosecond range", point.timestamp))
            })?;

            body.push_str(&measurement);
            for (i, (field, value)) in point.fields.iter().enumerate() {
                let name: &'static str = (*field).into();
                body.push(if i == 0 { ' ' } else { ',' });
                let written = match value {
                    FieldValue::Float(v) => write!(body, "{name}={v}"),
                    FieldValue::Integer(v) => write!(body, "{name}={v}i"),
                };
                written.map_err(|e| IngestError::Format(e.to_string()))?;
            }
            writeln!(body, " {nanos}").map_err(|e| IngestError::Format(e.to_string()))?;
        }
        Ok(body)
    }
}

/// Escapes commas and spaces, the separators of a measurement name.
fn escape_measurement(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if c == ',' || c == ' ' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
