//! Market update model shared by the decoder, the gate and the writer.
//!
//! A `MarketUpdate` is created once per valid input record and never mutated
//! afterwards; stages hand it over by value. `Field` names the six numeric
//! columns a stored row carries and maps them back to their input position.
use chrono::{DateTime, Local};
use serde::Serialize;
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Price and size pair for one side of the book (or the last trade).
///
/// Sizes are signed and not validated, negative values pass through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSize {
    /// Quoted or traded price.
    pub price: f64,
    /// Quoted or traded size.
    pub size: i64,
}

impl PriceSize {
    /// Creates a new pair.
    pub fn new(price: f64, size: i64) -> Self {
        PriceSize { price, size }
    }
}

/// One decoded quote: best bid, best ask and last trade at a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketUpdate {
    /// Local-time instant with microsecond precision.
    pub timestamp: DateTime<Local>,
    /// Best bid.
    pub bid: PriceSize,
    /// Best ask.
    pub ask: PriceSize,
    /// Last trade.
    pub last: PriceSize,
}

impl MarketUpdate {
    /// Returns the value stored for `field`.
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::Bid => FieldValue::Float(self.bid.price),
            Field::BidSize => FieldValue::Integer(self.bid.size),
            Field::Ask => FieldValue::Float(self.ask.price),
            Field::AskSize => FieldValue::Integer(self.ask.size),
            Field::Last => FieldValue::Float(self.last.price),
            Field::LastSize => FieldValue::Integer(self.last.size),
        }
    }
}

/// Named numeric fields of a stored row, in input column order.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Field {
    Bid,
    BidSize,
    Ask,
    AskSize,
    Last,
    LastSize,
}

impl Field {
    /// Zero-based index of the field in an input record.
    pub fn index(self) -> usize {
        match self {
            Field::Bid => 1,
            Field::BidSize => 2,
            Field::Ask => 3,
            Field::AskSize => 4,
            Field::Last => 5,
            Field::LastSize => 6,
        }
    }

    /// 1-based column of the field, as shown to users.
    pub fn column(self) -> usize {
        self.index() + 1
    }
}

/// Typed value of a row field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// Prices.
    Float(f64),
    /// Sizes.
    Integer(i64),
}

/// Components of the `HH:MM:SS.XXXXXX` time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StampPart {
    /// Hour.
    #[strum(serialize = "HH")]
    Hour,
    /// Minute.
    #[strum(serialize = "MM")]
    Minute,
    /// Second.
    #[strum(serialize = "SS")]
    Second,
    /// Microsecond.
    #[strum(serialize = "XXXXXX")]
    Microsecond,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn field_names_and_columns() {
        let names: Vec<String> = Field::iter().map(|f| f.to_string()).collect();
        assert_eq!(names, ["bid", "bidsize", "ask", "asksize", "last", "lastsize"]);
        let columns: Vec<usize> = Field::iter().map(Field::column).collect();
        assert_eq!(columns, [2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn stamp_parts_display_their_pattern() {
        assert_eq!(StampPart::Hour.to_string(), "HH");
        assert_eq!(StampPart::Microsecond.to_string(), "XXXXXX");
    }
}
