//! Record decoding.
//!
//! Turns one raw record such as
//! `09:04:16.717000,38.19,2781,38.25,3308,38.21,638,Trading` plus the trading
//! date (taken from the input file name) into a `MarketUpdate`.
//!
//! Layout of a record:
//! - field 0 — time of day, `HH:MM:SS.XXXXXX`
//! - fields 1..=6 — bid, bidsize, ask, asksize, last, lastsize
//! - field 7 — trading status, accepted but not interpreted
//!
//! Decoding is pure and never yields a partially filled update.
use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use tick_common::error::STAMP_FORMAT;
use tick_common::{DecodeError, Field, MarketUpdate, PriceSize, StampPart};

/// Number of fields every record must carry.
pub const RECORD_ARITY: usize = 8;

/// Decodes `fields` into an update stamped on `date` in the local time zone.
pub fn decode<S: AsRef<str>>(fields: &[S], date: NaiveDate) -> Result<MarketUpdate, DecodeError> {
    if fields.len() != RECORD_ARITY {
        return Err(DecodeError::WrongArity(fields.len()));
    }

    let time = parse_time_of_day(fields[0].as_ref())?;
    let timestamp = to_local(date.and_time(time))?;

    Ok(MarketUpdate {
        timestamp,
        bid: price_size(fields, Field::Bid, Field::BidSize)?,
        ask: price_size(fields, Field::Ask, Field::AskSize)?,
        last: price_size(fields, Field::Last, Field::LastSize)?,
    })
}

/// Parses the leading `HH:MM:SS.XXXXXX` of `stamp`. Trailing bytes are ignored.
pub fn parse_time_of_day(stamp: &str) -> Result<NaiveTime, DecodeError> {
    let bytes = stamp.as_bytes();
    if bytes.len() < STAMP_FORMAT.len() {
        return Err(DecodeError::TimestampTooShort);
    }

    let hour = digits(&bytes[0..2], StampPart::Hour)?;
    separator(bytes, 2, ':')?;
    let minute = digits(&bytes[3..5], StampPart::Minute)?;
    separator(bytes, 5, ':')?;
    let second = digits(&bytes[6..8], StampPart::Second)?;
    separator(bytes, 8, '.')?;
    let micro = digits(&bytes[9..15], StampPart::Microsecond)?;

    NaiveTime::from_hms_nano_opt(hour, minute, second, micro * 1_000)
        .ok_or_else(|| DecodeError::TimeOutOfRange(String::from_utf8_lossy(&bytes[..15]).into_owned()))
}

fn digits(segment: &[u8], part: StampPart) -> Result<u32, DecodeError> {
    segment.iter().try_fold(0u32, |acc, b| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + u32::from(b - b'0'))
        } else {
            Err(DecodeError::Timestamp(part))
        }
    })
}

fn separator(bytes: &[u8], offset: usize, expected: char) -> Result<(), DecodeError> {
    if bytes[offset] == expected as u8 {
        Ok(())
    } else {
        Err(DecodeError::TimestampSeparator { expected, offset })
    }
}

fn to_local(naive: NaiveDateTime) -> Result<DateTime<Local>, DecodeError> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(ts) => Ok(ts),
        // Fall-back transition: the wall clock repeats, keep the first pass.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(DecodeError::NonexistentLocalTime(naive.to_string())),
    }
}

fn price_size<S: AsRef<str>>(
    fields: &[S],
    price: Field,
    size: Field,
) -> Result<PriceSize, DecodeError> {
    let price_value = fields[price.index()]
        .as_ref()
        .parse::<f64>()
        .map_err(|_| DecodeError::Field(price))?;
    let size_value = fields[size.index()]
        .as_ref()
        .parse::<i64>()
        .map_err(|_| DecodeError::Field(size))?;
    Ok(PriceSize::new(price_value, size_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::WriteBatch;
    use chrono::{Datelike, Timelike};
    use rand::Rng;
    use tick_common::FieldValue;

    const SAMPLE: [&str; 8] = [
        "09:04:16.717000",
        "38.19",
        "2781",
        "38.25",
        "3308",
        "38.21",
        "638",
        "Trading",
    ];

    fn trading_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2010, 12, 16).unwrap()
    }

    fn with(index: usize, value: &str) -> Vec<String> {
        let mut fields: Vec<String> = SAMPLE.iter().map(|s| s.to_string()).collect();
        fields[index] = value.to_string();
        fields
    }

    #[test]
    fn decodes_sample_record() {
        let update = decode(&SAMPLE, trading_day()).unwrap();

        let expected = NaiveDate::from_ymd_opt(2010, 12, 16)
            .unwrap()
            .and_hms_milli_opt(9, 4, 16, 717)
            .unwrap();
        assert_eq!(update.timestamp.naive_local(), expected);
        assert_eq!(update.timestamp.year(), 2010);
        assert_eq!(update.timestamp.nanosecond(), 717_000_000);
        assert_eq!(update.bid, PriceSize::new(38.19, 2781));
        assert_eq!(update.ask, PriceSize::new(38.25, 3308));
        assert_eq!(update.last, PriceSize::new(38.21, 638));
    }

    #[test]
    fn numeric_fields_round_trip() {
        let update = decode(&SAMPLE, trading_day()).unwrap();
        let encoded: Vec<String> = [
            Field::Bid,
            Field::BidSize,
            Field::Ask,
            Field::AskSize,
            Field::Last,
            Field::LastSize,
        ]
        .into_iter()
        .map(|field| match update.value(field) {
            FieldValue::Float(v) => v.to_string(),
            FieldValue::Integer(v) => v.to_string(),
        })
        .collect();
        assert_eq!(encoded, &SAMPLE[1..7]);
    }

    #[test]
    fn random_records_round_trip() {
        let mut rng = rand::rng();
        let day = trading_day();
        for i in 0..500 {
            let prices: [f64; 3] = std::array::from_fn(|_| rng.random_range(-1e6..1e6));
            let sizes: [i64; 3] = match i {
                0 => [i64::MIN, i64::MAX, 0],
                1 => [-1, i64::MAX, i64::MIN],
                _ => std::array::from_fn(|_| rng.random::<i64>()),
            };
            let stamp = format!(
                "{:02}:{:02}:{:02}.{:06}",
                rng.random_range(0..24),
                rng.random_range(0..60),
                rng.random_range(0..60),
                rng.random_range(0..1_000_000)
            );
            let fields = [
                stamp.clone(),
                prices[0].to_string(),
                sizes[0].to_string(),
                prices[1].to_string(),
                sizes[1].to_string(),
                prices[2].to_string(),
                sizes[2].to_string(),
                "Trading".to_string(),
            ];
            let update = match decode(&fields, day) {
                Ok(update) => update,
                // Wall-clock times skipped by a DST change cannot be stamped.
                Err(DecodeError::NonexistentLocalTime(_)) => continue,
                Err(e) => panic!("{fields:?}: {e}"),
            };

            let expected = [
                (Field::Bid, FieldValue::Float(prices[0])),
                (Field::BidSize, FieldValue::Integer(sizes[0])),
                (Field::Ask, FieldValue::Float(prices[1])),
                (Field::AskSize, FieldValue::Integer(sizes[1])),
                (Field::Last, FieldValue::Float(prices[2])),
                (Field::LastSize, FieldValue::Integer(sizes[2])),
            ];
            for (field, value) in expected {
                assert_eq!(update.value(field), value, "{field} of {fields:?}");
            }
            assert_eq!(update.timestamp.time(), parse_time_of_day(&stamp).unwrap());

            let body = WriteBatch::new("marketdata", "CSGN", &[update])
                .to_line_protocol()
                .unwrap();
            let rendered = format!(
                "CSGN bid={},bidsize={}i,ask={},asksize={}i,last={},lastsize={}i ",
                prices[0], sizes[0], prices[1], sizes[1], prices[2], sizes[2]
            );
            assert!(body.starts_with(&rendered), "{body}");
        }
    }

    #[test]
    fn wrong_arity_wins_over_field_errors() {
        assert_eq!(decode(&SAMPLE[..7], trading_day()), Err(DecodeError::WrongArity(7)));
        let mut nine = SAMPLE.to_vec();
        nine.push("extra");
        assert_eq!(decode(&nine, trading_day()), Err(DecodeError::WrongArity(9)));
        let garbage = ["x"; 3];
        assert_eq!(decode(&garbage, trading_day()), Err(DecodeError::WrongArity(3)));
        let empty: [&str; 0] = [];
        assert_eq!(decode(&empty, trading_day()), Err(DecodeError::WrongArity(0)));
    }

    #[test]
    fn short_timestamp_is_rejected() {
        for stamp in ["", "09:04:16", "09:04:16.71700"] {
            assert_eq!(
                decode(&with(0, stamp), trading_day()),
                Err(DecodeError::TimestampTooShort),
                "stamp {stamp:?}"
            );
        }
    }

    #[test]
    fn non_digit_names_the_component() {
        let cases = [
            ("0x:04:16.717000", StampPart::Hour),
            ("09:4 :16.717000", StampPart::Minute),
            ("09:04:-6.717000", StampPart::Second),
            ("09:04:16.71700a", StampPart::Microsecond),
            ("+9:04:16.717000", StampPart::Hour),
        ];
        for (stamp, part) in cases {
            assert_eq!(
                decode(&with(0, stamp), trading_day()),
                Err(DecodeError::Timestamp(part)),
                "stamp {stamp:?}"
            );
        }
    }

    #[test]
    fn multibyte_stamp_does_not_panic() {
        assert_eq!(
            decode(&with(0, "09:04:16.71700é"), trading_day()),
            Err(DecodeError::Timestamp(StampPart::Microsecond))
        );
    }

    #[test]
    fn wrong_separator_is_rejected() {
        assert_eq!(
            parse_time_of_day("09-04:16.717000"),
            Err(DecodeError::TimestampSeparator { expected: ':', offset: 2 })
        );
        assert_eq!(
            parse_time_of_day("09:04:16,717000"),
            Err(DecodeError::TimestampSeparator { expected: '.', offset: 8 })
        );
    }

    #[test]
    fn out_of_range_time_is_rejected() {
        assert!(matches!(
            parse_time_of_day("25:00:00.000000"),
            Err(DecodeError::TimeOutOfRange(_))
        ));
    }

    #[test]
    fn trailing_bytes_after_stamp_are_ignored() {
        let time = parse_time_of_day("19:30:41.977000Z").unwrap();
        assert_eq!(time, NaiveTime::from_hms_micro_opt(19, 30, 41, 977_000).unwrap());
    }

    #[test]
    fn each_numeric_field_reports_itself() {
        let cases = [
            (1, "n/a", Field::Bid),
            (2, "27.5", Field::BidSize),
            (3, "", Field::Ask),
            (4, "1e3", Field::AskSize),
            (5, "x", Field::Last),
            (6, "six", Field::LastSize),
        ];
        for (index, value, field) in cases {
            assert_eq!(
                decode(&with(index, value), trading_day()),
                Err(DecodeError::Field(field))
            );
        }
    }

    #[test]
    fn negative_sizes_pass_through() {
        let update = decode(&with(2, "-5"), trading_day()).unwrap();
        assert_eq!(update.bid.size, -5);
    }

    #[test]
    fn status_field_is_not_interpreted() {
        assert!(decode(&with(7, ""), trading_day()).is_ok());
        assert!(decode(&with(7, "Halted"), trading_day()).is_ok());
    }
}
