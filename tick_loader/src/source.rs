//! Input side of the loader: file naming and line records.
//!
//! Input files are named `TICKER_YYYY-MM-DD.csv[.gz]`; the ticker becomes the
//! measurement and the date completes the time-of-day of every record.
//! Records are comma separated, one per line.
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tick_common::{IngestError, Record, Result};

/// Field delimiter of input records.
pub const DELIMITER: char = ',';

/// What the file name says about its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Ticker symbol, everything before the last `_`.
    pub ticker: String,
    /// Trading date.
    pub date: NaiveDate,
    /// File is gzip compressed.
    pub gz: bool,
}

/// Parse `TICKER_YYYY-MM-DD.csv[.gz]`. Leading directories are ignored.
pub fn parse_filename(path: &Path) -> Result<FileInfo> {
    let invalid = || IngestError::Filename(path.display().to_string());

    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
    let (name, gz) = match name.strip_suffix(".gz") {
        Some(rest) => (rest, true),
        None => (name, false),
    };
    let stem = name.strip_suffix(".csv").ok_or_else(invalid)?;
    let (ticker, date) = stem.rsplit_once('_').ok_or_else(invalid)?;
    if ticker.is_empty() {
        return Err(invalid());
    }

    Ok(FileInfo {
        ticker: ticker.to_string(),
        date: parse_date(date).ok_or_else(invalid)?,
        gz,
    })
}

/// Strict `YYYY-MM-DD`: fixed widths, digits only, valid calendar day.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if !text.is_ascii() || bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let number = |range: std::ops::Range<usize>| -> Option<u32> {
        let part = &text[range];
        part.bytes().all(|b| b.is_ascii_digit()).then(|| part.parse().ok())?
    };
    let year = i32::try_from(number(0..4)?).ok()?;
    NaiveDate::from_ymd_opt(year, number(5..7)?, number(8..10)?)
}

/// Iterator of records over a buffered reader. Blank lines are skipped.
pub struct LineRecords<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> LineRecords<R> {
    /// Wrap `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for LineRecords<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(IngestError::Io(e))),
            };
            self.line += 1;
            let text = text.trim_end_matches('\r');
            if text.trim().is_empty() {
                continue;
            }
            return Some(Ok(Record::from_line(self.line, text, DELIMITER)));
        }
    }
}

/// Open the plain-text input at `path`.
pub fn open_records(path: &Path, info: &FileInfo) -> Result<LineRecords<BufReader<File>>> {
    if info.gz {
        return Err(IngestError::Format(format!(
            "{}: gzip input is not supported, decompress it first",
            path.display()
        )));
    }
    let file = File::open(path)?;
    Ok(LineRecords::new(BufReader::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn info(ticker: &str, y: i32, m: u32, d: u32, gz: bool) -> FileInfo {
        FileInfo {
            ticker: ticker.to_string(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            gz,
        }
    }

    #[test]
    fn parses_valid_names() {
        let cases = [
            ("CSGN_2010-12-16.csv", info("CSGN", 2010, 12, 16, false)),
            ("CSGN_2010-12-16.csv.gz", info("CSGN", 2010, 12, 16, true)),
            ("CSGNji_2000-12-01.csv.gz", info("CSGNji", 2000, 12, 1, true)),
            ("/data/ticks/UBSN_2011-01-03.csv", info("UBSN", 2011, 1, 3, false)),
            ("BRK_B_2012-02-29.csv", info("BRK_B", 2012, 2, 29, false)),
        ];
        for (name, expected) in cases {
            assert_eq!(parse_filename(Path::new(name)).unwrap(), expected, "{name}");
        }
    }

    #[test]
    fn rejects_invalid_names() {
        for name in [
            "CSGN*2010-12-16.csv",
            "CSGN-2010*12-16.csv",
            "CSGN-2010-12*16.csv",
            "CSGN_2010-12-16csv",
            "CSGN_2010-12-16.csv.sz",
            "CSGN_2010-12-16.csv.",
            "_2010-12-16.csv",
            "CSGN_2010-2-16.csv",
            "CSGN_2010-02-30.csv",
            "CSGN_+010-12-16.csv",
        ] {
            assert!(
                matches!(parse_filename(Path::new(name)), Err(IngestError::Filename(_))),
                "expected failure for {name}"
            );
        }
    }

    #[test]
    fn numbers_lines_and_skips_blanks() {
        let input = "09:04:16.717000,38.19,2781,38.25,3308,38.21,638,Trading\r\n\n  \n09:04:17.000000,a,b\n";
        let records: Vec<Record> = LineRecords::new(Cursor::new(input))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 1);
        assert_eq!(records[0].fields.len(), 8);
        assert_eq!(records[0].fields[7], "Trading");
        assert_eq!(records[1].line, 4);
        assert_eq!(records[1].fields, ["09:04:17.000000", "a", "b"]);
    }

    #[test]
    fn invalid_utf8_is_a_source_error() {
        let input: &[u8] = b"09:04:16.717000,\xff\n";
        let mut records = LineRecords::new(Cursor::new(input));
        assert!(matches!(records.next(), Some(Err(IngestError::Io(_)))));
    }

    #[test]
    fn opens_plain_files_and_refuses_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CSGN_2010-12-16.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "09:04:16.717000,38.19,2781,38.25,3308,38.21,638,Trading").unwrap();
        drop(file);

        let info = parse_filename(&path).unwrap();
        let records: Vec<Record> = open_records(&path, &info)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 1);

        let gz = dir.path().join("CSGN_2010-12-16.csv.gz");
        let gz_info = parse_filename(&gz).unwrap();
        assert!(matches!(open_records(&gz, &gz_info), Err(IngestError::Format(_))));
    }
}
