//! Raw records handed to the pipeline by a record source.

/// One delimited input record together with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number, used only for error reporting.
    pub line: usize,
    /// Fields of the record, already split on the delimiter.
    pub fields: Vec<String>,
}

impl Record {
    /// Splits a text line on `delimiter`. Quoting is not supported.
    pub fn from_line(line: usize, text: &str, delimiter: char) -> Self {
        Record {
            line,
            fields: text.split(delimiter).map(str::to_string).collect(),
        }
    }
}
