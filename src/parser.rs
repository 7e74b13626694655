//! Line-level parser for historical observation files.
//!
//! A day's file is plain delimited text with one observation per line.
//! No dialect handling beyond splitting: no quoting, no escapes, no
//! field-count checks. Semantic validation belongs downstream.

use crate::schema::RecordSchema;

/// One raw observation row as an ordered list of string fields.
///
/// Immutable once parsed. Fields are addressed by position through the
/// active [`RecordSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Returns the field at `position`, or `None` when the row is too short.
    pub fn field(&self, position: usize) -> Option<&str> {
        self.fields.get(position).map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Splits one raw line into a [`Record`].
///
/// An empty line still yields a one-field record holding the empty
/// string; callers tolerate it (index construction drops it).
pub fn parse_line(line: &str, delimiter: char) -> Record {
    Record {
        fields: line.split(delimiter).map(str::to_string).collect(),
    }
}

/// Parses a whole day blob into records, one per line, preserving line
/// order. A blob with no content at all contributes zero records, so a
/// missing day and an empty day are indistinguishable to the caller.
pub fn parse_blob(text: &str, schema: &RecordSchema) -> Vec<Record> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .lines()
        .map(|line| parse_line(line, schema.delimiter))
        .collect()
}
