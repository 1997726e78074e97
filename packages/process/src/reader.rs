//! Lazy JSON-lines reader.
//!
//! Yields one JSON object per non-blank line. Lines that are not valid JSON
//! objects are dropped so one bad line never aborts a run.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::ProcessError;

/// Forward-only iterator over the JSON objects in a line-delimited source.
///
/// Only the current line is held in memory. Blank lines and lines that do
/// not decode to a JSON object (invalid UTF-8 included) are skipped; an I/O
/// failure of the underlying reader is yielded as `Err`.
pub struct JsonLines<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: u64,
    bytes_read: u64,
}

impl<R: BufRead> JsonLines<R> {
    /// Wraps a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
            bytes_read: 0,
        }
    }

    /// Number of lines consumed so far, including skipped ones.
    #[must_use]
    pub const fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Number of input bytes consumed so far, line terminators included.
    #[must_use]
    pub const fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: BufRead> Iterator for JsonLines<R> {
    type Item = io::Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            let read = match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };
            self.line_number += 1;
            self.bytes_read += read as u64;

            let line = self.buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_slice::<Value>(line) {
                Ok(value) if value.is_object() => return Some(Ok(value)),
                Ok(_) => log::trace!("skipping line {}: not a JSON object", self.line_number),
                Err(e) => log::trace!("skipping malformed line {}: {e}", self.line_number),
            }
        }
    }
}

/// Opens `path` as a [`JsonLines`] iterator.
///
/// # Errors
///
/// Returns [`ProcessError::Io`] if the file cannot be opened.
pub fn open(path: &Path) -> Result<JsonLines<BufReader<File>>, ProcessError> {
    let file = File::open(path).map_err(|e| ProcessError::io(path, e))?;
    Ok(JsonLines::new(BufReader::new(file)))
}
