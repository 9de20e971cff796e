use std::{
    fmt::Display,
    io::{self, Write},
};

use prepare_fs::{FileRecord, path::to_unix_string};
use serde_json::Value;

/// NDJSON printer: one object per prepared record on `out`, diagnostics on
/// `err`.
pub struct RecordPrinter<W: Write, E: Write> {
    out: W,
    err: E,
}

impl RecordPrinter<io::Stdout, io::Stderr> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<W: Write, E: Write> RecordPrinter<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self { out, err }
    }

    /// The serialized record plus its path relative to the output base.
    pub fn print_record(&mut self, record: &FileRecord) -> io::Result<()> {
        let mut obj = serde_json::to_value(record)?;
        if let Value::Object(map) = &mut obj {
            map.insert(
                "relative".to_owned(),
                Value::String(to_unix_string(&record.relative())),
            );
            if let Some(contents) = &record.contents {
                map.insert("contentLength".to_owned(), Value::from(contents.len()));
            }
        }
        serde_json::to_writer(&mut self.out, &obj)?;
        writeln!(self.out)
    }

    pub fn print_error(&mut self, e: impl Display) -> io::Result<()> {
        writeln!(self.err, "[prepare] {e}")
    }

    pub fn finish(&mut self, printed: usize, skipped: usize, failed: usize) -> io::Result<()> {
        self.out.flush()?;
        writeln!(
            self.err,
            "[prepare] {printed} prepared, {skipped} unchanged, {failed} failed"
        )
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
