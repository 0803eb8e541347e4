//! Body sink: one tab-separated `identifier<TAB>body` record per line.

use std::io::Write;

use crate::error::{Result, SiftError};

/// Append-only TSV writer for message bodies.
///
/// Embedded newlines are escaped to the literal two-character `\n` and tabs
/// become spaces, preserving the one-line-per-record invariant.
pub struct BodyWriter<W: Write> {
    out: W,
}

impl<W: Write> BodyWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write one `id<TAB>body` record.
    pub fn write(&mut self, id: &str, body: &str) -> Result<()> {
        let flat = body.replace('\n', "\\n").replace('\t', " ");
        writeln!(self.out, "{id}\t{flat}")
            .map_err(|e| SiftError::Export(format!("body record: {e}")))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out
            .flush()
            .map_err(|e| SiftError::Export(format!("body flush: {e}")))
    }

    /// Consume the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
