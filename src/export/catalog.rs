//! Catalog sink: one JSON object per message, newline-delimited.

use std::io::Write;

use serde_json::{Map, Value};

use crate::error::{Result, SiftError};

/// Append-only NDJSON writer for message metadata.
pub struct CatalogWriter<W: Write> {
    out: W,
}

impl<W: Write> CatalogWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write one metadata record as a single JSON line.
    pub fn write(&mut self, meta: &Map<String, Value>) -> Result<()> {
        serde_json::to_writer(&mut self.out, meta)
            .map_err(|e| SiftError::Export(format!("catalog record: {e}")))?;
        self.out
            .write_all(b"\n")
            .map_err(|e| SiftError::Export(format!("catalog newline: {e}")))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out
            .flush()
            .map_err(|e| SiftError::Export(format!("catalog flush: {e}")))
    }

    /// Consume the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
