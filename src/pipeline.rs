//! Pipeline composition: line stream → segmenter → builder → normalizer →
//! output sinks.
//!
//! Per-message failures are contained at the message boundary: a block that
//! cannot be built is counted and dropped, and processing continues. Only
//! stream-level I/O errors abort a run.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Result, SiftError};
use crate::export::bodies::BodyWriter;
use crate::export::catalog::CatalogWriter;
use crate::model::message::Message;
use crate::normalize::{normalize, DEFAULT_YEAR_BOUNDS};
use crate::parser::scanner::segments;

/// Size of the internal read buffer (128 KB for sequential archive scans).
pub const READ_BUFFER_SIZE: usize = 128 * 1024;

/// Report progress every 4 MB of input.
const PROGRESS_INTERVAL: u64 = 4 * 1024 * 1024;

/// Behavioral knobs for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Inclusive year bounds applied to parsed `Date` headers.
    pub year_bounds: (i32, i32),
    /// Extra key/value pairs merged into every metadata record
    /// (later entries override same-named headers).
    pub extras: Vec<(String, String)>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            year_bounds: DEFAULT_YEAR_BOUNDS,
            extras: Vec::new(),
        }
    }
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct ExtractStats {
    /// Messages written to both sinks.
    pub messages: u64,
    /// Blocks dropped by failure containment (empty flushes included).
    pub skipped: u64,
}

/// Run the full pipeline over an open line stream.
///
/// Each instance owns its segmentation state; concurrent runs over
/// different archives share nothing.
pub fn extract_stream<R, CW, BW>(
    reader: R,
    options: &ExtractOptions,
    catalog: &mut CatalogWriter<CW>,
    bodies: &mut BodyWriter<BW>,
) -> Result<ExtractStats>
where
    R: BufRead,
    CW: Write,
    BW: Write,
{
    let mut stats = ExtractStats::default();

    for text in segments(reader) {
        let text = text?;
        let message = match Message::build(text) {
            Ok(m) => m,
            Err(SiftError::EmptyMessage) => {
                stats.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(error = %e, "Skipping unbuildable message block");
                stats.skipped += 1;
                continue;
            }
        };

        let meta = normalize(&message, &options.extras, options.year_bounds);
        catalog.write(&meta)?;
        bodies.write(message.id(), message.body())?;
        stats.messages += 1;
    }

    debug!(
        messages = stats.messages,
        skipped = stats.skipped,
        "Stream exhausted"
    );
    Ok(stats)
}

/// Run the pipeline over one archive file.
///
/// The optional callback receives `(bytes_read, file_size)` roughly every
/// 4 MB, and once more at completion.
pub fn extract_file<CW, BW>(
    path: &Path,
    options: &ExtractOptions,
    catalog: &mut CatalogWriter<CW>,
    bodies: &mut BodyWriter<BW>,
    progress: Option<&dyn Fn(u64, u64)>,
) -> Result<ExtractStats>
where
    CW: Write,
    BW: Write,
{
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SiftError::FileNotFound(path.to_path_buf())
        } else {
            SiftError::io(path, e)
        }
    })?;
    let file_size = metadata.len();

    let file = File::open(path).map_err(|e| SiftError::io(path, e))?;
    let counting = ProgressReader {
        inner: file,
        total: file_size,
        bytes_read: 0,
        last_report: 0,
        progress,
    };
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, counting);

    let stats = extract_stream(reader, options, catalog, bodies)?;

    catalog.flush()?;
    bodies.flush()?;
    if let Some(cb) = progress {
        cb(file_size, file_size);
    }

    info!(
        path = %path.display(),
        messages = stats.messages,
        skipped = stats.skipped,
        "Extraction complete"
    );
    Ok(stats)
}

/// Byte-counting reader that reports progress at a fixed interval.
struct ProgressReader<'a, R: Read> {
    inner: R,
    total: u64,
    bytes_read: u64,
    last_report: u64,
    progress: Option<&'a dyn Fn(u64, u64)>,
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes_read += n as u64;
        if let Some(cb) = self.progress {
            if self.bytes_read - self.last_report >= PROGRESS_INTERVAL {
                cb(self.bytes_read, self.total);
                self.last_report = self.bytes_read;
            }
        }
        Ok(n)
    }
}
