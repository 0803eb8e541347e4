//! Pass 1 of segmentation: whitespace-delimited candidate chunks.
//!
//! Reads a line stream and groups contiguous non-blank lines into chunks.
//! Chunks are raw bytes; decoding happens in the scanner (pass 2).

use std::io::BufRead;

use crate::error::{Result, SiftError};

/// Streaming chunker over a line-oriented byte source.
///
/// Yields whitespace-delimited candidate chunks:
///
/// - each line is normalized (`\r` becomes `\n`, doubled breaks collapse to
///   one) before blank-line detection;
/// - a blank line closes the current chunk, and runs of blank lines close
///   nothing further;
/// - at end of input the remaining buffer is flushed unconditionally, even
///   when empty, so the consumer always sees a final chunk.
///
/// The iterator is lazy, finite, and consumes the reader exactly once.
pub struct Chunker<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line_buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> Chunker<R> {
    /// Create a chunker over the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(4 * 1024),
            line_buf: Vec::with_capacity(1024),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for Chunker<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.line_buf.clear();
            let n = match self.reader.read_until(b'\n', &mut self.line_buf) {
                Ok(n) => n,
                Err(e) => {
                    self.done = true;
                    return Some(Err(SiftError::from(e)));
                }
            };

            if n == 0 {
                // EOF: flush whatever remains, even an empty buffer.
                self.done = true;
                return Some(Ok(std::mem::take(&mut self.buf)));
            }

            let line = normalize_line(&self.line_buf);

            if line == b"\n" {
                if !self.buf.is_empty() {
                    return Some(Ok(std::mem::take(&mut self.buf)));
                }
                // Run of blank lines: nothing new to close.
            } else {
                self.buf.extend_from_slice(&line);
            }
        }
    }
}

/// Normalize a raw line: carriage returns become line breaks, and two
/// consecutive breaks collapse to one (so `"\r\n"` ends up a single `\n`).
fn normalize_line(line: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    for &b in line {
        let b = if b == b'\r' { b'\n' } else { b };
        if b == b'\n' && out.last() == Some(&b'\n') {
            continue;
        }
        out.push(b);
    }
    out
}
