//! Pass 2 of segmentation: format detection over candidate chunks.
//!
//! Consumes the chunker's output and reassembles it into complete message
//! texts. Three framing conventions are recognized in a single forward pass:
//!
//! - `From: `-prefixed chunks open a new message (mbox-like concatenations);
//! - indented `Date:` chunks, optionally preceded by a numbered
//!   `--[n]------` separator, open a new message in the Humanist digest
//!   format (the indented sub-headers are de-indented before reassembly);
//! - everything else is continuation text for the current message.
//!
//! Digest boilerplate (masthead banner, table-of-contents entries, the
//! digest's own header block) is dropped entirely before any of the above.

use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::parser::chunker::Chunker;

/// Chunks matching any of these are boilerplate and contribute nothing.
static NOISE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // The digest's own header block.
        Regex::new(r"^From:\s+Humanist Discussion Group").expect("valid regex"),
        // A table-of-contents entry: "  [12]  From:    someone".
        Regex::new(r"^\s*\[\d+\]\s+From:\s{2,}").expect("valid regex"),
        // The masthead banner line.
        Regex::new(r"^\s*Humanist Discussion Group").expect("valid regex"),
    ]
});

/// Start of a digest-format message: an indented `Date:` line, optionally
/// preceded by a numbered separator.
static DIGEST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[ \t]*--\[\d+\]-+[ \t]*\n)?[ \t]+Date:[ \t]").expect("valid regex")
});

/// What to do with one candidate chunk. Computed once, before branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Drop the chunk entirely.
    Noise,
    /// `From: ` marker: the chunk starts a new mbox-style message.
    FromBoundary,
    /// Indented digest date marker: the chunk starts a new digest message.
    DigestBoundary,
    /// No marker: the chunk continues the current message.
    Continuation,
}

fn classify(chunk: &str) -> Disposition {
    if NOISE_PATTERNS.iter().any(|re| re.is_match(chunk)) {
        Disposition::Noise
    } else if chunk.starts_with("From: ") {
        Disposition::FromBoundary
    } else if DIGEST_MARKER.is_match(chunk) {
        Disposition::DigestBoundary
    } else {
        Disposition::Continuation
    }
}

/// Streaming scanner: adapts an iterator of candidate chunks into an iterator
/// of complete message texts.
///
/// Every flush is yielded, including the possibly-empty one produced when a
/// boundary marker is the very first chunk; downstream treats empty texts as
/// a per-message build failure and drops them.
pub struct Scanner<I> {
    chunks: I,
    acc: String,
    done: bool,
}

impl<I> Scanner<I>
where
    I: Iterator<Item = Result<Vec<u8>>>,
{
    /// Wrap an iterator of raw chunks.
    pub fn new(chunks: I) -> Self {
        Self {
            chunks,
            acc: String::new(),
            done: false,
        }
    }
}

impl<I> Iterator for Scanner<I>
where
    I: Iterator<Item = Result<Vec<u8>>>,
{
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let Some(chunk) = self.chunks.next() else {
                // Input exhausted: flush the final accumulation unconditionally.
                self.done = true;
                return Some(Ok(std::mem::take(&mut self.acc)));
            };
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            let text = decode_chunk(&bytes);
            if text.is_empty() {
                // The chunker's final flush may be empty; nothing to add.
                continue;
            }

            match classify(&text) {
                Disposition::Noise => continue,
                Disposition::FromBoundary => {
                    let prev = std::mem::replace(&mut self.acc, text);
                    return Some(Ok(prev));
                }
                Disposition::DigestBoundary => {
                    let prev = std::mem::replace(&mut self.acc, deindent(&text));
                    return Some(Ok(prev));
                }
                Disposition::Continuation => {
                    // Re-insert the blank line that pass 1 consumed.
                    if !self.acc.is_empty() {
                        self.acc.push('\n');
                    }
                    self.acc.push_str(&text);
                }
            }
        }
    }
}

/// Segment a line stream into complete message texts.
///
/// Convenience composition of [`Chunker`] and [`Scanner`].
pub fn segments<R: BufRead>(reader: R) -> Scanner<Chunker<R>> {
    Scanner::new(Chunker::new(reader))
}

/// Decode a chunk permissively.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every
/// byte), so decoding never aborts the stream.
fn decode_chunk(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Rebuild a digest header chunk: keep only the indented lines, stripped of
/// their indentation. The digest format embeds sub-headers at a fixed indent
/// that must be removed before standard header parsing can succeed.
fn deindent(chunk: &str) -> String {
    let mut out = String::with_capacity(chunk.len());
    for line in chunk.lines() {
        if line.trim_start().starts_with("--[") {
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            out.push_str(line.trim_start());
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Vec<String> {
        segments(input.as_bytes())
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    /// Non-empty message texts, the way the pipeline consumes them.
    fn messages(input: &str) -> Vec<String> {
        scan(input)
            .into_iter()
            .filter(|m| !m.trim().is_empty())
            .collect()
    }

    #[test]
    fn test_from_markers_split_messages() {
        let input = "From: a@one.org\nSubject: first\n\nbody one\n\nFrom: b@two.org\nSubject: second\n\nbody two\n";
        let msgs = messages(input);
        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].starts_with("From: a@one.org\n"));
        assert!(msgs[0].contains("body one"));
        assert!(msgs[1].starts_with("From: b@two.org\n"));
        assert!(msgs[1].contains("body two"));
    }

    #[test]
    fn test_first_boundary_flushes_empty() {
        let input = "From: a@one.org\n\nbody\n";
        let all = scan(input);
        // Empty flush for the non-existent previous message, then the real one.
        assert_eq!(all.len(), 2);
        assert!(all[0].is_empty());
        assert!(all[1].starts_with("From: a@one.org\n"));
    }

    #[test]
    fn test_continuation_restores_blank_line() {
        let input = "From: a@one.org\n\npara one\n\npara two\n";
        let msgs = messages(input);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("para one\n\npara two\n"));
    }

    #[test]
    fn test_digest_marker_opens_message() {
        let input = "\
--[1]-------------------------------------------------------------------
        Date: Wed, 22 Nov 2000 07:15:50 +0000
        From: Willard McCarty <willard@kcl.ac.uk>
        Subject: the new machine

body of the digest message
";
        let msgs = messages(input);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].starts_with("Date: Wed, 22 Nov 2000 07:15:50 +0000\n"));
        assert!(msgs[0].contains("From: Willard McCarty <willard@kcl.ac.uk>\n"));
        assert!(msgs[0].contains("body of the digest message"));
        // Indentation stripped, separator dropped.
        assert!(!msgs[0].contains("        Date:"));
        assert!(!msgs[0].contains("--[1]"));
    }

    #[test]
    fn test_digest_marker_without_separator() {
        let input = "    Date: Wed, 22 Nov 2000 07:15:50 +0000\n    Subject: hi\n\nbody\n";
        let msgs = messages(input);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].starts_with("Date: "));
    }

    #[test]
    fn test_banner_chunk_dropped() {
        let input = "\
From: a@one.org

body one

Humanist Discussion Group, Vol. 14, No. 500.

From: b@two.org

body two
";
        let msgs = messages(input);
        assert_eq!(msgs.len(), 2);
        for m in &msgs {
            assert!(!m.contains("Humanist Discussion Group"));
        }
    }

    #[test]
    fn test_toc_chunk_dropped() {
        let input = "\
From: a@one.org

body one

  [1]  From:    Someone Important (40)
  [2]  From:    Someone Else (12)

tail of message one
";
        let msgs = messages(input);
        assert_eq!(msgs.len(), 1);
        assert!(!msgs[0].contains("[1]"));
        assert!(!msgs[0].contains("Someone Important"));
        assert!(msgs[0].contains("tail of message one"));
    }

    #[test]
    fn test_digest_own_header_block_dropped() {
        let input = "\
From: Humanist Discussion Group <humanist@lists.example.org>
To: subscribers
Subject: 14.0500 the new machine

From: real@person.org
Subject: actual message

body
";
        let msgs = messages(input);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].starts_with("From: real@person.org\n"));
    }

    #[test]
    fn test_unrecognized_text_is_continuation() {
        let input = "From: a@one.org\n\n-- odd separator --\n\nmore body\n";
        let msgs = messages(input);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("-- odd separator --"));
        assert!(msgs[0].contains("more body"));
    }

    #[test]
    fn test_undecodable_bytes_do_not_abort() {
        let mut input = b"From: a@one.org\n\nbody \xff\xfe tail\n".to_vec();
        input.extend_from_slice(b"\nFrom: b@two.org\n\nsecond\n");
        let msgs: Vec<String> = Scanner::new(Chunker::new(input.as_slice()))
            .collect::<Result<Vec<_>>>()
            .unwrap()
            .into_iter()
            .filter(|m| !m.trim().is_empty())
            .collect();
        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].contains("tail"));
    }
}
