//! Parsed message type and its builder.

use uuid::Uuid;

use crate::error::{Result, SiftError};
use crate::parser::header::split_headers_body;

/// Ordered header mapping.
///
/// Insertion order is preserved; a duplicate name overwrites the earlier
/// value in place. Lookup is case-insensitive, but the original name casing
/// is kept for serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Insert a header, overwriting any existing value for the same name.
    pub fn insert(&mut self, name: String, value: String) {
        if let Some(slot) = self
            .0
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            slot.1 = value;
        } else {
            self.0.push((name, value));
        }
    }

    /// Look up a header value by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One extracted message: the raw block text, its parsed headers and body,
/// and a unique identifier assigned at build time.
#[derive(Debug, Clone)]
pub struct Message {
    raw: String,
    headers: Headers,
    body: String,
    id: String,
}

impl Message {
    /// Build a message from one segmented block of text.
    ///
    /// The identifier is generated here, not earlier, so repeated builds
    /// never collide. Fails with [`SiftError::EmptyMessage`] for blank
    /// input (the empty flush a boundary-first stream produces); callers
    /// drop the block and continue.
    pub fn build(text: String) -> Result<Self> {
        Self::build_with_id(text, Uuid::new_v4().to_string())
    }

    /// Build with a caller-supplied identifier (deterministic runs, tests).
    pub fn build_with_id(text: String, id: String) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(SiftError::EmptyMessage);
        }
        let (headers, body) = split_headers_body(&text);
        Ok(Self {
            raw: text,
            headers,
            body,
            id,
        })
    }

    /// The unmodified source text of the block.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// The unique identifier, immutable after build.
    pub fn id(&self) -> &str {
        &self.id
    }
}
