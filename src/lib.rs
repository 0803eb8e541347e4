//! `listsift` — extract individual messages from mailing-list archive dumps.
//!
//! This crate provides the core library for segmenting heterogeneous archival
//! text (mbox-like concatenations and "Humanist Discussion Group" digests)
//! into discrete messages, and for deriving normalized per-message metadata.

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod pipeline;
