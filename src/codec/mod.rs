//! Text Codec Module
//!
//! This module implements the line-oriented text format used by the store's
//! `upload` and `export` operations. Each line carries one key and one
//! five-field record; see [`line`] for the exact grammar.

pub mod line;

// Re-export the codec surface
pub use line::{format_line, parse_line, ParseError, ParseResult};
