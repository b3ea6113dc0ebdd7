//! Line Parser and Writer
//!
//! One record per line, six whitespace-separated tokens:
//!
//! ```text
//! <key> "<last_name>" "<first_name>" <birthday> "<city>" <coins>
//! ```
//!
//! `last_name`, `first_name` and `city` are wrapped in ASCII double quotes;
//! embedded quotes and embedded whitespace are not supported. `birthday` and
//! `coins` are bare unsigned digit runs. [`parse_line`] and [`format_line`]
//! are inverses for any record within those constraints.

use crate::storage::Record;
use thiserror::Error;

/// Errors that can occur while parsing a record line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line contains no tokens at all
    #[error("empty line")]
    EmptyLine,

    /// The line ended before all six tokens were read
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field that must be quoted is not properly quoted
    #[error("field {field} is not a quoted string: {token}")]
    NotQuoted { field: &'static str, token: String },

    /// A field that must be a digit run contains something else
    #[error("field {field} is not an unsigned number: {token}")]
    NotANumber { field: &'static str, token: String },

    /// Extra tokens after the final field
    #[error("trailing input: {0}")]
    TrailingInput(String),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses one record line into its key and record.
///
/// Leading and trailing whitespace are tolerated; any run of whitespace
/// separates tokens.
///
/// # Example
///
/// ```
/// use trikv::codec::parse_line;
///
/// let (key, record) = parse_line("foo \"Last\" \"First\" 2001 \"City\" 10").unwrap();
/// assert_eq!(key, "foo");
/// assert_eq!(record.city, "City");
/// ```
pub fn parse_line(line: &str) -> ParseResult<(String, Record)> {
    let mut tokens = line.split_whitespace();

    let key = tokens.next().ok_or(ParseError::EmptyLine)?.to_owned();

    let last_name = quoted_field(&mut tokens, "last_name")?;
    let first_name = quoted_field(&mut tokens, "first_name")?;
    let birthday = number_field(&mut tokens, "birthday")?;
    let city = quoted_field(&mut tokens, "city")?;
    let coins = number_field(&mut tokens, "coins")?;

    if let Some(extra) = tokens.next() {
        return Err(ParseError::TrailingInput(extra.to_owned()));
    }

    Ok((key, Record::new(last_name, first_name, birthday, city, coins)))
}

/// Formats a key and record as one line of the text format.
///
/// The output is exactly what [`parse_line`] accepts, provided the quoted
/// fields contain no double quotes or whitespace.
pub fn format_line(key: &str, record: &Record) -> String {
    format!("{key} {record}")
}

fn quoted_field<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    field: &'static str,
) -> ParseResult<String> {
    let token = tokens.next().ok_or(ParseError::MissingField(field))?;

    let inner = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(|| ParseError::NotQuoted {
            field,
            token: token.to_owned(),
        })?;

    // Embedded quotes are unsupported; the writer can never produce them.
    if inner.contains('"') {
        return Err(ParseError::NotQuoted {
            field,
            token: token.to_owned(),
        });
    }

    Ok(inner.to_owned())
}

fn number_field<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    field: &'static str,
) -> ParseResult<String> {
    let token = tokens.next().ok_or(ParseError::MissingField(field))?;

    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::NotANumber {
            field,
            token: token.to_owned(),
        });
    }

    Ok(token.to_owned())
}
