//! Error types for document parsing and reading.

use std::error::Error;
use std::fmt;

/// Errors the streaming parser reports for a document.
///
/// Carried through the header cell and the parser thread's result, so
/// both the header waiter and the buffer consumer observe the same
/// failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The root element's format version is missing or unsupported.
    Version {
        /// The version string as it appeared; empty when the attribute
        /// was missing entirely.
        version: String,
    },
    /// The document's markup is malformed.
    Markup {
        /// 1-based line of the offending input.
        line: u64,
        /// 0-based column of the offending input.
        column: u64,
        /// What was wrong at that position.
        detail: String,
    },
}

impl ParseError {
    /// Builds a [`ParseError::Markup`] for the given position.
    pub fn markup(line: u64, column: u64, detail: impl Into<String>) -> Self {
        Self::Markup {
            line,
            column,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version { version } if version.is_empty() => {
                write!(f, "the root element has no format version")
            }
            Self::Version { version } => {
                write!(f, "unsupported format version '{version}'")
            }
            Self::Markup {
                line,
                column,
                detail,
            } => {
                write!(f, "malformed document at line {line}, column {column}: {detail}")
            }
        }
    }
}

impl Error for ParseError {}

/// Errors surfaced by [`Reader::read`](crate::reader::Reader::read).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadError {
    /// The parser rejected the document.
    Parse(ParseError),
    /// The parser thread died without reporting a result.
    ParserPanicked,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(error) => write!(f, "parse failed: {error}"),
            Self::ParserPanicked => write!(f, "parser thread panicked"),
        }
    }
}

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(error) => Some(error),
            Self::ParserPanicked => None,
        }
    }
}

impl From<ParseError> for ReadError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}
