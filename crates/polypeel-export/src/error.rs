//! Errors raised while reading the text formats.

use polypeel_pipeline::PipelineError;

/// Errors that can occur while parsing raster or geometry text.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The input ended while a value was still expected.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What was being read.
        expected: &'static str,
    },

    /// A token that is not a valid integer.
    #[error("invalid integer {token:?}")]
    InvalidInteger {
        /// The offending token.
        token: String,
    },

    /// A count (dimension, layer, polygon or vertex count) below zero.
    #[error("{what} must not be negative, got {value}")]
    NegativeCount {
        /// Which count.
        what: &'static str,
        /// The value found.
        value: i64,
    },

    /// Tokens left over after a complete document.
    #[error("trailing data starting at {token:?}")]
    TrailingData {
        /// The first unread token.
        token: String,
    },

    /// The raster values do not form a valid grid.
    #[error("invalid raster: {0}")]
    Grid(#[from] PipelineError),
}

/// Whitespace-separated integer reader shared by the text formats.
///
/// Line breaks carry no meaning; only token order does.
pub(crate) struct Tokens<'a> {
    inner: std::str::SplitAsciiWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_ascii_whitespace(),
        }
    }

    fn next_token(&mut self, expected: &'static str) -> Result<&'a str, ParseError> {
        self.inner
            .next()
            .ok_or(ParseError::UnexpectedEof { expected })
    }

    /// Next token as an `i64`.
    pub(crate) fn int(&mut self, expected: &'static str) -> Result<i64, ParseError> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| ParseError::InvalidInteger {
            token: token.to_owned(),
        })
    }

    /// Next token as an `i32` coordinate.
    pub(crate) fn coord(&mut self, expected: &'static str) -> Result<i32, ParseError> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| ParseError::InvalidInteger {
            token: token.to_owned(),
        })
    }

    /// Next token as a non-negative count.
    pub(crate) fn count(&mut self, what: &'static str) -> Result<usize, ParseError> {
        let value = self.int(what)?;
        usize::try_from(value).map_err(|_| ParseError::NegativeCount { what, value })
    }

    /// Fail if any token is left.
    pub(crate) fn finish(mut self) -> Result<(), ParseError> {
        self.inner.next().map_or(Ok(()), |token| {
            Err(ParseError::TrailingData {
                token: token.to_owned(),
            })
        })
    }
}
