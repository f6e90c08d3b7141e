use thiserror::Error;

use crate::parser::error::ParseError;

/// Errors surfaced by compilation and by the query entrypoints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Structural decode failure; no module handle is produced.
    #[error("malformed binary: {0}")]
    MalformedBinary(#[from] ParseError),

    /// A query received something other than a compiled module.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A decode-limits config could not be read or parsed.
    #[error("invalid config: {0}")]
    Config(String),
}

impl Error {
    pub fn is_malformed_binary(&self) -> bool {
        matches!(self, Error::MalformedBinary(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}
