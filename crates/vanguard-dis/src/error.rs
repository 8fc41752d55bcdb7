//! DIS ingestion error types.

use thiserror::Error;

/// Errors raised by the binary parser, the text loader, and file I/O.
#[derive(Error, Debug)]
pub enum DisError {
    /// Binary wire-format fault, with the byte offset where it was detected.
    #[error("protocol error at byte offset {offset}: {message}")]
    Protocol { offset: usize, message: String },

    /// Text replay-format fault, with the 1-based line number.
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// File open/read failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DisError {
    pub fn protocol(offset: usize, message: impl Into<String>) -> Self {
        DisError::Protocol {
            offset,
            message: message.into(),
        }
    }

    pub fn format(line: usize, message: impl Into<String>) -> Self {
        DisError::Format {
            line,
            message: message.into(),
        }
    }
}

/// Result type for DIS ingestion operations.
pub type Result<T> = std::result::Result<T, DisError>;
