// error.rs: error types shared by the stream and config layers

use thiserror::Error;

/// Failure of a [`ByteStream`](crate::stream::ByteStream) operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("out of bounds at offset {position:#x} (need {requested} bytes, length {length})")]
    OutOfBounds {
        position: usize,
        requested: usize,
        length: usize,
    },

    #[error("malformed data at offset {position:#x}: {reason}")]
    MalformedData {
        position: usize,
        reason: &'static str,
    },
}

/// Failure opening or saving a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("could not write config file '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

pub type StreamResult<T> = std::result::Result<T, StreamError>;
