// error.rs: S6 import/export errors

use rct2_common::StreamError;
use thiserror::Error;

use crate::object_index::ObjectKind;

#[derive(Debug, Error)]
pub enum S6Error {
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// The stream ended or was malformed inside a sprite record.
    #[error("corrupt sprite record {index}: {source}")]
    CorruptRecord { index: usize, source: StreamError },

    /// An object index (on load) or handle (on save) has no mapping.
    #[error("unresolved {kind} reference {value}")]
    UnresolvedObjectReference { kind: ObjectKind, value: u32 },

    /// An unresolved reference that aborted a whole import.
    #[error("sprite record {index}: {source}")]
    UnresolvedRecord { index: usize, source: Box<S6Error> },

    /// A union variant that disagrees with the byte selecting it.
    #[error("{field} does not match discriminant {discriminant}")]
    MismatchedUnion {
        field: &'static str,
        discriminant: u8,
    },

    /// A record that could not be encoded for any other reason.
    #[error("invalid sprite record {index}: {source}")]
    InvalidRecord { index: usize, source: Box<S6Error> },

    #[error("checksum mismatch (stored {expected:#010x}, computed {actual:#010x})")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("too many sprites ({count}, limit {limit})")]
    TooManySprites { count: usize, limit: usize },
}

pub type S6Result<T> = std::result::Result<T, S6Error>;
