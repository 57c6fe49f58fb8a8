//! Error types for the `sse` crate.
//!
//! Follows the same pattern as the other client crates: a root Error struct
//! holding an error kind and an optional source for error chaining.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for registry operations.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Kinds of errors that registry operations can return.
///
/// Passing a stale or foreign id to the registry is a caller bug; it is
/// reported as `UnknownConnection`/`UnknownHandler` instead of being silently
/// ignored or corrupting the bookkeeping.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The `ConnectionId` does not refer to a live record.
    UnknownConnection,
    /// The `HandlerId` is not registered for the given event name.
    UnknownHandler,
    /// The configured base URL and path do not form a valid stream URL.
    InvalidUrl,
    /// The bearer token could not be encoded as an Authorization header.
    InvalidCredential,
}

impl Error {
    pub(crate) fn new(error_kind: ErrorKind) -> Self {
        Self {
            source: None,
            error_kind,
        }
    }

    pub(crate) fn with_source(
        error_kind: ErrorKind,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            error_kind,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SSE Registry Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
