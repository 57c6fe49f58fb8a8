//! Error types for the `api` crate.
//!
//! A root Error struct holds an error kind and an optional source for error
//! chaining. Kinds are what callers branch on; the source carries the
//! underlying transport or decode error for logging.

use reqwest::StatusCode;
use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for API client operations.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in the API client.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Request(RequestErrorKind),
    Response(ResponseErrorKind),
    Auth(AuthErrorKind),
}

/// Errors raised before or while the request travels the network.
#[derive(Debug, PartialEq)]
pub enum RequestErrorKind {
    /// The reqwest client or request could not be built. Occurs prior to any
    /// network call being made.
    Builder,
    Network,
}

/// Errors raised by what the server sent back.
#[derive(Debug, PartialEq)]
pub enum ResponseErrorKind {
    /// Non-success HTTP status. The captured body travels in the source.
    Status(u16),
    /// The body could not be decoded into the expected type.
    Parse,
}

/// Errors from the credential/login flow.
#[derive(Debug, PartialEq)]
pub enum AuthErrorKind {
    /// Credentials were not in `username:password` form.
    InvalidCredentialFormat,
    LoginFailed(u16),
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
        write!(f, "API Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Request(RequestErrorKind::Builder)
        } else if err.is_decode() {
            ErrorKind::Response(ResponseErrorKind::Parse)
        } else {
            ErrorKind::Request(RequestErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Non-success status with the response body captured for logging.
#[derive(Debug)]
pub struct HttpStatusError {
    pub status: StatusCode,
    pub body: String,
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - Response: {}", self.status, self.body)
    }
}

impl StdError for HttpStatusError {}
