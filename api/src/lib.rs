//! Thin REST client for the Vertex HTTP API.
//!
//! Wraps `reqwest` with the small amount of glue every call needs: base-URL
//! resolution, bearer-token attachment, status checking, and JSON decoding.
//! Anything endpoint-specific stays with the caller.
//!
//! # Modules
//!
//! - `client`: the [`Client`] with `get`/`post`/`patch`/`delete` wrappers
//! - `auth`: credential parsing and the login flow yielding a bearer token
//! - `error`: layered error types for request/response/auth failures

pub mod auth;
pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod test_support;

pub use client::Client;
