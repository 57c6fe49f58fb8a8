//! Shared Server-Sent Events (SSE) subscriptions for Vertex clients.
//!
//! Multiple parts of a client are frequently interested in the same backend
//! event stream (instance status, installer progress, and so on). Opening one
//! network connection per interested component wastes sockets on both ends,
//! so this crate provides a reference-counted connection registry that
//! deduplicates streams by resource path.
//!
//! # Architecture
//!
//! - **One connection per path**: the first `subscribe` to a path opens the
//!   underlying `eventsource-client` stream; later subscribers to the same
//!   path share it and only bump a watcher count.
//! - **Atomic teardown**: watcher bookkeeping and the check-and-close on the
//!   last unsubscribe run under a single registry lock, so there is never a
//!   moment where a record has zero watchers but a live, discoverable
//!   connection.
//! - **Named-event handlers**: callers attach callbacks per event name
//!   through [`Registry::add_event_handler`]; dispatch happens on the stream
//!   reader task. Transport errors are delivered as [`event::ERROR_EVENT`]
//!   events rather than surfacing from `subscribe`.
//! - **Injected credentials**: a [`CredentialSource`] supplies the bearer
//!   token attached when a new connection is opened, keeping the registry
//!   independent of how the session is obtained.
//!
//! Reconnection with backoff is delegated entirely to `eventsource-client`;
//! the registry itself never retries.
//!
//! # Modules
//!
//! - `registry`: the [`Registry`] with its mutex-guarded record map
//! - `handlers`: per-connection handler tables and [`handlers::HandlerId`]
//! - `event`: the [`event::StreamEvent`] delivered to handlers
//! - `error`: registry error types

pub mod error;
pub mod event;
pub mod handlers;
pub mod registry;

pub use registry::{ConnectionId, CredentialSource, Registry, StaticToken};
