use crate::error::{Error, ErrorKind};
use crate::event::{StreamEvent, ERROR_EVENT};
use crate::handlers::{Handler, HandlerId, HandlerTable};
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// Supplies the bearer token attached when a new stream connection is opened.
///
/// Injected into the registry so that connection setup stays decoupled from
/// how the session was established (login flow, env token, test fixture).
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed, optional bearer token.
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token)
    }
}

impl CredentialSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Unique identifier for a shared connection (registry-generated).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One shared stream: its dedup path, its watcher count, its handler table,
/// and the task driving the underlying connection.
struct Record {
    path: String,
    watchers: usize,
    handlers: Arc<HandlerTable>,
    reader: JoinHandle<()>,
}

/// Both maps live behind one mutex so that watcher-count updates and the
/// check-and-close on the last unsubscribe are a single atomic step.
struct Inner {
    records: HashMap<ConnectionId, Record>,
    path_index: HashMap<String, ConnectionId>,
}

/// Reference-counted registry of shared server-push event streams.
///
/// At most one underlying connection exists per distinct path. The first
/// `subscribe` to a path opens it; every later subscribe shares it; the last
/// `unsubscribe` closes it and removes the record in the same operation.
///
/// Construct one per application (or per test) and tear it down explicitly
/// with [`Registry::shutdown`]. All operations take `&self` and are safe to
/// call from any task.
pub struct Registry {
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    inner: Mutex<Inner>,
}

impl Registry {
    /// `base_url` is the API root the stream paths are resolved against,
    /// e.g. `http://localhost:6130/api`.
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            inner: Mutex::new(Inner {
                records: HashMap::new(),
                path_index: HashMap::new(),
            }),
        }
    }

    /// Subscribe to the event stream at `path`, sharing an existing
    /// connection when one is already open for that path.
    ///
    /// The returned id refers to a live connection at the moment of return.
    /// An unreachable host is not an error here; connection establishment is
    /// asynchronous and failures are dispatched to handlers registered for
    /// [`ERROR_EVENT`]. Only a malformed URL or token fails synchronously.
    ///
    /// Must be called from within a tokio runtime (the stream reader is a
    /// spawned task).
    pub fn subscribe(&self, path: &str) -> Result<ConnectionId, Error> {
        let mut inner = self.lock();

        if let Some(connection_id) = inner.path_index.get(path).cloned() {
            if let Some(record) = inner.records.get_mut(&connection_id) {
                record.watchers += 1;
                debug!(
                    "Sharing event stream for {} ({} watchers)",
                    path, record.watchers
                );
                return Ok(connection_id);
            }
        }

        // No record for this path: open a new connection while still holding
        // the lock, so a concurrent subscribe cannot open a second one.
        let url = format!("{}{}", self.base_url, path);
        let mut builder = es::ClientBuilder::for_url(&url)
            .map_err(|e| Error::with_source(ErrorKind::InvalidUrl, e))?;

        if let Some(token) = self.credentials.bearer_token() {
            builder = builder
                .header("Authorization", &format!("Bearer {token}"))
                .map_err(|e| Error::with_source(ErrorKind::InvalidCredential, e))?;
        }

        let handlers = Arc::new(HandlerTable::new());
        let reader = spawn_reader(builder.build(), Arc::clone(&handlers), path.to_string());

        let connection_id = ConnectionId::new();
        inner.records.insert(
            connection_id.clone(),
            Record {
                path: path.to_string(),
                watchers: 1,
                handlers,
                reader,
            },
        );
        inner
            .path_index
            .insert(path.to_string(), connection_id.clone());

        info!("Opened shared event stream for {path}");
        Ok(connection_id)
    }

    /// Drop one watcher from the connection.
    ///
    /// When the last watcher leaves, the underlying connection is closed and
    /// the record removed before this returns. An id that does not refer to
    /// a live record (never issued, or already fully torn down) is a caller
    /// bug and reported as [`ErrorKind::UnknownConnection`].
    pub fn unsubscribe(&self, connection_id: &ConnectionId) -> Result<(), Error> {
        let mut inner = self.lock();

        let watchers = {
            let record = inner
                .records
                .get_mut(connection_id)
                .ok_or_else(|| Error::new(ErrorKind::UnknownConnection))?;
            record.watchers -= 1;
            record.watchers
        };

        if watchers == 0 {
            if let Some(record) = inner.records.remove(connection_id) {
                inner.path_index.remove(&record.path);
                record.reader.abort();
                info!("Closed event stream for {} (last watcher left)", record.path);
            }
        }

        Ok(())
    }

    /// Attach a callback for a named event on the shared connection.
    ///
    /// Handlers are not deduplicated; pairing each add with a remove is the
    /// caller's responsibility (typically tied to component setup/teardown).
    pub fn add_event_handler(
        &self,
        connection_id: &ConnectionId,
        event_name: &str,
        handler: Handler,
    ) -> Result<HandlerId, Error> {
        let handlers = self.handlers_for(connection_id)?;
        let handler_id = handlers.add(event_name, handler);
        debug!(
            "Handler {} registered for {} ({} total on connection)",
            handler_id.as_str(),
            event_name,
            handlers.handler_count()
        );
        Ok(handler_id)
    }

    /// Detach a previously registered callback. After this returns the
    /// handler is never invoked again.
    pub fn remove_event_handler(
        &self,
        connection_id: &ConnectionId,
        event_name: &str,
        handler_id: &HandlerId,
    ) -> Result<(), Error> {
        let handlers = self.handlers_for(connection_id)?;
        if handlers.remove(event_name, handler_id) {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::UnknownHandler))
        }
    }

    /// Number of watchers currently sharing the connection, or None if the
    /// id does not refer to a live record.
    pub fn watcher_count(&self, connection_id: &ConnectionId) -> Option<usize> {
        self.lock()
            .records
            .get(connection_id)
            .map(|record| record.watchers)
    }

    /// Number of distinct open connections.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Close every open connection and clear the registry.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        for (_, record) in inner.records.drain() {
            record.reader.abort();
        }
        inner.path_index.clear();
        info!("Connection registry shut down");
    }

    fn handlers_for(&self, connection_id: &ConnectionId) -> Result<Arc<HandlerTable>, Error> {
        self.lock()
            .records
            .get(connection_id)
            .map(|record| Arc::clone(&record.handlers))
            .ok_or_else(|| Error::new(ErrorKind::UnknownConnection))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves consistent maps (no partial
        // multi-step mutations escape the guard), so poisoning is recoverable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        for record in self.lock().records.values() {
            record.reader.abort();
        }
    }
}

/// Drive the underlying stream, dispatching named events to the shared
/// handler table. Transport errors become [`ERROR_EVENT`] events.
fn spawn_reader(
    client: impl Client + Send + 'static,
    handlers: Arc<HandlerTable>,
    path: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = client.stream();

        loop {
            match stream.next().await {
                Some(Ok(es::SSE::Event(event))) => {
                    handlers.dispatch(&StreamEvent {
                        event_type: event.event_type,
                        data: event.data,
                    });
                }
                Some(Ok(es::SSE::Comment(_))) => {
                    // Ignore comments (keep-alive)
                }
                Some(Err(e)) => {
                    warn!("Event stream error on {}: {}", path, e);
                    handlers.dispatch(&StreamEvent {
                        event_type: ERROR_EVENT.to_string(),
                        data: e.to_string(),
                    });
                }
                None => {
                    debug!("Event stream for {} ended", path);
                    break;
                }
            }
        }
    })
}
