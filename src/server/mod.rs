//! The connection server: listener lifecycle, admission control, extension
//! registry and dispatch.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::Error;
use crate::handler::{builtin_handlers, Handler};
use crate::request::Request;
use crate::store::{Store, StoreError};

mod task;

use task::AcceptTask;

/// A custom function code handler. It receives the parsed request and the
/// store and fully controls response construction, including the MBAP
/// header (see [`crate::codec::build_response_header`]).
pub type CustomHandler = Arc<dyn Fn(&Request, &dyn Store) -> Result<Vec<u8>, Error> + Send + Sync>;

/// Observer invoked when a request carries a function code with no
/// registered handler. The dispatcher still fails the request afterwards.
pub type RequestObserver = Arc<dyn Fn(&Request) + Send + Sync>;

/// Callback receiving every reported server error
pub type ErrorSink = Arc<dyn Fn(&Error) + Send + Sync>;

/// Server configuration: listen address and admission bound
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// `host:port` the listener binds to
    pub address: String,
    /// Maximum number of concurrently served connections
    pub max_connections: usize,
}

// Everything the accept and session tasks share. Handler maps are frozen
// at start, so no locking is required at dispatch time.
pub(crate) struct Shared {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) handlers: BTreeMap<u8, Box<dyn Handler>>,
    pub(crate) custom_handlers: BTreeMap<u8, CustomHandler>,
    pub(crate) observer: Option<RequestObserver>,
    pub(crate) error_sink: Option<ErrorSink>,
    pub(crate) active: Arc<AtomicI64>,
}

impl Shared {
    /// Route a request to its handler: the custom map wins over the
    /// built-ins, and an unhandled code goes to the observer before failing.
    pub(crate) fn dispatch(&self, request: &Request) -> Result<Vec<u8>, Error> {
        tracing::debug!("dispatching request: {}", request);

        if let Some(handler) = self.custom_handlers.get(&request.function()) {
            return handler(request, self.store.as_ref());
        }

        if let Some(handler) = self.handlers.get(&request.function()) {
            return handler.handle(request, self.store.as_ref());
        }

        if let Some(observer) = &self.observer {
            observer(request);
        }
        Err(Error::NoHandler(request.function()))
    }

    pub(crate) fn report(&self, err: &Error) {
        if let Some(sink) = &self.error_sink {
            sink(err);
        }
    }
}

enum State {
    Idle,
    Running(tokio::task::JoinHandle<()>),
    Stopped,
}

/// A Modbus TCP server.
///
/// The store is injected at construction and shared with every connection.
/// Custom handlers, the unhandled-request observer and the error sink must
/// be registered before [`Server::start`]; the running server never locks
/// the registry.
pub struct Server {
    config: ServerConfig,
    store: Arc<dyn Store>,
    handlers: BTreeMap<u8, Box<dyn Handler>>,
    custom_handlers: BTreeMap<u8, CustomHandler>,
    observer: Option<RequestObserver>,
    error_sink: Option<ErrorSink>,
    active: Arc<AtomicI64>,
    shutdown: CancellationToken,
    local_addr: Option<SocketAddr>,
    state: State,
}

impl Server {
    pub fn new(store: Arc<dyn Store>, config: ServerConfig) -> Self {
        Self {
            config,
            store,
            handlers: builtin_handlers(),
            custom_handlers: BTreeMap::new(),
            observer: None,
            error_sink: None,
            active: Arc::new(AtomicI64::new(0)),
            shutdown: CancellationToken::new(),
            local_addr: None,
            state: State::Idle,
        }
    }

    /// Register a handler for a custom function code. Custom handlers take
    /// precedence over the built-in handlers, including for standard codes.
    pub fn register_custom_handler(&mut self, code: u8, handler: CustomHandler) {
        if !matches!(self.state, State::Idle) {
            tracing::warn!("custom handlers must be registered before start");
            return;
        }
        self.custom_handlers.insert(code, handler);
    }

    /// Register the observer for requests with no matching handler
    pub fn on_unhandled_request(&mut self, observer: RequestObserver) {
        if !matches!(self.state, State::Idle) {
            tracing::warn!("the observer must be registered before start");
            return;
        }
        self.observer = Some(observer);
    }

    /// Register the error callback. Without one, reported errors are only
    /// visible through tracing.
    pub fn set_error_sink(&mut self, sink: ErrorSink) {
        if !matches!(self.state, State::Idle) {
            tracing::warn!("the error sink must be registered before start");
            return;
        }
        self.error_sink = Some(sink);
    }

    /// Replace the entire coil space of the injected store
    pub fn set_coils(&self, values: Vec<u8>) -> Result<(), StoreError> {
        self.store.write_coils(values)
    }

    /// Replace the entire discrete input space of the injected store
    pub fn set_discrete_inputs(&self, values: Vec<u8>) -> Result<(), StoreError> {
        self.store.write_discrete_inputs(values)
    }

    /// Replace the entire holding register space of the injected store
    pub fn set_holding_registers(&self, values: Vec<u16>) -> Result<(), StoreError> {
        self.store.write_holding_registers(values)
    }

    /// Replace the entire input register space of the injected store
    pub fn set_input_registers(&self, values: Vec<u16>) -> Result<(), StoreError> {
        self.store.write_input_registers(values)
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> i64 {
        self.active.load(Ordering::Relaxed)
    }

    /// Address the listener is bound to, available once started. Useful when
    /// binding to port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind the listener and spawn the accept task.
    ///
    /// Fails with [`Error::InvalidState`] if the server was already started
    /// or has been shut down.
    pub async fn start(&mut self) -> Result<(), Error> {
        if !matches!(self.state, State::Idle) {
            return Err(Error::InvalidState);
        }

        let listener = tokio::net::TcpListener::bind(self.config.address.as_str()).await?;
        let local_addr = listener.local_addr()?;
        self.local_addr = Some(local_addr);

        let shared = Arc::new(Shared {
            store: self.store.clone(),
            handlers: std::mem::take(&mut self.handlers),
            custom_handlers: std::mem::take(&mut self.custom_handlers),
            observer: self.observer.take(),
            error_sink: self.error_sink.take(),
            active: self.active.clone(),
        });

        let accept = AcceptTask::new(
            listener,
            shared,
            self.shutdown.clone(),
            Arc::new(Semaphore::new(self.config.max_connections)),
        );

        let task = tokio::spawn(
            accept
                .run()
                .instrument(tracing::info_span!("modbus-server", "listen" = ?local_addr)),
        );
        self.state = State::Running(task);
        Ok(())
    }

    /// Broadcast shutdown and wait for the accept task and every session
    /// task to exit. After `stop` returns the server cannot be restarted.
    pub async fn stop(&mut self) {
        self.shutdown.cancel();
        if let State::Running(task) = std::mem::replace(&mut self.state, State::Stopped) {
            if let Err(err) = task.await {
                tracing::error!("accept task panicked: {}", err);
            }
        }
    }
}
