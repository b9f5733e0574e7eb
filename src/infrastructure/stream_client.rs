// Reconnecting stream client
//
// Owns one logical subscription to a remote endpoint: connection lifecycle,
// fixed-interval reconnection with a bounded attempt count, and JSON decoding
// of inbound text frames. The transport itself sits behind `Connector`.
//
//   Disconnected --connect()--> Connecting --open--> Connected
//   Connecting/Connected --close/fail--> Reconnecting (attempts < max) | Failed
//   Reconnecting --interval--> Connecting
//   any --disconnect()--> Disconnected
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::error::TelemetryError;

pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connection to {endpoint} failed: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("transport error: {0}")]
    Io(String),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to encode outbound payload: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type OutboundSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;
pub type InboundStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// An established, message-oriented connection. The inbound stream ending is
/// the authoritative close signal.
pub struct Transport {
    pub outbound: OutboundSink,
    pub inbound: InboundStream,
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Transport, TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SendStatus {
    Sent,
    NotConnected,
}

/// Callbacks run on the client's driver task and must not block or call back
/// into the client. None fires once `disconnect()` has returned.
pub trait StreamObserver<M>: Send + Sync + 'static {
    fn on_open(&self) {}
    fn on_message(&self, message: M);
    fn on_error(&self, _error: &TransportError) {}
    fn on_close(&self) {}
    /// Reconnect attempts are exhausted; nothing more will arrive.
    fn on_failed(&self) {}
}

#[derive(Debug, Clone)]
pub struct StreamClientConfig {
    pub endpoint: String,
    pub reconnect_interval: Duration,
    pub max_reconnect_attempts: u32,
}

impl StreamClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    fn validate(&self) -> Result<(), TelemetryError> {
        if self.endpoint.trim().is_empty() {
            return Err(TelemetryError::invalid("stream endpoint must not be empty"));
        }
        if self.reconnect_interval.is_zero() {
            return Err(TelemetryError::invalid("reconnect interval must be positive"));
        }
        Ok(())
    }
}

struct Shared {
    state: watch::Sender<ConnectionState>,
    attempts: AtomicU32,
    epoch: AtomicU64,
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    // Held for every epoch change and every driver-side state write or callback.
    gate: Mutex<()>,
}

impl Shared {
    fn gate(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    /// Run `f` under the gate if `epoch` is still live. Returns false for a
    /// stale driver, which must then exit.
    fn if_current(&self, epoch: u64, f: impl FnOnce()) -> bool {
        let _gate = self.gate();
        if !self.is_current(epoch) {
            return false;
        }
        f();
        true
    }

    /// Caller holds the gate.
    fn write_state(&self, next: ConnectionState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            tracing::debug!("Stream state {:?} -> {:?}", state, next);
            *state = next;
            true
        });
    }

    fn outbound(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<String>>> {
        self.outbound.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct StreamClient<M> {
    config: StreamClientConfig,
    connector: Arc<dyn Connector>,
    observer: Arc<dyn StreamObserver<M>>,
    shared: Arc<Shared>,
    driver: Mutex<Option<JoinHandle<()>>>,
    _message: PhantomData<fn() -> M>,
}

impl<M> StreamClient<M>
where
    M: DeserializeOwned + Send + 'static,
{
    pub fn new(
        config: StreamClientConfig,
        connector: Arc<dyn Connector>,
        observer: Arc<dyn StreamObserver<M>>,
    ) -> Result<Self, TelemetryError> {
        config.validate()?;
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Ok(Self {
            config,
            connector,
            observer,
            shared: Arc::new(Shared {
                state,
                attempts: AtomicU32::new(0),
                epoch: AtomicU64::new(0),
                outbound: Mutex::new(None),
                gate: Mutex::new(()),
            }),
            driver: Mutex::new(None),
            _message: PhantomData,
        })
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Start connecting. A no-op while a connection is live or being (re)established.
    pub fn connect(&self) {
        let mut driver = self.driver();
        if matches!(
            self.state(),
            ConnectionState::Connecting | ConnectionState::Connected | ConnectionState::Reconnecting
        ) {
            tracing::debug!("Stream client already active, ignoring connect");
            return;
        }
        if let Some(stale) = driver.take() {
            stale.abort();
        }

        let epoch = {
            let _gate = self.shared.gate();
            let epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            self.shared.attempts.store(0, Ordering::SeqCst);
            self.shared.write_state(ConnectionState::Connecting);
            epoch
        };

        let task = Driver {
            config: self.config.clone(),
            connector: self.connector.clone(),
            observer: self.observer.clone(),
            shared: self.shared.clone(),
            epoch,
        };
        *driver = Some(tokio::spawn(task.run()));
    }

    /// Queue `payload` as JSON text on the live transport.
    pub fn send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<SendStatus, StreamError> {
        let text = serde_json::to_string(payload)?;
        if self.state() != ConnectionState::Connected {
            tracing::warn!("Stream to {} is not connected, dropping message", self.config.endpoint);
            return Ok(SendStatus::NotConnected);
        }
        let sent = match self.shared.outbound().as_ref() {
            Some(tx) => tx.send(text).is_ok(),
            None => false,
        };
        if !sent {
            tracing::warn!("Stream to {} is not connected, dropping message", self.config.endpoint);
            return Ok(SendStatus::NotConnected);
        }
        Ok(SendStatus::Sent)
    }

    /// Tear down for good: cancels any reconnect wait and closes the transport.
    pub fn disconnect(&self) {
        let mut driver = self.driver();
        // Waits out any callback in flight; later ones see the new epoch.
        let _gate = self.shared.gate();
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = driver.take() {
            task.abort();
        }
        self.shared.outbound().take();

        let previous = self.shared.state.send_replace(ConnectionState::Disconnected);
        if previous == ConnectionState::Connected {
            self.observer.on_close();
        }
        if previous != ConnectionState::Disconnected {
            tracing::info!("Stream client disconnected from {}", self.config.endpoint);
        }
    }

    fn driver(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<M> Drop for StreamClient<M> {
    fn drop(&mut self) {
        {
            let _gate = self.shared.gate();
            self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        }
        let driver = self.driver.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = driver.take() {
            task.abort();
        }
    }
}

struct Driver<M> {
    config: StreamClientConfig,
    connector: Arc<dyn Connector>,
    observer: Arc<dyn StreamObserver<M>>,
    shared: Arc<Shared>,
    epoch: u64,
}

impl<M> Driver<M>
where
    M: DeserializeOwned + Send + 'static,
{
    async fn run(self) {
        let shared = &self.shared;
        loop {
            if !shared.if_current(self.epoch, || shared.write_state(ConnectionState::Connecting)) {
                return;
            }

            match self.connector.connect(&self.config.endpoint).await {
                Ok(transport) => {
                    let (tx, rx) = mpsc::unbounded_channel();
                    let opened = shared.if_current(self.epoch, || {
                        shared.attempts.store(0, Ordering::SeqCst);
                        *shared.outbound() = Some(tx);
                        shared.write_state(ConnectionState::Connected);
                        tracing::info!("Stream connected to {}", self.config.endpoint);
                        self.observer.on_open();
                    });
                    if !opened {
                        return;
                    }

                    self.pump(transport, rx).await;

                    let closed = shared.if_current(self.epoch, || {
                        shared.outbound().take();
                        tracing::info!("Stream to {} closed", self.config.endpoint);
                        self.observer.on_close();
                    });
                    if !closed {
                        return;
                    }
                }
                Err(err) => {
                    // A failed attempt still ends in a close, like an established one.
                    let reported = shared.if_current(self.epoch, || {
                        tracing::warn!("{}", err);
                        self.observer.on_error(&err);
                        self.observer.on_close();
                    });
                    if !reported {
                        return;
                    }
                }
            }

            let attempts = shared.attempts.load(Ordering::SeqCst);
            if attempts >= self.config.max_reconnect_attempts {
                shared.if_current(self.epoch, || {
                    shared.write_state(ConnectionState::Failed);
                    tracing::warn!(
                        "Max reconnect attempts ({}) reached for {}",
                        self.config.max_reconnect_attempts,
                        self.config.endpoint
                    );
                    self.observer.on_failed();
                });
                return;
            }

            let scheduled = shared.if_current(self.epoch, || {
                shared.attempts.store(attempts + 1, Ordering::SeqCst);
                shared.write_state(ConnectionState::Reconnecting);
                tracing::info!(
                    "Attempting to reconnect ({}/{}) in {:?}",
                    attempts + 1,
                    self.config.max_reconnect_attempts,
                    self.config.reconnect_interval
                );
            });
            if !scheduled {
                return;
            }
            tokio::time::sleep(self.config.reconnect_interval).await;
        }
    }

    /// Shuttle frames until the transport closes.
    async fn pump(&self, mut transport: Transport, mut rx: mpsc::UnboundedReceiver<String>) {
        loop {
            tokio::select! {
                inbound = transport.inbound.next() => match inbound {
                    Some(Ok(text)) => match serde_json::from_str::<M>(&text) {
                        Ok(message) => {
                            let live = self
                                .shared
                                .if_current(self.epoch, || self.observer.on_message(message));
                            if !live {
                                break;
                            }
                        }
                        Err(err) => tracing::warn!("Failed to decode stream message: {}", err),
                    },
                    Some(Err(err)) => {
                        tracing::warn!("Stream error on {}: {}", self.config.endpoint, err);
                        if !self.shared.if_current(self.epoch, || self.observer.on_error(&err)) {
                            break;
                        }
                    }
                    None => break,
                },
                outbound = rx.recv() => match outbound {
                    Some(text) => {
                        if let Err(err) = transport.outbound.send(text).await {
                            tracing::warn!("Failed to send on {}: {}", self.config.endpoint, err);
                            if !self.shared.if_current(self.epoch, || self.observer.on_error(&err)) {
                                break;
                            }
                        }
                    }
                    None => break,
                },
            }
        }

        let _ = transport.outbound.close().await;
    }
}
