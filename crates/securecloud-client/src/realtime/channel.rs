//! Realtime channel driver.

use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, instrument, warn};

use securecloud_core::error::ChannelError;
use securecloud_core::events::{Frame, Notification};
use securecloud_core::types::RealtimeUrl;

use crate::auth::{SessionEvent, TokenManager};
use crate::config::ReconnectPolicy;

use super::connection;
use super::router::EventRouter;
use super::state::{ConnectionFsm, ConnectionState, Signal, Step};

const EVENT_CAPACITY: usize = 256;

/// Something observers of the channel can react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// The connection state changed.
    StateChanged(ConnectionState),
    /// A frame arrived from the server, before routing.
    Received(Frame),
    /// A notification for the user.
    Notification(Notification),
    /// Dashboard data should be refetched.
    StatsChanged,
}

/// Persistent realtime connection with automatic reconnection.
///
/// At most one connection exists per channel. [`enable`](Self::enable) and
/// [`disable`](Self::disable) are idempotent, and each tears down the
/// previous connection before returning. A logout broadcast by the
/// [`TokenManager`] disables the channel.
///
/// Cheap to clone; clones drive the same connection.
#[derive(Clone)]
pub struct RealtimeChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    shared: Arc<ChannelShared>,
    active: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

/// State the driver task needs.
struct ChannelShared {
    url: RealtimeUrl,
    handshake_timeout: Duration,
    tokens: TokenManager,
    router: EventRouter,
    fsm: Mutex<ConnectionFsm>,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<ChannelEvent>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
}

impl RealtimeChannel {
    /// Create a disabled channel.
    pub fn new(
        url: RealtimeUrl,
        tokens: TokenManager,
        policy: ReconnectPolicy,
        handshake_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(ChannelInner {
                shared: Arc::new(ChannelShared {
                    url,
                    handshake_timeout,
                    tokens,
                    router: EventRouter::new(),
                    fsm: Mutex::new(ConnectionFsm::new(policy)),
                    state,
                    events,
                    outbound: Mutex::new(None),
                }),
                active: tokio::sync::Mutex::new(None),
            }),
        }
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.shared.state.borrow()
    }

    /// Watch connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.shared.state.subscribe()
    }

    /// Subscribe to channel events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.inner.shared.events.subscribe()
    }

    /// Channel events as a stream.
    ///
    /// Events missed by a slow consumer are skipped with a warning.
    pub fn events(&self) -> ChannelEventStream {
        let mut rx = self.subscribe();
        ChannelEventStream::new(async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => yield event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Channel event consumer lagging");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Enable the channel and start connecting.
    ///
    /// Does nothing if the channel is already enabled. A channel in
    /// [`ConnectionState::Failed`] starts over with a fresh budget.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::MissingToken`] without attempting a connection
    /// if no access token is held.
    #[instrument(skip(self))]
    pub async fn enable(&self) -> Result<(), ChannelError> {
        let mut active = self.inner.active.lock().await;

        let running = active.as_ref().is_some_and(|task| !task.is_finished());
        let settled = matches!(
            self.inner.shared.current_state(),
            ConnectionState::Disconnected | ConnectionState::Failed
        );
        if running && !settled {
            debug!("Realtime channel already enabled");
            return Ok(());
        }
        if let Some(task) = active.take() {
            stop(task).await;
        }

        if !self.inner.shared.tokens.is_authenticated() {
            warn!("No access token available, realtime channel not started");
            return Err(ChannelError::MissingToken);
        }

        let shared = &self.inner.shared;
        let step = match shared.dispatch(Signal::Enable) {
            // No driver is running, so the recorded state is stale.
            Step::Ignore => {
                shared.dispatch(Signal::Disable);
                shared.dispatch(Signal::Enable)
            }
            step => step,
        };
        debug_assert_eq!(step, Step::Connect);

        info!("Enabling realtime channel");
        let session = shared.tokens.subscribe();
        *active = Some(tokio::spawn(drive(Arc::clone(shared), session)));

        Ok(())
    }

    /// Disable the channel, closing any connection.
    ///
    /// The connection is gone by the time this returns.
    #[instrument(skip(self))]
    pub async fn disable(&self) {
        let mut active = self.inner.active.lock().await;
        if let Some(task) = active.take() {
            stop(task).await;
        }
        self.inner.shared.set_outbound(None);
        if self.inner.shared.dispatch(Signal::Disable) == Step::Teardown {
            info!("Realtime channel disabled");
        }
    }

    /// Tear down and re-enable, resetting the reconnection budget.
    pub async fn restart(&self) -> Result<(), ChannelError> {
        self.disable().await;
        self.enable().await
    }

    /// Send a named event to the server.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::NotConnected`] unless the channel is
    /// connected.
    pub fn send(&self, event: &str, data: Value) -> Result<(), ChannelError> {
        let shared = &self.inner.shared;
        if !shared.current_state().is_connected() {
            warn!(event, "Cannot send, realtime channel not connected");
            return Err(ChannelError::NotConnected);
        }

        let text = Frame::new(event, data)
            .to_text()
            .map_err(|e| ChannelError::Send {
                message: e.to_string(),
            })?;

        let outbound = shared.outbound.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = outbound.as_ref() else {
            return Err(ChannelError::NotConnected);
        };
        tx.send(Message::Text(text.into()))
            .map_err(|_| ChannelError::NotConnected)
    }
}

impl Drop for ChannelInner {
    fn drop(&mut self) {
        if let Some(task) = self.active.get_mut().take() {
            task.abort();
        }
    }
}

async fn stop(task: JoinHandle<()>) {
    task.abort();
    // Cancellation is the expected outcome.
    let _ = task.await;
}

impl ChannelShared {
    fn current_state(&self) -> ConnectionState {
        self.fsm.lock().unwrap_or_else(PoisonError::into_inner).state()
    }

    fn dispatch(&self, signal: Signal) -> Step {
        let (step, state) = {
            let mut fsm = self.fsm.lock().unwrap_or_else(PoisonError::into_inner);
            let step = fsm.dispatch(signal);
            (step, fsm.state())
        };

        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "Realtime state changed");
            self.emit(ChannelEvent::StateChanged(state));
        }
        step
    }

    fn emit(&self, event: ChannelEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn notify(&self, notification: Notification) {
        self.emit(ChannelEvent::Notification(notification));
    }

    fn set_outbound(&self, tx: Option<mpsc::UnboundedSender<Message>>) {
        *self.outbound.lock().unwrap_or_else(PoisonError::into_inner) = tx;
    }

    fn handle_frame(&self, frame: Frame) {
        let routed = self.router.route_frame(&frame);
        self.emit(ChannelEvent::Received(frame));
        if let Some(notification) = routed.notification {
            self.notify(notification);
        }
        if routed.refresh_stats {
            self.emit(ChannelEvent::StatsChanged);
        }
    }

    /// Connect, pump and reconnect until told to stop or out of budget.
    async fn run(&self) {
        let mut step = Step::Connect;
        // Set once a connection has been established in this run; later
        // connections are reconnects.
        let mut was_connected = false;

        loop {
            match step {
                Step::Connect => {}
                Step::Retry { attempt, delay } => {
                    info!(attempt, ?delay, "Reconnecting to realtime channel");
                    tokio::time::sleep(delay).await;
                }
                Step::GiveUp { attempts } => {
                    error!(attempts, "Realtime reconnection budget exhausted");
                    self.notify(Notification::error("Failed to reconnect to real-time updates"));
                    return;
                }
                Step::Established { .. } | Step::Teardown | Step::Ignore => return,
            }

            let Some(token) = self.tokens.access_token() else {
                warn!("Access token gone, stopping realtime channel");
                self.dispatch(Signal::Disable);
                return;
            };

            let socket = match connection::open(&self.url, &token, self.handshake_timeout).await {
                Ok(socket) => socket,
                Err(e) => {
                    warn!(error = %e, "Realtime connection attempt failed");
                    self.notify(Notification::error("Failed to connect to real-time updates"));
                    step = self.dispatch(Signal::AttemptFailed);
                    continue;
                }
            };

            let (tx, rx) = mpsc::unbounded_channel();
            self.set_outbound(Some(tx));

            let Step::Established { after_attempts } = self.dispatch(Signal::Opened) else {
                self.set_outbound(None);
                return;
            };

            info!(after_attempts, "Connected to realtime channel");
            self.notify(Notification::success("Connected to real-time updates"));
            if was_connected {
                self.notify(Notification::success("Reconnected to real-time updates"));
            }
            was_connected = true;

            let reason = connection::pump(socket, rx, |frame| self.handle_frame(frame)).await;
            self.set_outbound(None);
            warn!(%reason, "Realtime connection lost");
            step = self.dispatch(Signal::Dropped);
        }
    }
}

/// Driver task: runs the connection loop until it ends or the session does.
async fn drive(shared: Arc<ChannelShared>, mut session: broadcast::Receiver<SessionEvent>) {
    tokio::select! {
        _ = shared.run() => {}
        _ = logged_out(&mut session) => {
            info!("Session ended, closing realtime channel");
            shared.set_outbound(None);
            shared.dispatch(Signal::Disable);
        }
    }
}

async fn logged_out(session: &mut broadcast::Receiver<SessionEvent>) {
    loop {
        match session.recv().await {
            Ok(SessionEvent::LoggedOut { .. }) => return,
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

/// Stream of [`ChannelEvent`]s returned by [`RealtimeChannel::events`].
pub struct ChannelEventStream {
    inner: Pin<Box<dyn Stream<Item = ChannelEvent> + Send>>,
}

impl ChannelEventStream {
    fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = ChannelEvent> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for ChannelEventStream {
    type Item = ChannelEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
