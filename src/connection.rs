// file: src/connection.rs
// description: push connection lifecycle: open, stream, close classification, reconnect

use crate::{
    backoff::ReconnectPolicy, config::Config, creds::CredentialProvider, dispatch::FrameSender,
    error::FleetwatchError,
};
use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_tungstenite::{
    connect_async,
    tungstenite::Message,
    tungstenite::protocol::CloseFrame,
    tungstenite::protocol::frame::coding::CloseCode,
};
use tracing::{debug, error, info, trace, warn};
use url::Url;

/// Lifecycle state of the push connection. Transitions are owned by the
/// [`ConnectionManager`]; everyone else observes through the watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// How one established session ended.
enum SessionEnd {
    /// Server closed with code 1000. No reconnect.
    Normal,
    /// Anything else: abnormal close frame, stream error, or EOF.
    Abnormal,
    /// Local teardown; we sent the code-1000 close ourselves.
    Shutdown,
}

/// Requests teardown of the owning [`ConnectionManager`].
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Owns the single push connection: opens it with the current credential,
/// forwards raw text frames to the dispatcher, and reschedules itself with
/// capped exponential backoff on every abnormal close. Retries indefinitely;
/// for a dashboard, staleness beats giving up.
pub struct ConnectionManager {
    config: Arc<Config>,
    creds: Arc<dyn CredentialProvider>,
    frames: FrameSender,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<ConnectionState>,
    state_rx: watch::Receiver<ConnectionState>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    connection_id: String,
}

impl ConnectionManager {
    pub fn new(config: Arc<Config>, creds: Arc<dyn CredentialProvider>, frames: FrameSender) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config,
            creds,
            frames,
            policy: ReconnectPolicy::new(),
            state_tx,
            state_rx,
            shutdown_tx,
            shutdown_rx,
            connection_id: String::new(),
        }
    }

    /// The "is live" signal consumed by the rest of the UI.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    // Guard against callbacks resolving after teardown: once shutdown is
    // observed, the only transition still allowed is settling to Disconnected.
    fn set_state(&self, state: ConnectionState) {
        if self.shutdown_requested() && state != ConnectionState::Disconnected {
            return;
        }
        let _ = self.state_tx.send(state);
        crate::monitoring::CONNECTED_GAUGE.set(if state == ConnectionState::Connected {
            1.0
        } else {
            0.0
        });
    }

    /// Runs the connection until a normal close or teardown.
    ///
    /// An endpoint the transport cannot speak at all is not an error: the
    /// manager settles into Disconnected with nothing to recover from.
    pub async fn run(&mut self) -> Result<()> {
        if !matches!(self.config.push.url.scheme(), "ws" | "wss") {
            warn!(
                url = %self.config.push.url,
                "push endpoint unusable in this environment, staying disconnected"
            );
            self.set_state(ConnectionState::Disconnected);
            return Ok(());
        }

        loop {
            if self.shutdown_requested() {
                break;
            }
            self.set_state(ConnectionState::Connecting);

            let end = self.connect_and_stream().await;
            self.set_state(ConnectionState::Disconnected);

            match end {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Normal) => {
                    info!("server closed the connection normally, not reconnecting");
                    break;
                }
                Ok(SessionEnd::Abnormal) => self.wait_for_reconnect().await,
                Err(e) => {
                    warn!(error = %e, "push connection attempt failed");
                    self.wait_for_reconnect().await;
                }
            }
            if self.shutdown_requested() {
                break;
            }
        }

        self.set_state(ConnectionState::Disconnected);
        Ok(())
    }

    // One pending timer at a time by construction: the run loop is strictly
    // sequential. Teardown cancels the sleep.
    async fn wait_for_reconnect(&mut self) {
        let delay = self.policy.next_delay();
        crate::monitoring::RECONNECT_COUNTER.increment(1);
        warn!(
            delay_ms = delay.as_millis() as u64,
            attempt = self.policy.attempt(),
            "reconnecting after backoff"
        );
        let mut shutdown = self.shutdown_rx.clone();
        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.changed() => {
                debug!("teardown cancelled the pending reconnect");
            }
        }
    }

    async fn connect_and_stream(&mut self) -> Result<SessionEnd, FleetwatchError> {
        let url = endpoint_with_token(&self.config.push.url, self.creds.token().as_deref());
        let (ws_stream, _) = connect_async(url.as_str()).await?;

        self.connection_id = uuid::Uuid::new_v4().to_string();
        self.policy.reset();
        self.set_state(ConnectionState::Connected);
        info!(connection_id = %self.connection_id, "push connection established");

        let (mut write, mut read) = ws_stream.split();
        let mut shutdown = self.shutdown_rx.clone();

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    debug!("teardown requested, closing with code 1000");
                    let _ = write
                        .send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "client teardown".into(),
                        })))
                        .await;
                    return Ok(SessionEnd::Shutdown);
                }
                msg = read.next() => match msg {
                    None => {
                        warn!("push stream ended without a close frame");
                        return Ok(SessionEnd::Abnormal);
                    }
                    Some(Ok(Message::Text(text))) => {
                        crate::monitoring::FRAMES_RECEIVED_COUNTER.increment(1);
                        trace!(len = text.len(), "frame received");
                        if self.frames.send(text.to_string()).await.is_err() {
                            debug!("frame consumer gone, treating as teardown");
                            return Ok(SessionEnd::Shutdown);
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if is_normal_close(frame.as_ref()) {
                            return Ok(SessionEnd::Normal);
                        }
                        warn!(?frame, "abnormal close received");
                        return Ok(SessionEnd::Abnormal);
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // pong is queued by the transport on the next flush
                        debug!("ping received");
                    }
                    Some(Ok(_)) => {
                        debug!("ignoring non-text frame");
                    }
                    Some(Err(e)) => {
                        // Force the ambiguous errored connection into the
                        // abnormal-close path instead of limping on.
                        error!(error = %e, "push stream error, forcing the connection closed");
                        return Ok(SessionEnd::Abnormal);
                    }
                }
            }
        }
    }
}

/// Appends the bearer credential as a `token` query parameter when present.
fn endpoint_with_token(url: &Url, token: Option<&str>) -> Url {
    let mut url = url.clone();
    if let Some(token) = token {
        url.query_pairs_mut().append_pair("token", token);
    }
    url
}

fn is_normal_close(frame: Option<&CloseFrame>) -> bool {
    matches!(frame, Some(f) if f.code == CloseCode::Normal)
}
