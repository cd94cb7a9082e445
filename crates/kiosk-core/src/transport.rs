//! Long-lived backend connection with reconnect/backoff.
//!
//! One task owns the websocket. Inbound pushes and connection status changes
//! leave through a single ordered channel; outbound requests arrive through
//! an unbounded queue and are written only while the session is open.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::protocol::{self, Packet};

/// Outbound side of the connection as seen by stores.
///
/// Requests are fire-and-forget: no acknowledgement, no retry, no timeout.
pub trait Emitter: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Open,
    Closed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// Failed attempts since the last successful open.
    pub retry_count: u32,
    pub last_error: Option<String>,
}

impl ConnectionStatus {
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }
}

/// Everything the event loop needs from the transport, in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    Status(ConnectionStatus),
    Push { name: String, payload: Value },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// `None` retries forever.
    pub max_retries: Option<u32>,
    /// Bound on websocket connect plus the open/connect exchange.
    pub handshake_timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            max_retries: None,
            handshake_timeout: Duration::from_secs(20),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }

    fn exhausted(&self, retry_count: u32) -> bool {
        match self.max_retries {
            Some(max) => retry_count > max,
            None => false,
        }
    }
}

#[derive(Debug)]
struct Outbound {
    event: String,
    payload: Value,
}

/// Cloneable sender half handed to stores and front ends.
#[derive(Clone)]
pub struct TransportHandle {
    outbound: mpsc::UnboundedSender<Outbound>,
    status: watch::Receiver<ConnectionStatus>,
}

impl TransportHandle {
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn current_status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }
}

impl Emitter for TransportHandle {
    fn emit(&self, event: &str, payload: Value) {
        let out = Outbound {
            event: event.to_string(),
            payload,
        };
        if self.outbound.send(out).is_err() {
            tracing::debug!(event, "transport stopped; request dropped");
        }
    }
}

/// Spawn the connection task. Must be called inside a tokio runtime.
pub fn connect(
    url: String,
    policy: ReconnectPolicy,
    shutdown: CancellationToken,
) -> (
    TransportHandle,
    mpsc::UnboundedReceiver<TransportEvent>,
    JoinHandle<()>,
) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(ConnectionStatus::default());
    let publisher = StatusPublisher {
        status: status_tx,
        events: events_tx,
    };
    let task = tokio::spawn(run(url, policy, outbound_rx, publisher, shutdown));
    let handle = TransportHandle {
        outbound: outbound_tx,
        status: status_rx,
    };
    (handle, events_rx, task)
}

struct StatusPublisher {
    status: watch::Sender<ConnectionStatus>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl StatusPublisher {
    fn publish(&self, next: ConnectionStatus) {
        if *self.status.borrow() == next {
            return;
        }
        tracing::debug!(state = ?next.state, retry = next.retry_count, "connection status");
        self.status.send_replace(next.clone());
        let _ = self.events.send(TransportEvent::Status(next));
    }

    fn push(&self, name: String, payload: Value) -> bool {
        self.events.send(TransportEvent::Push { name, payload }).is_ok()
    }
}

async fn run(
    url: String,
    policy: ReconnectPolicy,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    publisher: StatusPublisher,
    shutdown: CancellationToken,
) {
    let mut retry_count = 0u32;
    let mut last_error: Option<String> = None;

    loop {
        drop_stale(&mut outbound);
        publisher.publish(ConnectionStatus {
            state: ConnectionState::Connecting,
            retry_count,
            last_error: last_error.clone(),
        });

        let mut opened = false;
        let result = session(&url, &policy, &mut outbound, &publisher, &shutdown, &mut opened).await;
        match result {
            Ok(()) => break,
            Err(err) => {
                tracing::warn!(url = %url, "connection lost: {err:#}");
                last_error = Some(format!("{err:#}"));
            }
        }

        retry_count = if opened { 1 } else { retry_count + 1 };
        if policy.exhausted(retry_count) {
            tracing::error!(retries = retry_count - 1, "giving up on backend connection");
            publisher.publish(ConnectionStatus {
                state: ConnectionState::Closed,
                retry_count,
                last_error: Some(format!(
                    "retries exhausted: {}",
                    last_error.as_deref().unwrap_or("unknown error")
                )),
            });
            return;
        }

        publisher.publish(ConnectionStatus {
            state: ConnectionState::Closed,
            retry_count,
            last_error: last_error.clone(),
        });
        let delay = policy.delay_for(retry_count);
        tracing::info!(retry = retry_count, delay_ms = delay.as_millis() as u64, "reconnecting");
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    publisher.publish(ConnectionStatus {
        state: ConnectionState::Closed,
        retry_count: 0,
        last_error: None,
    });
}

/// Requests queued before the session opened are discarded, never replayed.
fn drop_stale(outbound: &mut mpsc::UnboundedReceiver<Outbound>) {
    let mut dropped = 0usize;
    while let Ok(out) = outbound.try_recv() {
        tracing::debug!(event = %out.event, "dropping request issued while offline");
        dropped += 1;
    }
    if dropped > 0 {
        tracing::info!(count = dropped, "dropped offline requests");
    }
}

/// Drive one websocket session. `Ok(())` means orderly shutdown.
async fn session(
    url: &str,
    policy: &ReconnectPolicy,
    outbound: &mut mpsc::UnboundedReceiver<Outbound>,
    publisher: &StatusPublisher,
    shutdown: &CancellationToken,
    opened: &mut bool,
) -> Result<()> {
    // Covers the websocket connect and the open/connect exchange together.
    let handshake_deadline = Instant::now() + policy.handshake_timeout;
    let connect = tokio_tungstenite::connect_async(url.to_string());
    let (ws, _) = tokio::select! {
        _ = shutdown.cancelled() => return Ok(()),
        res = tokio::time::timeout_at(handshake_deadline, connect) => res
            .map_err(|_| anyhow!("connect timed out after {:?}", policy.handshake_timeout))?
            .with_context(|| format!("connect {url}"))?,
    };
    let (mut sink, mut stream) = ws.split();
    let mut liveness = policy.handshake_timeout;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                return Ok(());
            }
            _ = tokio::time::sleep_until(handshake_deadline), if !*opened => {
                return Err(anyhow!("handshake timed out after {:?}", policy.handshake_timeout));
            }
            frame = tokio::time::timeout(liveness, stream.next()) => {
                let frame = match frame {
                    Err(_) => return Err(anyhow!("no traffic for {liveness:?}")),
                    Ok(None) => return Err(anyhow!("socket closed by peer")),
                    Ok(Some(frame)) => frame.context("websocket read")?,
                };
                let text = match frame {
                    Message::Text(text) => text,
                    Message::Close(_) => return Err(anyhow!("socket closed by peer")),
                    _ => continue,
                };
                match protocol::decode(&text) {
                    Ok(Packet::Open(handshake)) => {
                        liveness = handshake.liveness_window();
                        sink.send(Message::Text(protocol::CONNECT.to_string()))
                            .await
                            .context("send namespace connect")?;
                    }
                    Ok(Packet::Connect) => {
                        drop_stale(outbound);
                        *opened = true;
                        tracing::info!(url = %url, "connected to backend");
                        publisher.publish(ConnectionStatus {
                            state: ConnectionState::Open,
                            retry_count: 0,
                            last_error: None,
                        });
                    }
                    Ok(Packet::Ping) => {
                        sink.send(Message::Text(protocol::PONG.to_string()))
                            .await
                            .context("send pong")?;
                    }
                    Ok(Packet::Event { name, payload }) => {
                        tracing::trace!(event = %name, "push received");
                        if !publisher.push(name, payload) {
                            return Ok(());
                        }
                    }
                    Ok(Packet::Close) | Ok(Packet::Disconnect) => {
                        return Err(anyhow!("backend closed the session"));
                    }
                    Ok(Packet::ConnectError(message)) => {
                        return Err(anyhow!("namespace connect refused: {message}"));
                    }
                    Ok(Packet::Pong) | Ok(Packet::Noop) => {}
                    Ok(Packet::Unsupported(kind)) => {
                        tracing::debug!(kind = %kind, "ignoring unsupported packet");
                    }
                    Err(err) => tracing::warn!("dropping malformed frame: {err:#}"),
                }
            }
            out = outbound.recv(), if *opened => {
                let Some(out) = out else {
                    return Ok(());
                };
                let frame = protocol::encode_event(&out.event, &out.payload);
                tracing::debug!(event = %out.event, "request sent");
                sink.send(Message::Text(frame)).await.context("websocket write")?;
            }
        }
    }
}
