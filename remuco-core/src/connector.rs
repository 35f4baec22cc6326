//! Connection negotiation.
//!
//! A [`Connector`] performs the slow, I/O-bound work of establishing a
//! [`Connection`] on a background task and signals completion exactly
//! once through a one-shot channel:
//!
//! ```text
//!  Pending ──► Succeeded   (Welcome received, version ok)
//!     │
//!     ├─────► Cancelled    (user gave up while negotiating)
//!     │
//!     └─────► Failed       (connect/handshake error, with diagnostic)
//! ```
//!
//! All three terminal outcomes release the waiter — cancellation is a
//! first-class outcome, not an exception path. A coarse state is also
//! published on a `watch` channel so observers that start watching
//! after completion still see the terminal state.

use std::fmt;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch};
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::codec::RemucoCodec;
use crate::error::RemucoError;
use crate::message::Message;
use crate::network::connection::DEFAULT_PING_INTERVAL;
use crate::network::{ConnectTarget, Connection};
use crate::proto::{ClientInfo, PROTO_VERSION, PlayerInfo};

// ── Outcome types ────────────────────────────────────────────────

/// Coarse negotiation state published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectState {
    /// Negotiation still running.
    #[default]
    Pending,
    /// Terminal: a usable connection was produced.
    Succeeded,
    /// Terminal: the user cancelled the attempt.
    Cancelled,
    /// Terminal: negotiation failed; the outcome carries the diagnostic.
    Failed,
}

impl ConnectState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConnectState::Pending)
    }
}

impl fmt::Display for ConnectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Return-code view of an outcome, for callers that branch numerically.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Ok = 0,
    UserCancel = 1,
    Error = 2,
}

/// The terminal result of one negotiation attempt.
///
/// Delivered exactly once; the `Connection` moves to the consumer, so
/// the connector retains no reference to it afterwards.
#[derive(Debug)]
pub enum ConnectOutcome {
    /// Negotiation succeeded; ownership of the connection moves with
    /// this variant.
    Connected(Connection),
    /// The user cancelled while negotiation was in flight.
    Cancelled,
    /// Negotiation failed with a user-facing diagnostic.
    Failed { message: String },
}

impl ConnectOutcome {
    pub fn code(&self) -> ReturnCode {
        match self {
            ConnectOutcome::Connected(_) => ReturnCode::Ok,
            ConnectOutcome::Cancelled => ReturnCode::UserCancel,
            ConnectOutcome::Failed { .. } => ReturnCode::Error,
        }
    }

    /// The diagnostic message; empty unless the outcome is `Failed`.
    pub fn user_msg(&self) -> &str {
        match self {
            ConnectOutcome::Failed { message } => message,
            _ => "",
        }
    }

    fn state(&self) -> ConnectState {
        match self {
            ConnectOutcome::Connected(_) => ConnectState::Succeeded,
            ConnectOutcome::Cancelled => ConnectState::Cancelled,
            ConnectOutcome::Failed { .. } => ConnectState::Failed,
        }
    }
}

// ── Options ──────────────────────────────────────────────────────

/// Tunables for one negotiation attempt.
#[derive(Debug, Clone)]
pub struct ConnectorOptions {
    /// Deadline for the TCP connect.
    pub connect_timeout: Duration,
    /// Deadline for the `Welcome` reply after `Hello` is sent.
    pub hello_timeout: Duration,
    /// Keep-alive interval handed to the resulting connection.
    pub ping_interval: Duration,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            hello_timeout: Duration::from_secs(5),
            ping_interval: DEFAULT_PING_INTERVAL,
        }
    }
}

// ── Connector ────────────────────────────────────────────────────

/// One asynchronous connection attempt.
///
/// Created with [`spawn`](Self::spawn), which begins negotiation
/// immediately and returns without blocking. Consume the attempt with
/// [`wait`](Self::wait); observe it with [`watch_state`](Self::watch_state).
pub struct Connector {
    outcome_rx: oneshot::Receiver<ConnectOutcome>,
    state_rx: watch::Receiver<ConnectState>,
    cancel: CancellationToken,
}

impl Connector {
    /// Begin negotiating a connection to `target` on a background task.
    pub fn spawn(target: ConnectTarget, client_info: ClientInfo, opts: ConnectorOptions) -> Self {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (state_tx, state_rx) = watch::channel(ConnectState::Pending);
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = task_cancel.cancelled() => {
                    info!("negotiation with {target} cancelled by user");
                    ConnectOutcome::Cancelled
                }
                result = negotiate(&target, client_info, &opts) => match result {
                    Ok(conn) => {
                        info!("connection to {target} established");
                        ConnectOutcome::Connected(conn)
                    }
                    Err(e) => {
                        debug!("negotiation with {target} failed: {e}");
                        ConnectOutcome::Failed {
                            message: e.to_string(),
                        }
                    }
                },
            };

            // Publish order matters: the fully-populated outcome must be
            // available before any observer can see a terminal state.
            let state = outcome.state();
            let _ = outcome_tx.send(outcome);
            let _ = state_tx.send(state);
        });

        Self {
            outcome_rx,
            state_rx,
            cancel,
        }
    }

    /// Request cancellation. The background task still signals a
    /// terminal outcome, so no waiter blocks forever.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this attempt, for wiring to a UI action.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current coarse state.
    pub fn state(&self) -> ConnectState {
        *self.state_rx.borrow()
    }

    /// Subscribe to state changes. A receiver obtained after completion
    /// still observes the terminal state.
    pub fn watch_state(&self) -> watch::Receiver<ConnectState> {
        self.state_rx.clone()
    }

    /// Consume the attempt and await its terminal outcome.
    ///
    /// Returns immediately if negotiation already finished.
    pub async fn wait(self) -> ConnectOutcome {
        match self.outcome_rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                // The background task died without signaling. This
                // cannot happen under normal operation.
                error!("{}", RemucoError::Bug {
                    tag: "connector.wait: completion dropped",
                });
                ConnectOutcome::Failed {
                    message: "internal error during negotiation".to_string(),
                }
            }
        }
    }
}

// ── Negotiation ──────────────────────────────────────────────────

/// TCP connect plus hello exchange.
///
/// The framed stream is handed to the resulting [`Connection`] intact,
/// so frames the host sends right after `Welcome` are not lost.
async fn negotiate(
    target: &ConnectTarget,
    client_info: ClientInfo,
    opts: &ConnectorOptions,
) -> Result<Connection, RemucoError> {
    debug!("connecting to {target}");
    let stream = timeout(
        opts.connect_timeout,
        TcpStream::connect((target.host(), target.port())),
    )
    .await
    .map_err(|_| RemucoError::Timeout(opts.connect_timeout))??;
    stream.set_nodelay(true)?;

    let mut framed = Framed::new(stream, RemucoCodec);

    framed.send(client_info.into_frame()?).await?;

    let reply = timeout(opts.hello_timeout, framed.next())
        .await
        .map_err(|_| RemucoError::Timeout(opts.hello_timeout))?
        .ok_or(RemucoError::ProtocolViolation(
            "host closed during handshake",
        ))??;

    match reply.message()? {
        Message::Welcome => {
            let info = PlayerInfo::from_bytes(reply.payload())?;
            if info.proto_version != PROTO_VERSION {
                return Err(RemucoError::UnsupportedVersion(info.proto_version));
            }
            debug!("host is \"{}\"", info.name);
            Ok(Connection::from_framed(framed, info, opts.ping_interval))
        }
        Message::Bye => Err(RemucoError::ProtocolViolation(
            "host refused the connection",
        )),
        _ => Err(RemucoError::ProtocolViolation(
            "expected Welcome as handshake reply",
        )),
    }
}
