//! A duplex channel to a player adapter host.
//!
//! Wraps a framed TCP stream split into background reader/writer tasks
//! bridged by mpsc channels, plus a keep-alive ping task. A
//! `Connection` is created by a successful negotiation and is closed
//! exactly once — a new attempt always builds a new `Connection`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::codec::RemucoCodec;
use crate::error::RemucoError;
use crate::frame::Frame;
use crate::message::Message;
use crate::proto::PlayerInfo;

// ── ConnectTarget ────────────────────────────────────────────────

/// Address of a player adapter host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    host: String,
    port: u16,
}

impl ConnectTarget {
    /// Build a target, rejecting obviously unusable parameters.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, RemucoError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(RemucoError::Config("empty host".to_string()));
        }
        if port == 0 {
            return Err(RemucoError::Config("port must be non-zero".to_string()));
        }
        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ── Connection ───────────────────────────────────────────────────

/// Default keep-alive interval.
pub(crate) const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(5);

/// An open duplex channel to the host.
#[derive(Debug)]
pub struct Connection {
    // Channel to the background writer task
    tx: mpsc::Sender<Frame>,
    // Channel from the background reader task; `None` once handed to
    // a player session
    rx: Option<mpsc::Receiver<Frame>>,
    open: Arc<AtomicBool>,
    player_info: PlayerInfo,
}

impl Connection {
    /// Wrap an already-negotiated framed stream.
    ///
    /// Used by the connector, which performs the hello exchange on the
    /// framed stream before handing it over (keeping any frames the
    /// host sent right after `Welcome` in the codec buffer).
    pub fn from_framed(
        framed: Framed<TcpStream, RemucoCodec>,
        player_info: PlayerInfo,
        ping_interval: Duration,
    ) -> Self {
        let (mut net_writer, mut net_reader) = framed.split();
        let open = Arc::new(AtomicBool::new(true));

        // User -> Network
        let (user_tx, mut network_rx) = mpsc::channel::<Frame>(100);

        // Network -> User
        let (network_tx, user_rx) = mpsc::channel::<Frame>(100);

        // Writer task: User -> Network
        let writer_open = Arc::clone(&open);
        tokio::spawn(async move {
            while let Some(frame) = network_rx.recv().await {
                if let Err(e) = net_writer.send(frame).await {
                    warn!("network write error: {e}");
                    writer_open.store(false, Ordering::SeqCst);
                    break;
                }
            }
            // Flush and close the sink so the host sees a clean FIN.
            let _ = net_writer.close().await;
        });

        // Reader task: Network -> User
        let reader_open = Arc::clone(&open);
        tokio::spawn(async move {
            while let Some(result) = net_reader.next().await {
                match result {
                    Ok(frame) => {
                        let is_bye = frame.message().is_ok_and(|m| m == Message::Bye);
                        if network_tx.send(frame).await.is_err() {
                            // user_rx was dropped, stop reading
                            break;
                        }
                        if is_bye {
                            debug!("host said bye");
                            reader_open.store(false, Ordering::SeqCst);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("network read error: {e}");
                        reader_open.store(false, Ordering::SeqCst);
                        break;
                    }
                }
            }
            reader_open.store(false, Ordering::SeqCst);
        });

        // Keep-alive task: stops when the connection handle is dropped
        // or the connection is no longer open. A zero interval disables
        // keep-alives.
        if !ping_interval.is_zero() {
            let ping_tx = user_tx.clone();
            let ping_open = Arc::clone(&open);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(ping_interval);
                // The first tick fires immediately; skip it.
                interval.tick().await;
                loop {
                    interval.tick().await;
                    if !ping_open.load(Ordering::SeqCst) {
                        break;
                    }
                    if ping_tx.send(Frame::ping()).await.is_err() {
                        break;
                    }
                }
            });
        }

        Self {
            tx: user_tx,
            rx: Some(user_rx),
            open,
            player_info,
        }
    }

    /// Wrap a raw TCP stream (testing and host-side use).
    pub fn new(stream: TcpStream, player_info: PlayerInfo, ping_interval: Duration) -> Self {
        Self::from_framed(Framed::new(stream, RemucoCodec), player_info, ping_interval)
    }

    /// The host's self-description from the handshake.
    pub fn player_info(&self) -> &PlayerInfo {
        &self.player_info
    }

    /// Whether the channel is still usable.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Send a frame to the host.
    pub async fn send(&self, frame: Frame) -> Result<(), RemucoError> {
        if !self.is_open() {
            return Err(RemucoError::ConnectionClosed);
        }
        self.tx.send(frame).await?;
        Ok(())
    }

    /// Receive the next frame from the host.
    ///
    /// Returns `None` once the channel is drained after close or peer
    /// disconnect, or when the event stream has been handed to a
    /// player session. Keep-alive pings are delivered like any other
    /// frame; consumers skip them.
    pub async fn recv(&mut self) -> Option<Frame> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// A cloneable handle for sending frames.
    pub fn sender(&self) -> mpsc::Sender<Frame> {
        self.tx.clone()
    }

    /// Hand the incoming-frame stream to a player session.
    ///
    /// Ownership of the stream moves out; only the first call yields it.
    pub(crate) fn take_events(&mut self) -> Option<mpsc::Receiver<Frame>> {
        self.rx.take()
    }

    /// Shared open flag, for handles that outlive borrows of `self`.
    pub(crate) fn open_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.open)
    }

    /// Close the channel. Idempotent; only the first call acts.
    ///
    /// Sends a best-effort `Bye` and stops accepting traffic. The
    /// underlying socket is released when the `Connection` is dropped.
    pub fn close(&mut self) {
        if self.open.swap(false, Ordering::SeqCst) {
            debug!("closing connection to {}", self.player_info.name);
            let _ = self.tx.try_send(Frame::bye());
            if let Some(rx) = self.rx.as_mut() {
                rx.close();
            }
        }
    }
}
