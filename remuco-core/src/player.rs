//! The player session bound to an open connection.
//!
//! Exposes the simple control surface (play/pause, next, previous,
//! seek, volume, rating, shuffle) and decodes the host's sync stream
//! into [`PlayerEvent`]s for the UI.
//!
//! The [`Connection`] itself stays owned by the session's
//! `CommController`; a `Player` is built from handles handed off by
//! the connection, so dropping the player never tears down the
//! channel and disconnecting still goes through the controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::RemucoError;
use crate::frame::Frame;
use crate::message::Message;
use crate::network::Connection;
use crate::proto::{
    ItemInfo, PlayerFeatures, PlayerInfo, PlayerState, Progress, RateRequest, SeekRequest,
    VolumeRequest,
};

// ── PlayerEvent ──────────────────────────────────────────────────

/// Decoded host → client updates.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    State(PlayerState),
    Item(ItemInfo),
    Progress(Progress),
}

// ── Player ───────────────────────────────────────────────────────

/// Control and event surface over an established session.
pub struct Player {
    info: PlayerInfo,
    control: mpsc::Sender<Frame>,
    events: mpsc::Receiver<Frame>,
    open: Arc<AtomicBool>,
}

impl Player {
    /// Bind a player session to an established connection.
    ///
    /// Fails if the connection's event stream was already handed out —
    /// a wiring bug, since a session builds exactly one player.
    pub fn bind(connection: &mut Connection) -> Result<Self, RemucoError> {
        let events = connection
            .take_events()
            .ok_or(RemucoError::Bug {
                tag: "player.bind: event stream already taken",
            })?;
        Ok(Self {
            info: connection.player_info().clone(),
            control: connection.sender(),
            events,
            open: connection.open_handle(),
        })
    }

    /// The host's self-description from the handshake.
    pub fn info(&self) -> &PlayerInfo {
        &self.info
    }

    /// Whether the underlying connection is still open.
    pub fn is_connected(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    // ── Controls ──────────────────────────────────────────────────

    pub async fn play_pause(&self) -> Result<(), RemucoError> {
        self.ctl(PlayerFeatures::PLAYBACK, Frame::new(Message::CtlPlayPause, Vec::new())?)
            .await
    }

    pub async fn next(&self) -> Result<(), RemucoError> {
        self.ctl(PlayerFeatures::NEXT, Frame::new(Message::CtlNext, Vec::new())?)
            .await
    }

    pub async fn prev(&self) -> Result<(), RemucoError> {
        self.ctl(PlayerFeatures::PREV, Frame::new(Message::CtlPrev, Vec::new())?)
            .await
    }

    pub async fn toggle_shuffle(&self) -> Result<(), RemucoError> {
        self.ctl(
            PlayerFeatures::SHUFFLE,
            Frame::new(Message::CtlShuffle, Vec::new())?,
        )
        .await
    }

    pub async fn seek(&self, position_secs: u32) -> Result<(), RemucoError> {
        self.ctl(
            PlayerFeatures::SEEK,
            SeekRequest { position_secs }.into_frame()?,
        )
        .await
    }

    pub async fn set_volume(&self, percent: u32) -> Result<(), RemucoError> {
        self.ctl(
            PlayerFeatures::VOLUME,
            VolumeRequest::new(percent).into_frame()?,
        )
        .await
    }

    pub async fn rate(&self, rating: u32) -> Result<(), RemucoError> {
        self.ctl(PlayerFeatures::RATE, RateRequest { rating }.into_frame()?)
            .await
    }

    /// Send a control frame, skipping features the host never
    /// advertised (the UI greys those out; this is the backstop).
    async fn ctl(&self, required: PlayerFeatures, frame: Frame) -> Result<(), RemucoError> {
        if !self.info.features.contains(required) {
            debug!("{} does not support {required:?}", self.info.name);
            return Ok(());
        }
        if !self.is_connected() {
            return Err(RemucoError::ConnectionClosed);
        }
        self.control.send(frame).await?;
        Ok(())
    }

    // ── Events ────────────────────────────────────────────────────

    /// Await the next decoded host update.
    ///
    /// Keep-alive pings are skipped; a frame that fails to decode is
    /// logged and skipped rather than ending the session. Returns
    /// `None` once the connection is gone.
    pub async fn next_event(&mut self) -> Option<PlayerEvent> {
        loop {
            let frame = self.events.recv().await?;
            match self.decode(&frame) {
                Ok(Some(event)) => return Some(event),
                Ok(None) => continue,
                Err(e) => {
                    warn!("dropping undecodable frame: {e}");
                    continue;
                }
            }
        }
    }

    fn decode(&self, frame: &Frame) -> Result<Option<PlayerEvent>, RemucoError> {
        match frame.message()? {
            Message::StateSync => Ok(Some(PlayerEvent::State(PlayerState::from_bytes(
                frame.payload(),
            )?))),
            Message::ItemSync => Ok(Some(PlayerEvent::Item(ItemInfo::from_bytes(
                frame.payload(),
            )?))),
            Message::ProgressSync => Ok(Some(PlayerEvent::Progress(Progress::from_bytes(
                frame.payload(),
            )?))),
            Message::Ping | Message::Bye => Ok(None),
            other => {
                let bug = RemucoError::Bug {
                    tag: "player.decode: unexpected message from host",
                };
                warn!("{bug} ({other})");
                Err(bug)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::Playback;
    use std::time::Duration;
    use tokio::net::{TcpListener, TcpStream};
    use tokio_util::codec::Framed;

    use crate::codec::RemucoCodec;
    use futures::SinkExt;

    fn host_info() -> PlayerInfo {
        PlayerInfo {
            proto_version: crate::proto::PROTO_VERSION,
            name: "test player".to_string(),
            features: PlayerFeatures::PLAYBACK | PlayerFeatures::NEXT,
            max_rating: 5,
        }
    }

    /// A connected (client Connection, host framed stream) pair.
    async fn session_pair() -> (Connection, Framed<TcpStream, RemucoCodec>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let (host_stream, _) = listener.accept().await.unwrap();
        let client_stream = client.await.unwrap();

        let conn = Connection::new(client_stream, host_info(), Duration::from_secs(60));
        (conn, Framed::new(host_stream, RemucoCodec))
    }

    #[tokio::test]
    async fn bind_twice_is_a_bug() {
        let (mut conn, _host) = session_pair().await;
        let _player = Player::bind(&mut conn).unwrap();
        assert!(matches!(
            Player::bind(&mut conn),
            Err(RemucoError::Bug { .. })
        ));
    }

    #[tokio::test]
    async fn state_sync_is_decoded() {
        let (mut conn, mut host) = session_pair().await;
        let mut player = Player::bind(&mut conn).unwrap();

        let state = PlayerState {
            playback: Playback::Playing,
            volume: 42,
            shuffle: false,
            repeat: true,
        };
        host.send(state.clone().into_frame().unwrap()).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), player.next_event())
            .await
            .expect("timeout")
            .expect("stream ended");
        assert_eq!(event, PlayerEvent::State(state));
    }

    #[tokio::test]
    async fn pings_are_skipped() {
        let (mut conn, mut host) = session_pair().await;
        let mut player = Player::bind(&mut conn).unwrap();

        host.send(Frame::ping()).await.unwrap();
        let item = ItemInfo {
            id: "7".into(),
            title: "t".into(),
            artist: "a".into(),
            album: "b".into(),
        };
        host.send(item.clone().into_frame().unwrap()).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), player.next_event())
            .await
            .expect("timeout")
            .expect("stream ended");
        assert_eq!(event, PlayerEvent::Item(item));
    }

    #[tokio::test]
    async fn unsupported_control_is_skipped() {
        let (mut conn, _host) = session_pair().await;
        let player = Player::bind(&mut conn).unwrap();

        // SEEK was not advertised by host_info(); the call is a no-op.
        player.seek(10).await.unwrap();
    }
}
