//! # remuco-core
//!
//! Core library for the Remuco media-player remote-control client.
//!
//! This crate contains:
//! - **Protocol types**: `FrameHeader`, `Frame`, `Message`, `MessageFlags`
//! - **Protocol payloads**: Structured hello/player/control types
//! - **Codec**: `RemucoCodec` for framed TCP I/O via `tokio_util`
//! - **Network**: `Connection` — a duplex channel with keep-alive and
//!   closed-exactly-once semantics
//! - **Connector**: asynchronous negotiation with a one-shot completion
//!   signal (`Pending → Succeeded | Cancelled | Failed`)
//! - **Controller**: `CommController` — single owner of the session's
//!   active connection, idempotent disconnect
//! - **Player**: control surface and decoded event stream over an
//!   established session
//! - **Log view**: bounded, swappable line sink backing the UI log screen
//! - **Error**: `RemucoError` — typed, `thiserror`-based error hierarchy

pub mod codec;
pub mod connector;
pub mod controller;
pub mod error;
pub mod flags;
pub mod frame;
pub mod header;
pub mod logview;
pub mod message;
pub mod network;
pub mod player;
pub mod proto;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::RemucoCodec;
pub use connector::{ConnectOutcome, ConnectState, Connector, ConnectorOptions, ReturnCode};
pub use controller::CommController;
pub use error::RemucoError;
pub use flags::MessageFlags;
pub use frame::{Frame, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use header::{FrameHeader, HEADER_SIZE, MAGIC};
pub use logview::{ConsoleSink, LogSink, LogView, Logger};
pub use message::Message;
pub use network::{ConnectTarget, Connection};
pub use player::{Player, PlayerEvent};
pub use proto::{
    ClientInfo, ItemInfo, PROTO_VERSION, Playback, PlayerFeatures, PlayerInfo, PlayerState,
    Progress, RateRequest, SeekRequest, VolumeRequest,
};
