//! Player description and state payloads.
//!
//! # Wire Protocol
//!
//! ```text
//! Host ──[StateSync + STREAMING]─────────────► Client   (repeated)
//!   Payload: PlayerState (bincode)
//!
//! Host ──[ItemSync + STREAMING]──────────────► Client   (on change)
//!   Payload: ItemInfo (bincode)
//!
//! Host ──[ProgressSync + STREAMING]──────────► Client   (periodic)
//!   Payload: Progress (bincode)
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::RemucoError;
use crate::flags::MessageFlags;
use crate::frame::Frame;
use crate::message::Message;

bitflags! {
    /// Features a player adapter advertises during the handshake.
    ///
    /// The client greys out controls whose feature bit is absent.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PlayerFeatures: u32 {
        const PLAYBACK = 1 << 0;
        const VOLUME   = 1 << 1;
        const SEEK     = 1 << 2;
        const RATE     = 1 << 3;
        const SHUFFLE  = 1 << 4;
        const REPEAT   = 1 << 5;
        const NEXT     = 1 << 6;
        const PREV     = 1 << 7;
    }
}

// ── PlayerInfo ───────────────────────────────────────────────────

/// Host self-description sent as the `Welcome` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerInfo {
    /// Protocol version the host speaks.
    pub proto_version: u32,

    /// Human-readable player name ("Rhythmbox", "Winamp", …).
    pub name: String,

    /// Features this player supports.
    pub features: PlayerFeatures,

    /// Maximum rating value (0 = rating unsupported).
    pub max_rating: u32,
}

impl PlayerInfo {
    pub fn to_bytes(&self) -> Result<Vec<u8>, RemucoError> {
        bincode::serialize(self).map_err(|e| RemucoError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RemucoError> {
        bincode::deserialize(bytes).map_err(|e| RemucoError::Encoding(e.to_string()))
    }

    /// Build the `Welcome` frame answering a `Hello`.
    pub fn into_frame(self) -> Result<Frame, RemucoError> {
        let payload = self.to_bytes()?;
        Frame::new(Message::Welcome, payload)
    }
}

// ── PlayerState ──────────────────────────────────────────────────

/// Coarse playback state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Playback {
    #[default]
    Stopped,
    Paused,
    Playing,
}

/// A full playback state snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PlayerState {
    pub playback: Playback,
    /// Volume in percent (0–100).
    pub volume: u32,
    pub shuffle: bool,
    pub repeat: bool,
}

impl PlayerState {
    pub fn to_bytes(&self) -> Result<Vec<u8>, RemucoError> {
        bincode::serialize(self).map_err(|e| RemucoError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RemucoError> {
        bincode::deserialize(bytes).map_err(|e| RemucoError::Encoding(e.to_string()))
    }

    /// Build a streaming `StateSync` frame.
    pub fn into_frame(self) -> Result<Frame, RemucoError> {
        let payload = self.to_bytes()?;
        Frame::with_flags(Message::StateSync, MessageFlags::STREAMING, payload)
    }
}

// ── ItemInfo ─────────────────────────────────────────────────────

/// Metadata of the item currently loaded in the player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ItemInfo {
    /// Player-assigned item id.
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl ItemInfo {
    pub fn to_bytes(&self) -> Result<Vec<u8>, RemucoError> {
        bincode::serialize(self).map_err(|e| RemucoError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RemucoError> {
        bincode::deserialize(bytes).map_err(|e| RemucoError::Encoding(e.to_string()))
    }

    /// Build a streaming `ItemSync` frame.
    pub fn into_frame(self) -> Result<Frame, RemucoError> {
        let payload = self.to_bytes()?;
        Frame::with_flags(Message::ItemSync, MessageFlags::STREAMING, payload)
    }
}

// ── Progress ─────────────────────────────────────────────────────

/// Playback position within the current item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Progress {
    pub position_secs: u32,
    /// Item length; 0 when unknown (e.g. a live stream).
    pub length_secs: u32,
}

impl Progress {
    pub fn to_bytes(&self) -> Result<Vec<u8>, RemucoError> {
        bincode::serialize(self).map_err(|e| RemucoError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RemucoError> {
        bincode::deserialize(bytes).map_err(|e| RemucoError::Encoding(e.to_string()))
    }

    /// Build a streaming `ProgressSync` frame.
    pub fn into_frame(self) -> Result<Frame, RemucoError> {
        let payload = self.to_bytes()?;
        Frame::with_flags(Message::ProgressSync, MessageFlags::STREAMING, payload)
    }
}
