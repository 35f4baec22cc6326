//! Player control payloads (client → host).
//!
//! Most controls are bare frames with no payload (`CtlPlayPause`,
//! `CtlNext`, `CtlPrev`, `CtlShuffle`); the ones defined here carry a
//! small parameter struct.

use serde::{Deserialize, Serialize};

use crate::error::RemucoError;
use crate::frame::Frame;
use crate::message::Message;

/// Seek to an absolute position within the current item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeekRequest {
    pub position_secs: u32,
}

impl SeekRequest {
    pub fn into_frame(self) -> Result<Frame, RemucoError> {
        let payload = bincode::serialize(&self).map_err(|e| RemucoError::Encoding(e.to_string()))?;
        Frame::new(Message::CtlSeek, payload)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RemucoError> {
        bincode::deserialize(bytes).map_err(|e| RemucoError::Encoding(e.to_string()))
    }
}

/// Set the player volume.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeRequest {
    /// Volume in percent, clamped to 0–100 by the constructor.
    pub percent: u32,
}

impl VolumeRequest {
    pub fn new(percent: u32) -> Self {
        Self {
            percent: percent.min(100),
        }
    }

    pub fn into_frame(self) -> Result<Frame, RemucoError> {
        let payload = bincode::serialize(&self).map_err(|e| RemucoError::Encoding(e.to_string()))?;
        Frame::new(Message::CtlVolume, payload)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RemucoError> {
        bincode::deserialize(bytes).map_err(|e| RemucoError::Encoding(e.to_string()))
    }
}

/// Rate the current item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateRequest {
    /// Rating value; the host validates it against its `max_rating`.
    pub rating: u32,
}

impl RateRequest {
    pub fn into_frame(self) -> Result<Frame, RemucoError> {
        let payload = bincode::serialize(&self).map_err(|e| RemucoError::Encoding(e.to_string()))?;
        Frame::new(Message::CtlRate, payload)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RemucoError> {
        bincode::deserialize(bytes).map_err(|e| RemucoError::Encoding(e.to_string()))
    }
}
