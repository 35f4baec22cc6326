//! Session handshake payloads.
//!
//! # Wire Protocol
//!
//! ```text
//! Client ──[Hello]───────────────────────────► Host
//!   Payload: ClientInfo (bincode)
//!
//! Host   ──[Welcome]─────────────────────────► Client
//!   Payload: PlayerInfo (bincode)
//! ```
//!
//! A `Welcome` carrying a different `proto_version` than the client's
//! is a negotiation failure, reported before any other traffic.

use serde::{Deserialize, Serialize};

use crate::error::RemucoError;
use crate::frame::Frame;
use crate::message::Message;

/// Protocol version spoken by this client.
pub const PROTO_VERSION: u32 = 1;

/// Client self-description sent as the `Hello` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientInfo {
    /// Protocol version the client speaks.
    pub proto_version: u32,

    /// Text encodings the client can render, in preference order.
    pub encodings: Vec<String>,

    /// Preferred cover-art edge length in pixels (0 = no images).
    pub image_size: u32,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            proto_version: PROTO_VERSION,
            encodings: vec!["UTF-8".to_string(), "ISO-8859-1".to_string()],
            image_size: 0,
        }
    }
}

impl ClientInfo {
    pub fn to_bytes(&self) -> Result<Vec<u8>, RemucoError> {
        bincode::serialize(self).map_err(|e| RemucoError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RemucoError> {
        bincode::deserialize(bytes).map_err(|e| RemucoError::Encoding(e.to_string()))
    }

    /// Build the `Hello` frame opening the handshake.
    pub fn into_frame(self) -> Result<Frame, RemucoError> {
        let payload = self.to_bytes()?;
        Frame::new(Message::Hello, payload)
    }
}
