//! Wire frames — a header plus an opaque payload.
//!
//! Payloads are integrity-checked with a truncated blake3 hash stored in
//! the header. Empty payloads carry a zero checksum.

use crate::error::RemucoError;
use crate::flags::MessageFlags;
use crate::header::{FrameHeader, HEADER_SIZE};
use crate::message::Message;

/// Maximum payload carried by a single frame.
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024;

/// Maximum total frame size the codec will accept.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE;

/// A single protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: FrameHeader,
    payload: Vec<u8>,
}

/// First 4 bytes of the blake3 hash, little-endian.
fn payload_checksum(payload: &[u8]) -> u32 {
    let hash = blake3::hash(payload);
    u32::from_le_bytes(hash.as_bytes()[0..4].try_into().unwrap())
}

impl Frame {
    /// Build a frame for `message` with the given payload.
    pub fn new(message: Message, payload: Vec<u8>) -> Result<Self, RemucoError> {
        Self::with_flags(message, MessageFlags::empty(), payload)
    }

    /// Build a frame with explicit header flags.
    pub fn with_flags(
        message: Message,
        flags: MessageFlags,
        payload: Vec<u8>,
    ) -> Result<Self, RemucoError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(RemucoError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let checksum = if payload.is_empty() {
            0
        } else {
            payload_checksum(&payload)
        };

        Ok(Self {
            header: FrameHeader::new(checksum, message, flags, payload.len() as u32),
            payload,
        })
    }

    /// An empty keep-alive frame.
    pub fn ping() -> Self {
        // Empty payload is always within bounds.
        Self::new(Message::Ping, Vec::new()).unwrap()
    }

    /// An empty graceful-close frame.
    pub fn bye() -> Self {
        Self::new(Message::Bye, Vec::new()).unwrap()
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn message(&self) -> Result<Message, RemucoError> {
        self.header.message()
    }

    pub fn flags(&self) -> MessageFlags {
        self.header.flags()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Serialize header + payload into one buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        buf.extend_from_slice(&self.header.to_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Parse a complete frame from `bytes`.
    ///
    /// The slice must contain exactly one frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RemucoError> {
        if bytes.len() < HEADER_SIZE {
            return Err(RemucoError::InvalidHeader("truncated header"));
        }
        // Fixed-size slice; try_into cannot fail.
        let header = FrameHeader::from_bytes(bytes[0..HEADER_SIZE].try_into().unwrap())?;

        let expected = HEADER_SIZE + header.payload_len() as usize;
        if bytes.len() != expected {
            return Err(RemucoError::InvalidHeader(
                "frame length disagrees with header",
            ));
        }
        if header.payload_len() as usize > MAX_PAYLOAD_SIZE {
            return Err(RemucoError::PayloadTooLarge {
                size: header.payload_len() as usize,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let payload = bytes[HEADER_SIZE..].to_vec();
        Ok(Self { header, payload })
    }

    /// Verify the payload against the header checksum.
    ///
    /// Empty payloads always validate.
    pub fn validate(&self) -> Result<(), RemucoError> {
        if self.payload.is_empty() {
            return Ok(());
        }
        if self.header.checksum() != payload_checksum(&self.payload) {
            return Err(RemucoError::ChecksumMismatch);
        }
        Ok(())
    }
}
