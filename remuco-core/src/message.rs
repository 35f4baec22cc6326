//! Protocol message identifiers.
//!
//! Uses proper enums with `TryFrom` — no panics on unknown values.

use crate::error::RemucoError;
use std::fmt;

// ── Message ──────────────────────────────────────────────────────

/// All messages understood by the Remuco client protocol.
///
/// Organized by category:
/// - `0x0001..0x00FF` — Session-level (handshake, keep-alive, close)
/// - `0x0100..0x01FF` — Player controls (client → host)
/// - `0x0200..0x02FF` — State synchronization (host → client)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    // ── Session (0x00xx) ─────────────────────────────────────────
    /// Client greeting; payload is `ClientInfo`.
    Hello = 0x0001,
    /// Host reply to `Hello`; payload is `PlayerInfo`.
    Welcome = 0x0002,
    /// Graceful disconnect, either direction.
    Bye = 0x0003,
    /// Keep-alive ping.
    Ping = 0x0004,

    // ── Controls (0x01xx) ────────────────────────────────────────
    /// Toggle between playing and paused.
    CtlPlayPause = 0x0101,
    /// Skip to the next item.
    CtlNext = 0x0102,
    /// Skip to the previous item.
    CtlPrev = 0x0103,
    /// Seek within the current item; payload is `SeekRequest`.
    CtlSeek = 0x0104,
    /// Change the volume; payload is `VolumeRequest`.
    CtlVolume = 0x0105,
    /// Rate the current item; payload is `RateRequest`.
    CtlRate = 0x0106,
    /// Toggle shuffle mode.
    CtlShuffle = 0x0107,

    // ── Sync (0x02xx) ────────────────────────────────────────────
    /// Playback state update; payload is `PlayerState`.
    StateSync = 0x0201,
    /// Current item update; payload is `ItemInfo`.
    ItemSync = 0x0202,
    /// Playback progress update; payload is `Progress`.
    ProgressSync = 0x0203,
}

impl TryFrom<u32> for Message {
    type Error = RemucoError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0x0001 => Ok(Message::Hello),
            0x0002 => Ok(Message::Welcome),
            0x0003 => Ok(Message::Bye),
            0x0004 => Ok(Message::Ping),

            0x0101 => Ok(Message::CtlPlayPause),
            0x0102 => Ok(Message::CtlNext),
            0x0103 => Ok(Message::CtlPrev),
            0x0104 => Ok(Message::CtlSeek),
            0x0105 => Ok(Message::CtlVolume),
            0x0106 => Ok(Message::CtlRate),
            0x0107 => Ok(Message::CtlShuffle),

            0x0201 => Ok(Message::StateSync),
            0x0202 => Ok(Message::ItemSync),
            0x0203 => Ok(Message::ProgressSync),

            _ => Err(RemucoError::UnknownVariant {
                type_name: "Message",
                value: value as u64,
            }),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Message {
    /// Returns `true` for unsolicited host → client stream updates.
    pub fn is_sync(&self) -> bool {
        matches!(
            self,
            Message::StateSync | Message::ItemSync | Message::ProgressSync
        )
    }

    /// Returns `true` if this message expects a reply from the peer.
    ///
    /// Only `Hello` does — everything else is fire-and-forget.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Message::Hello)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_roundtrip() {
        let msgs = [
            Message::Hello,
            Message::Welcome,
            Message::Bye,
            Message::Ping,
            Message::CtlPlayPause,
            Message::CtlNext,
            Message::CtlPrev,
            Message::CtlSeek,
            Message::CtlVolume,
            Message::CtlRate,
            Message::CtlShuffle,
            Message::StateSync,
            Message::ItemSync,
            Message::ProgressSync,
        ];
        for msg in msgs {
            assert_eq!(Message::try_from(msg as u32).unwrap(), msg);
        }
    }

    #[test]
    fn message_invalid() {
        assert!(Message::try_from(0xDEAD).is_err());
    }

    #[test]
    fn sync_classification() {
        assert!(Message::StateSync.is_sync());
        assert!(Message::ProgressSync.is_sync());
        assert!(!Message::Hello.is_sync());
        assert!(!Message::CtlNext.is_sync());
    }

    #[test]
    fn only_hello_expects_reply() {
        assert!(Message::Hello.expects_reply());
        assert!(!Message::Ping.expects_reply());
        assert!(!Message::CtlPlayPause.expects_reply());
    }
}
