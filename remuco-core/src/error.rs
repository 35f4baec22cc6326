//! Domain-specific error types for the Remuco client protocol.
//!
//! All fallible operations return `Result<T, RemucoError>`.
//! No panics on invalid input — every error is typed and recoverable.

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for the Remuco client protocol.
#[derive(Debug, Error)]
pub enum RemucoError {
    // ── Protocol Errors ──────────────────────────────────────────
    /// Received bytes that do not start with the RMC0 magic sequence.
    #[error("invalid magic bytes: expected RMC0")]
    InvalidMagic,

    /// A field in the frame header could not be parsed.
    #[error("invalid header: {0}")]
    InvalidHeader(&'static str),

    /// The frame payload failed checksum verification.
    #[error("checksum mismatch")]
    ChecksumMismatch,

    /// A numeric value did not map to any known enum variant.
    #[error("unknown {type_name} discriminant: {value:#x}")]
    UnknownVariant { type_name: &'static str, value: u64 },

    /// The protocol version offered by the host is not supported.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u32),

    /// A message violated protocol rules.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),

    // ── Frame Errors ─────────────────────────────────────────────
    /// The payload exceeds the configured maximum size.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Frame size exceeded the codec limit.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    // ── Connection Errors ────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// An mpsc channel was closed unexpectedly.
    #[error("channel closed")]
    ChannelClosed,

    /// The connection has been closed and cannot be used again.
    #[error("connection closed")]
    ConnectionClosed,

    /// An operation exceeded its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// Connection negotiation was cancelled by the user.
    #[error("negotiation cancelled")]
    Cancelled,

    // ── Serialization Errors ─────────────────────────────────────
    /// Encoding or decoding of a payload failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// UTF-8 conversion failed.
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    // ── Configuration Errors ─────────────────────────────────────
    /// The connect target could not be built from configuration.
    #[error("bad configuration: {0}")]
    Config(String),

    // ── Wiring Bugs ──────────────────────────────────────────────
    /// An internal invariant was violated. Logged once where first
    /// observed; execution continues with a safe default.
    #[error("[BUG] {tag}")]
    Bug { tag: &'static str },
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for RemucoError {
    fn from(s: String) -> Self {
        RemucoError::Encoding(s)
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for RemucoError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        RemucoError::ChannelClosed
    }
}

impl From<Box<bincode::ErrorKind>> for RemucoError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        RemucoError::Encoding(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = RemucoError::InvalidMagic;
        assert!(e.to_string().contains("magic"));

        let e = RemucoError::PayloadTooLarge {
            size: 1000,
            max: 500,
        };
        assert!(e.to_string().contains("1000"));
        assert!(e.to_string().contains("500"));
    }

    #[test]
    fn bug_display_carries_tag() {
        let e = RemucoError::Bug {
            tag: "controller.attach",
        };
        assert_eq!(e.to_string(), "[BUG] controller.attach");
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broke");
        let e: RemucoError = io_err.into();
        assert!(matches!(e, RemucoError::Connection(_)));
    }

    #[test]
    fn from_bincode() {
        let err: Box<bincode::ErrorKind> =
            Box::new(bincode::ErrorKind::Custom("nope".to_string()));
        let e: RemucoError = err.into();
        assert!(matches!(e, RemucoError::Encoding(_)));
    }
}
