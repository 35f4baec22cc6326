//! Framed TCP codec for [`Frame`]s via `tokio_util`.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::RemucoError;
use crate::frame::{Frame, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
use crate::header::{FrameHeader, HEADER_SIZE};

/// Length-aware codec: buffers until a complete frame is available,
/// then parses and checksum-validates it.
#[derive(Debug, Default)]
pub struct RemucoCodec;

impl Decoder for RemucoCodec {
    type Item = Frame;
    type Error = RemucoError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        // Fixed-size slice; try_into cannot fail.
        let header = FrameHeader::from_bytes(src[0..HEADER_SIZE].try_into().unwrap())?;

        let payload_len = header.payload_len() as usize;
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(RemucoError::PayloadTooLarge {
                size: payload_len,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let frame_len = HEADER_SIZE + payload_len;
        if src.len() < frame_len {
            // Partial frame — wait for more bytes.
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let bytes = src.split_to(frame_len);
        let frame = Frame::from_bytes(&bytes)?;
        frame.validate()?;
        Ok(Some(frame))
    }
}

impl Encoder<Frame> for RemucoCodec {
    type Error = RemucoError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = item.to_bytes();
        if bytes.len() > MAX_FRAME_SIZE {
            return Err(RemucoError::FrameTooLarge {
                size: bytes.len(),
                max: MAX_FRAME_SIZE,
            });
        }
        dst.extend_from_slice(&bytes);
        Ok(())
    }
}
