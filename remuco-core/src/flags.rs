//! Frame header flag bits.

use bitflags::bitflags;

bitflags! {
    /// Flags carried in every frame header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MessageFlags: u32 {
        /// Set on unsolicited host → client sync messages that are part
        /// of a continuous update stream (state, item, progress).
        const STREAMING = 0b0001;
    }
}

impl Default for MessageFlags {
    fn default() -> Self {
        MessageFlags::empty()
    }
}
