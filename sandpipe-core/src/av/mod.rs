//! Audio/Video bridges for sandpipe-core.
//!
//! This module implements the "synchronous driver on an asynchronous host"
//! model:
//!
//! - Video: the application writes into a plain frame buffer and calls
//!   `update`. A self-re-arming flush loop, driven entirely by host
//!   completion callbacks, keeps compositing whatever the last `update` left
//!   in the fixed-size composite image. The two sides meet only in a short
//!   memory-copy critical section.
//!
//! - Audio: the host pulls fixed-size sample blocks from its audio thread.
//!   While the device is open and a producer is attached, the block is
//!   silence-prefilled and the producer fills it under the state lock;
//!   otherwise the block is served as silence. Playback starts at bridge
//!   construction and never stops from this layer.
//!
//! Notes / limitations:
//! - The composite image format is fixed: packed 32-bit words, alpha in the
//!   most significant byte, premultiplied as far as the host cares.
//! - The audio format is fixed: interleaved stereo i16 little-endian at
//!   44100 Hz, block size host-recommended.

pub mod audio;
pub mod video;

pub use audio::AudioBridge;
pub use video::DisplayBridge;

/// Errors from AV operations.
#[derive(Debug)]
pub enum VideoError {
    /// A pixel buffer could not be allocated for the requested mode.
    BufferAlloc { bytes: usize },
}

impl core::fmt::Display for VideoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VideoError::BufferAlloc { bytes } => {
                write!(f, "couldn't allocate buffer for requested mode ({bytes} bytes)")
            }
        }
    }
}

impl std::error::Error for VideoError {}
