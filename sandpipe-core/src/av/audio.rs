//! Audio callback bridge.
//!
//! Responsibilities:
//! - Start host playback once, at bridge construction, because that runs on
//!   the only thread the host lets playback start from. Until the device is
//!   opened, every pulled block is silence.
//! - Serve each host block request from the registered producer while the
//!   device is open; serve silence otherwise.
//! - Implement the audio half of the driver contract ([`AudioBackend`]).
//!
//! Notes / constraints:
//! - The block render path never allocates and never blocks beyond the short
//!   state lock; audio-thread deadlines are hard.
//! - The format is dictated, not negotiated: 44100 Hz interleaved stereo i16
//!   little-endian, block size host-recommended. `open` overwrites whatever
//!   the application asked for.
//! - `close` only flips the open flag. Stopping playback would need the
//!   privileged thread, so the host keeps pulling blocks; it gets silence.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::PluginContext;
use crate::driver::{AudioBackend, AudioSpec, SampleProducer};
use crate::host::AudioConfig;

/// Fixed sample rate, Hz.
pub const SAMPLE_RATE: u32 = 44_100;
/// Block size requested from the host, in frames. The host's recommendation
/// call may adjust it; the adjusted value is what the callback delivers.
pub const REQUESTED_FRAME_COUNT: u32 = 4096;
/// Channels per frame (interleaved stereo).
pub const CHANNELS: u32 = 2;

/// Silence for signed 16-bit PCM.
const SILENCE: u8 = 0x00;

const BYTES_PER_FRAME: usize = CHANNELS as usize * 2;

/// State shared between the application thread (open/close) and the host
/// audio thread (block requests). One lock, held briefly on both sides.
struct BridgeState {
    open: bool,
    producer: Option<SampleProducer>,
}

/// Fill one host block. Silence-prefills, then hands the block to the
/// producer exactly once while the device is open, so a partial fill still
/// leaves valid samples. Runs on the host audio thread.
fn render_block(state: &Mutex<BridgeState>, block: &mut [u8]) {
    let mut st = state.lock();
    block.fill(SILENCE);
    if !st.open {
        return;
    }
    if let Some(producer) = st.producer.as_mut() {
        producer(block);
    }
}

/// The audio bridge. Construct one per plugin context; the hosted library
/// drives it through [`AudioBackend`] from the application thread.
pub struct AudioBridge {
    state: Arc<Mutex<BridgeState>>,
    frame_count: u32,
    block_len: usize,
}

impl AudioBridge {
    /// Create the bridge and start playback immediately. A refusal by the
    /// host is logged and non-fatal: the bridge works, its callback just
    /// never runs.
    pub fn new(ctx: &PluginContext) -> Self {
        let frame_count = ctx
            .host()
            .recommend_frame_count(SAMPLE_RATE, REQUESTED_FRAME_COUNT);
        let block_len = frame_count as usize * BYTES_PER_FRAME;

        let state = Arc::new(Mutex::new(BridgeState {
            open: false,
            producer: None,
        }));

        let pump_state = Arc::clone(&state);
        let started = ctx.host().start_playback(
            AudioConfig {
                sample_rate: SAMPLE_RATE,
                frame_count,
            },
            Box::new(move |block| render_block(&pump_state, block)),
        );
        if !started {
            log::warn!("host refused to start audio playback; blocks will never be pulled");
        }

        Self {
            state,
            frame_count,
            block_len,
        }
    }

    /// Frames per block, as recommended by the host.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Bytes per block.
    pub fn block_len(&self) -> usize {
        self.block_len
    }
}

impl AudioBackend for AudioBridge {
    fn open(&mut self, requested: &mut AudioSpec, producer: SampleProducer) {
        // We don't care what the application asked for; the host dictates.
        requested.sample_rate = SAMPLE_RATE;
        requested.channels = CHANNELS;
        requested.frames = self.frame_count;
        requested.block_len = self.block_len;

        let mut st = self.state.lock();
        st.producer = Some(producer);
        st.open = true;
    }

    fn close(&mut self) {
        self.state.lock().open = false;
    }
}

impl Drop for AudioBridge {
    fn drop(&mut self) {
        // Full teardown reclaims the producer as well. The host-side pump
        // closure keeps its own handle on the state and serves silence from
        // here on.
        let mut st = self.state.lock();
        st.open = false;
        st.producer = None;
    }
}
