//! Host-runtime boundary for sandpipe-core.
//!
//! Responsibilities:
//! - Define the surface the embedder (the plugin glue living inside the
//!   sandboxed host) must implement so the bridges can drive presentation and
//!   audio: [`HostInstance`] and [`Graphics2d`].
//! - Define the callback types that cross the host boundary: [`FlushDone`]
//!   for flush completions and [`AudioPump`] for per-block audio requests.
//!
//! Notes / constraints:
//! - `flush` is fire-and-forget: the host must signal completion *after* the
//!   call returns, from its own thread. The bridges rely on that to keep the
//!   "exactly one outstanding flush" invariant without ever holding a lock
//!   across the call.
//! - `paint` is a plain memory copy into host-side staging. Callers may hold
//!   locks across it; hosts must not block in it.
//! - All of these cross threads, hence the `Send + Sync` bounds and the
//!   `Send` closures.

use std::sync::Arc;

/// Completion callback for one flush request. Invoked exactly once by the
/// host, from its delivery thread, after the composite has been displayed.
pub type FlushDone = Box<dyn FnOnce() + Send + 'static>;

/// Per-block audio callback. The host calls this from its audio thread with
/// the block buffer to fill; the buffer length is always the negotiated block
/// size in bytes.
pub type AudioPump = Box<dyn FnMut(&mut [u8]) + Send + 'static>;

/// Playback configuration handed to [`HostInstance::start_playback`].
///
/// The frame count is the host-recommended value obtained from
/// [`HostInstance::recommend_frame_count`], not the requested one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per callback block (one frame = one sample per channel).
    pub frame_count: u32,
}

/// A host 2D surface: the target of the presentation pipeline's flush loop.
pub trait Graphics2d: Send + Sync {
    /// Copy `pixels` into the surface's staging image.
    ///
    /// One packed 32-bit word per pixel, alpha in the most significant byte,
    /// row-major at the dimensions the surface was created with. Memory copy
    /// only; must not block or call back into the bridge.
    fn paint(&self, pixels: &[u32]);

    /// Ask the host to composite and display the last painted image.
    ///
    /// Must not invoke `done` before returning; completion is signaled later
    /// from the host's delivery thread.
    fn flush(&self, done: FlushDone);
}

/// One plugin instance as seen from inside the sandbox.
///
/// Implemented by the embedder over whatever the real host hands it. All
/// methods are called from the application thread during bridge construction.
pub trait HostInstance: Send + Sync {
    /// Create a 2D surface at the given fixed dimensions.
    fn create_surface(&self, width: u32, height: u32) -> Arc<dyn Graphics2d>;

    /// Bind `surface` as this instance's displayed surface. Returns false if
    /// the host refuses the binding; the caller treats that as non-fatal.
    fn bind_surface(&self, surface: &Arc<dyn Graphics2d>) -> bool;

    /// Ask the host to adjust a requested per-block frame count to whatever
    /// it can actually deliver at `sample_rate`.
    fn recommend_frame_count(&self, sample_rate: u32, requested_frames: u32) -> u32;

    /// Start continuous playback. The host will invoke `pump` once per block
    /// from its audio thread until the process ends; there is no stop call at
    /// this layer. Returns false if the host refuses to start.
    fn start_playback(&self, config: AudioConfig, pump: AudioPump) -> bool;
}
