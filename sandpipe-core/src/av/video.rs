//! Presentation pipeline: application frame buffer in, host composite out.
//!
//! Responsibilities:
//! - Own the frame buffer the application draws into (reallocated per
//!   mode-set) and the fixed-size composite image shared with the flush loop.
//! - Run the flush loop: paint the composite into the host surface under the
//!   shared lock, re-arm from the completion callback, stop at the liveness
//!   flag once teardown begins.
//! - Implement the display half of the driver contract ([`DisplayBackend`]).
//!
//! Notes / constraints:
//! - Exactly one flush is outstanding at any time. The first is issued at
//!   construction; after that, only a completion callback issues the next.
//! - The composite lock is held across memory copies only (the paint, the
//!   present copy), never across the asynchronous flush call itself.
//! - The host surface handle is owned by the continuation chain; when the
//!   loop observes teardown and declines to re-arm, the last clones drop.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::context::PluginContext;
use crate::driver::{ColorDepth, DisplayBackend, EventSink, ModeInfo, Rgb};
use crate::host::Graphics2d;
use crate::input::{self, EventQueue};

use super::VideoError;

/// How long `update` waits for the composite lock before skipping the copy.
/// The contended section is a memory copy, so the realistic wait is
/// microseconds; reaching this bound means the host has wedged, and the
/// skipped frame is indistinguishable from a coalesced one.
const PRESENT_LOCK_WAIT: Duration = Duration::from_millis(10);

const OPAQUE_BLACK: u32 = 0xFF00_0000;

/// State shared between `update` and the flush continuation.
struct CompositeState {
    /// Flipped to false when teardown begins. Checked first, under this same
    /// lock, by every continuation invocation.
    live: bool,
    /// The composite image: one packed word per output pixel, dimensions
    /// fixed at construction. Emptied at teardown.
    pixels: Vec<u32>,
}

/// One step of the steady presentation loop: paint the current composite
/// into the host surface, then ask for the next flush. Re-armed exclusively
/// by the host's completion callback.
fn pump_composite(surface: &Arc<dyn Graphics2d>, state: &Arc<Mutex<CompositeState>>) {
    {
        let st = state.lock();
        if !st.live {
            // Teardown has begun; this was the last invocation.
            return;
        }
        surface.paint(&st.pixels);
    }

    // Lock released above: the flush round-trip must never contend with
    // `update`, only the copy does.
    let surface_next = Arc::clone(surface);
    let state_next = Arc::clone(state);
    surface.flush(Box::new(move || pump_composite(&surface_next, &state_next)));
}

/// The display bridge. Construct one per plugin context; the hosted library
/// drives it through [`DisplayBackend`] from the application thread.
pub struct DisplayBridge {
    composite: Arc<Mutex<CompositeState>>,
    events: Arc<EventQueue>,
    out_width: u32,
    out_height: u32,
    /// Application frame buffer; empty until the first `set_mode`.
    frame: Vec<u8>,
    mode: Option<ModeInfo>,
    /// Prepacked palette words; unset entries read as opaque black.
    palette: [u32; 256],
}

impl DisplayBridge {
    /// Create the bridge: allocate the composite image at the fixed output
    /// size, create and bind the host surface, and issue the first flush.
    ///
    /// A bind refusal is logged and non-fatal: the loop still runs, the host
    /// just never shows its output.
    pub fn new(ctx: &PluginContext) -> Result<Self, VideoError> {
        let (width, height) = ctx.output_size();
        let pixel_count = width as usize * height as usize;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(pixel_count).map_err(|_| VideoError::BufferAlloc {
            bytes: pixel_count * 4,
        })?;
        pixels.resize(pixel_count, 0);

        let surface = ctx.host().create_surface(width, height);
        if !ctx.host().bind_surface(&surface) {
            log::warn!("couldn't bind the drawing surface; output will never update");
        }

        let composite = Arc::new(Mutex::new(CompositeState { live: true, pixels }));

        // Start the steady loop. Every later flush is issued from inside a
        // completion callback.
        pump_composite(&surface, &composite);

        Ok(Self {
            composite,
            events: Arc::clone(ctx.events()),
            out_width: width,
            out_height: height,
            frame: Vec::new(),
            mode: None,
            palette: [OPAQUE_BLACK; 256],
        })
    }

    /// Copy the frame buffer into the composite, row by row over the
    /// intersection of the two sizes, converting per the current depth.
    fn copy_into(&self, mode: ModeInfo, pixels: &mut [u32]) {
        let copy_w = mode.width.min(self.out_width) as usize;
        let copy_h = mode.height.min(self.out_height) as usize;
        let out_w = self.out_width as usize;

        match mode.depth {
            ColorDepth::Indexed8 => {
                for y in 0..copy_h {
                    let src = &self.frame[y * mode.pitch..][..copy_w];
                    let dst = &mut pixels[y * out_w..][..copy_w];
                    for (px, &index) in dst.iter_mut().zip(src) {
                        *px = self.palette[index as usize];
                    }
                }
            }
            ColorDepth::Argb32 => {
                for y in 0..copy_h {
                    let src = &self.frame[y * mode.pitch..][..copy_w * 4];
                    let dst = &mut pixels[y * out_w..][..copy_w];
                    for (px, word) in dst.iter_mut().zip(src.chunks_exact(4)) {
                        *px = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
                    }
                }
            }
        }
    }
}

impl DisplayBackend for DisplayBridge {
    fn init(&mut self) -> ModeInfo {
        log::info!(
            "display bridge initialized, {}x{} fixed output",
            self.out_width,
            self.out_height
        );

        // Default to an 8-bit indexed format; set_mode decides what actually
        // gets allocated.
        ModeInfo {
            width: self.out_width,
            height: self.out_height,
            depth: ColorDepth::Indexed8,
            pitch: self.out_width as usize,
        }
    }

    fn set_mode(
        &mut self,
        width: u32,
        height: u32,
        depth: ColorDepth,
    ) -> Result<ModeInfo, VideoError> {
        // Release the previous buffer before allocating the new one.
        self.frame = Vec::new();
        self.mode = None;

        let pitch = width as usize * depth.bytes_per_pixel();
        let bytes = pitch * height as usize;

        let mut frame = Vec::new();
        frame
            .try_reserve_exact(bytes)
            .map_err(|_| VideoError::BufferAlloc { bytes })?;
        frame.resize(bytes, 0);

        let info = ModeInfo {
            width,
            height,
            depth,
            pitch,
        };
        self.frame = frame;
        self.mode = Some(info);
        Ok(info)
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.frame
    }

    fn update(&mut self) {
        let Some(mode) = self.mode else {
            // No mode set yet; nothing to show.
            return;
        };

        let Some(mut st) = self.composite.try_lock_for(PRESENT_LOCK_WAIT) else {
            log::warn!("present skipped: composite lock unavailable for {PRESENT_LOCK_WAIT:?}");
            return;
        };
        if !st.live {
            return;
        }

        // Borrow the pixel vec out of the guard so `self` stays free for the
        // source buffer and palette.
        let CompositeState { pixels, .. } = &mut *st;
        self.copy_into(mode, pixels);
    }

    fn set_palette(&mut self, first: usize, colors: &[Rgb]) -> bool {
        let indexed = matches!(self.mode, Some(m) if m.depth == ColorDepth::Indexed8);
        if !indexed {
            log::warn!("palette update on a non-indexed mode; ignored");
            return false;
        }
        if first >= self.palette.len() {
            return false;
        }

        // Clamp to the table; the far end is simply not written.
        for (slot, c) in self.palette[first..].iter_mut().zip(colors) {
            *slot = OPAQUE_BLACK | (u32::from(c.r) << 16) | (u32::from(c.g) << 8) | u32::from(c.b);
        }
        true
    }

    fn pump_events(&mut self, sink: &mut dyn EventSink) {
        input::pump_events(&self.events, sink);
    }

    fn quit(&mut self) {
        {
            let mut st = self.composite.lock();
            st.live = false;
            // Release under the lock: an in-flight continuation either ran
            // before this (and painted a still-valid image) or runs after
            // (and sees the flag).
            st.pixels = Vec::new();
        }
        self.frame = Vec::new();
        self.mode = None;
    }
}

impl Drop for DisplayBridge {
    fn drop(&mut self) {
        self.quit();
    }
}
