//! Driver contract between sandpipe-core and the hosted multimedia library.
//!
//! This module defines both halves of that contract:
//!
//! - The **capability traits** the bridges implement and the hosted library's
//!   device registry consumes: [`DisplayBackend`] and [`AudioBackend`]. These
//!   replace the classic function-pointer device table (init / set-mode /
//!   update / quit / pump / keymap-init) with ordinary trait polymorphism.
//! - The **event sink** the hosted library implements to receive translated
//!   input: [`EventSink`].
//! - The **vocabulary types** shared across that seam: semantic keys and
//!   buttons, pixel mode descriptors, the audio spec.
//!
//! Notes:
//! - Everything here is host-agnostic; host-native codes stop at
//!   `crate::input`, which translates them before they reach an `EventSink`.
//! - The audio sample format is fixed: interleaved stereo, signed 16-bit
//!   little-endian. [`AudioSpec`] exists so the bridge can advertise the
//!   format it dictates, not so callers can request one.

use crate::av::VideoError;

/// Application-supplied audio producer. Invoked from the host's audio thread
/// with the block to fill; the block is silence-filled before each call, so a
/// partial fill leaves valid samples behind.
pub type SampleProducer = Box<dyn FnMut(&mut [u8]) + Send + 'static>;

/// Pressed/released state of a key or mouse button.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Semantic mouse buttons.
///
/// `Unknown` stands in for any host code outside the three standard buttons;
/// it is delivered, not dropped, so the consumer can decide what to do.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Unknown,
}

/// Semantic keys, in the hosted library's vocabulary.
///
/// Covers the ranges the translator maps: letters, digits, keypad, function
/// keys, and the fixed control/navigation/punctuation set. Everything else
/// arrives as `Unknown`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Kp0,
    Kp1,
    Kp2,
    Kp3,
    Kp4,
    Kp5,
    Kp6,
    Kp7,
    Kp8,
    Kp9,
    KpMultiply,
    KpPlus,
    KpMinus,
    KpPeriod,
    KpDivide,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Backspace,
    Tab,
    Return,
    Pause,
    Escape,
    Space,
    LShift,
    LCtrl,
    LAlt,
    PageUp,
    PageDown,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
    Insert,
    Delete,
    Semicolon,
    Equals,
    Comma,
    Minus,
    Period,
    Slash,
    Backquote,
    LeftBracket,
    Backslash,
    RightBracket,
    Quote,
    Unknown,
}

/// An RGB triple as registered through [`DisplayBackend::set_palette`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Channel masks of a packed 32-bit pixel word.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PixelLayout {
    pub r_mask: u32,
    pub g_mask: u32,
    pub b_mask: u32,
    pub a_mask: u32,
}

/// The one direct-color layout this bridge produces and consumes: alpha in
/// the most significant byte, then red, green, blue. Words are stored
/// little-endian in the frame buffer.
pub const ARGB8888: PixelLayout = PixelLayout {
    r_mask: 0x00FF_0000,
    g_mask: 0x0000_FF00,
    b_mask: 0x0000_00FF,
    a_mask: 0xFF00_0000,
};

/// Application pixel formats the frame buffer supports.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColorDepth {
    /// One palette index per pixel; resolved through the registered palette
    /// at present time.
    Indexed8,
    /// One packed [`ARGB8888`] word per pixel, little-endian.
    Argb32,
}

impl ColorDepth {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorDepth::Indexed8 => 1,
            ColorDepth::Argb32 => 4,
        }
    }
}

/// Descriptor of the current frame buffer mode, as returned by
/// [`DisplayBackend::set_mode`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ModeInfo {
    pub width: u32,
    pub height: u32,
    pub depth: ColorDepth,
    /// Bytes per frame buffer row (`width * depth.bytes_per_pixel()`; no
    /// extra alignment is enforced).
    pub pitch: usize,
}

/// Audio format descriptor.
///
/// Samples are interleaved stereo i16 little-endian; that is fixed, not
/// negotiated. [`AudioBackend::open`] overwrites every field of the caller's
/// requested spec with the values the host dictated.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AudioSpec {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels (always 2 after open).
    pub channels: u32,
    /// Frames per callback block, as recommended by the host.
    pub frames: u32,
    /// Bytes per callback block (`frames * channels * 2`).
    pub block_len: usize,
}

/// Where translated input goes: the hosted library's private event-delivery
/// entry points. Implemented by the hosted library (or, in tests and demos,
/// by whatever wants to observe the semantic stream).
pub trait EventSink {
    fn mouse_button(&mut self, state: ButtonState, button: MouseButton, x: i32, y: i32);
    fn mouse_motion(&mut self, x: i32, y: i32);
    fn keyboard(&mut self, state: ButtonState, key: Key);
}

/// The display half of the driver registration surface.
///
/// One implementation exists per plugin context; the hosted library calls
/// everything here from the application thread.
pub trait DisplayBackend {
    /// Report the driver's default format (indexed 8-bit at the fixed output
    /// dimensions). Called once, before any mode is set.
    fn init(&mut self) -> ModeInfo;

    /// Allocate a fresh frame buffer for the requested mode, releasing any
    /// previous one. The requested dimensions are honored even when they
    /// differ from the output dimensions; presentation copies the
    /// intersection.
    fn set_mode(&mut self, width: u32, height: u32, depth: ColorDepth)
    -> Result<ModeInfo, VideoError>;

    /// The frame buffer bytes for direct application writes. Empty until the
    /// first successful `set_mode`. The exclusive borrow is the lock/unlock
    /// bracket: no presentation of these bytes can happen while the caller
    /// holds them.
    fn frame_mut(&mut self) -> &mut [u8];

    /// Present the current frame buffer contents (convert/copy them into the
    /// composite image shown by the flush loop). No-op before `set_mode`.
    fn update(&mut self);

    /// Register `colors` starting at palette slot `first`. Returns false if
    /// the current mode is not palette-indexed (or no mode is set).
    fn set_palette(&mut self, first: usize, colors: &[Rgb]) -> bool;

    /// Drain the raw event queue completely, translating each event and
    /// forwarding it to `sink` in exact arrival order.
    fn pump_events(&mut self, sink: &mut dyn EventSink);

    /// Prime OS keymap state. The host already delivers translated key
    /// codes, so there is nothing to prime; deliberate no-op.
    fn init_keymap(&mut self) {}

    /// Tear the pipeline down: stop the flush loop at its next completion and
    /// release both pixel buffers. Idempotent; safe to call while a
    /// completion is in flight.
    fn quit(&mut self);
}

/// The audio half of the driver registration surface.
pub trait AudioBackend {
    /// Attach `producer` and mark the device open. Every field of `requested`
    /// is overwritten with the fixed format before this returns; the caller
    /// acknowledges what it got, it does not negotiate.
    fn open(&mut self, requested: &mut AudioSpec, producer: SampleProducer);

    /// Mark the device closed. The host keeps invoking the audio callback
    /// (stopping playback needs a privileged-thread call this shim cannot
    /// make here); it serves silence from now on. The producer stays
    /// attached until the bridge itself is dropped.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_layout_masks_partition_the_word() {
        let PixelLayout {
            r_mask,
            g_mask,
            b_mask,
            a_mask,
        } = ARGB8888;

        assert_eq!(r_mask | g_mask | b_mask | a_mask, u32::MAX);
        assert_eq!(r_mask & g_mask, 0);
        assert_eq!(r_mask & b_mask, 0);
        assert_eq!(r_mask & a_mask, 0);
        assert_eq!(g_mask & b_mask, 0);
        assert_eq!(g_mask & a_mask, 0);
        assert_eq!(b_mask & a_mask, 0);
    }

    #[test]
    fn pixel_sizes_match_the_depth() {
        assert_eq!(ColorDepth::Indexed8.bytes_per_pixel(), 1);
        assert_eq!(ColorDepth::Argb32.bytes_per_pixel(), 4);
    }
}
