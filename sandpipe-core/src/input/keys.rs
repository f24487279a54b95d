//! Host key/button code translation tables.
//!
//! Host codes are browser-style key codes delivered with the raw events.
//! Both functions are total: anything outside the tables comes back as the
//! `Unknown` sentinel, never as an error.

use crate::driver::{Key, MouseButton};

// Range tables, indexed by (code - range base).

const LETTERS: [Key; 26] = [
    Key::A,
    Key::B,
    Key::C,
    Key::D,
    Key::E,
    Key::F,
    Key::G,
    Key::H,
    Key::I,
    Key::J,
    Key::K,
    Key::L,
    Key::M,
    Key::N,
    Key::O,
    Key::P,
    Key::Q,
    Key::R,
    Key::S,
    Key::T,
    Key::U,
    Key::V,
    Key::W,
    Key::X,
    Key::Y,
    Key::Z,
];

const DIGITS: [Key; 10] = [
    Key::Num0,
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

const KEYPAD_DIGITS: [Key; 10] = [
    Key::Kp0,
    Key::Kp1,
    Key::Kp2,
    Key::Kp3,
    Key::Kp4,
    Key::Kp5,
    Key::Kp6,
    Key::Kp7,
    Key::Kp8,
    Key::Kp9,
];

const FUNCTION_KEYS: [Key; 12] = [
    Key::F1,
    Key::F2,
    Key::F3,
    Key::F4,
    Key::F5,
    Key::F6,
    Key::F7,
    Key::F8,
    Key::F9,
    Key::F10,
    Key::F11,
    Key::F12,
];

/// Map a host key code to its semantic key.
pub fn translate_key(code: u32) -> Key {
    match code {
        65..=90 => LETTERS[(code - 65) as usize],
        48..=57 => DIGITS[(code - 48) as usize],
        96..=105 => KEYPAD_DIGITS[(code - 96) as usize],
        112..=123 => FUNCTION_KEYS[(code - 112) as usize],

        8 => Key::Backspace,
        9 => Key::Tab,
        13 => Key::Return,
        16 => Key::LShift,
        17 => Key::LCtrl,
        18 => Key::LAlt,
        19 => Key::Pause,
        27 => Key::Escape,
        32 => Key::Space,

        33 => Key::PageUp,
        34 => Key::PageDown,
        35 => Key::End,
        36 => Key::Home,
        37 => Key::Left,
        38 => Key::Up,
        39 => Key::Right,
        40 => Key::Down,
        45 => Key::Insert,
        46 => Key::Delete,

        106 => Key::KpMultiply,
        107 => Key::KpPlus,
        109 => Key::KpMinus,
        110 => Key::KpPeriod,
        111 => Key::KpDivide,

        186 => Key::Semicolon,
        187 => Key::Equals,
        188 => Key::Comma,
        189 => Key::Minus,
        190 => Key::Period,
        191 => Key::Slash,
        192 => Key::Backquote,
        219 => Key::LeftBracket,
        220 => Key::Backslash,
        221 => Key::RightBracket,
        222 => Key::Quote,

        _ => Key::Unknown,
    }
}

/// Map a host mouse button code to its semantic button. Negative codes are
/// the host's "no button" marker and translate to `Unknown` like any other
/// unmapped value.
pub fn translate_button(button: i32) -> MouseButton {
    match button {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::Unknown,
    }
}
