//! # Gamepad State Module
//!
//! Shared directional state for the gamepad output, plus the conversions
//! between its digital and analog representations.
//!
//! ## Directional Mask Bits
//!
//! | Direction | Bit | Value |
//! |-----------|-----|-------|
//! | Up | 0 | 0b0001 |
//! | Down | 1 | 0b0010 |
//! | Left | 2 | 0b0100 |
//! | Right | 3 | 0b1000 |
//!
//! ## Analog Quantization
//!
//! Directional input maps onto stick coordinates at exactly three levels:
//! minimum (up or left), center (released), maximum (down or right). The
//! reverse derivation only recognizes coordinates exactly at minimum or
//! maximum, so a stick that was not driven from a directional mask reads
//! back as neutral.

use bitflags::bitflags;
use serde::Deserialize;
use std::fmt;

/// Lowest analog stick coordinate (full up or full left).
pub const JOYSTICK_MIN: u16 = 0x0000;
/// Centered analog stick coordinate.
pub const JOYSTICK_MID: u16 = 0x7FFF;
/// Highest analog stick coordinate (full down or full right).
pub const JOYSTICK_MAX: u16 = 0xFFFF;

bitflags! {
    /// Digital directional mask, one bit per direction.
    ///
    /// # Examples
    ///
    /// ```
    /// use dpad_mux::gamepad::DpadMask;
    ///
    /// let diagonal = DpadMask::UP | DpadMask::RIGHT;
    /// assert!(diagonal.contains(DpadMask::UP));
    /// assert!(!diagonal.contains(DpadMask::LEFT));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DpadMask: u8 {
        const UP    = 0b0001;
        const DOWN  = 0b0010;
        const LEFT  = 0b0100;
        const RIGHT = 0b1000;
    }
}

impl fmt::Display for DpadMask {
    /// Renders the mask as `+`-joined direction names, or `none` when empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use dpad_mux::gamepad::DpadMask;
    ///
    /// assert_eq!((DpadMask::UP | DpadMask::LEFT).to_string(), "up+left");
    /// assert_eq!(DpadMask::empty().to_string(), "none");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }

        let mut first = true;
        for (name, flag) in [
            ("up", DpadMask::UP),
            ("down", DpadMask::DOWN),
            ("left", DpadMask::LEFT),
            ("right", DpadMask::RIGHT),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }

        Ok(())
    }
}

/// Where a directional result is written: the digital mask field, or one of
/// the two analog stick coordinate pairs.
///
/// Used both for the primary gamepad's own dpad representation and for the
/// auxiliary pad's output target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DpadMode {
    /// Directional state stays in the digital mask field.
    Digital,
    /// Directional state is quantized onto the left stick.
    LeftAnalog,
    /// Directional state is quantized onto the right stick.
    RightAnalog,
}

/// Session SOCD policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SocdMode {
    /// On simultaneous opposite presses, the most recent press wins.
    SecondInputPriority,
    /// Opposing directions are passed through unresolved.
    Passthrough,
}

/// Per-direction output-bit mapping: which mask bit each physical direction
/// asserts. Remappable so a rotated or rewired pad can keep canonical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DpadMap {
    pub up: DpadMask,
    pub down: DpadMask,
    pub left: DpadMask,
    pub right: DpadMask,
}

impl Default for DpadMap {
    /// Identity mapping: each direction asserts its own canonical bit.
    fn default() -> Self {
        Self {
            up: DpadMask::UP,
            down: DpadMask::DOWN,
            left: DpadMask::LEFT,
            right: DpadMask::RIGHT,
        }
    }
}

/// Quantizes a directional mask onto a stick X coordinate.
///
/// Left maps to [`JOYSTICK_MIN`], Right to [`JOYSTICK_MAX`]; both or neither
/// map to [`JOYSTICK_MID`].
///
/// # Examples
///
/// ```
/// use dpad_mux::gamepad::{dpad_to_analog_x, DpadMask, JOYSTICK_MIN, JOYSTICK_MID};
///
/// assert_eq!(dpad_to_analog_x(DpadMask::LEFT), JOYSTICK_MIN);
/// assert_eq!(dpad_to_analog_x(DpadMask::UP), JOYSTICK_MID);
/// ```
#[must_use]
pub fn dpad_to_analog_x(dpad: DpadMask) -> u16 {
    match (dpad.contains(DpadMask::LEFT), dpad.contains(DpadMask::RIGHT)) {
        (true, false) => JOYSTICK_MIN,
        (false, true) => JOYSTICK_MAX,
        _ => JOYSTICK_MID,
    }
}

/// Quantizes a directional mask onto a stick Y coordinate.
///
/// Up maps to [`JOYSTICK_MIN`], Down to [`JOYSTICK_MAX`]; both or neither
/// map to [`JOYSTICK_MID`].
#[must_use]
pub fn dpad_to_analog_y(dpad: DpadMask) -> u16 {
    match (dpad.contains(DpadMask::UP), dpad.contains(DpadMask::DOWN)) {
        (true, false) => JOYSTICK_MIN,
        (false, true) => JOYSTICK_MAX,
        _ => JOYSTICK_MID,
    }
}

/// The shared gamepad output state.
///
/// Holds the digital directional mask and both analog stick coordinate
/// pairs. The dual-directional pipeline reads and overwrites only these
/// directional fields; everything else about the gamepad lives elsewhere.
///
/// # Examples
///
/// ```
/// use dpad_mux::gamepad::{GamepadState, JOYSTICK_MID};
///
/// let state = GamepadState::default();
/// assert!(state.dpad.is_empty());
/// assert_eq!(state.lx, JOYSTICK_MID);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamepadState {
    /// Digital directional mask.
    pub dpad: DpadMask,
    /// Left stick X coordinate.
    pub lx: u16,
    /// Left stick Y coordinate.
    pub ly: u16,
    /// Right stick X coordinate.
    pub rx: u16,
    /// Right stick Y coordinate.
    pub ry: u16,
}

impl Default for GamepadState {
    /// Creates a state with the dpad released and both sticks centered.
    fn default() -> Self {
        Self {
            dpad: DpadMask::empty(),
            lx: JOYSTICK_MID,
            ly: JOYSTICK_MID,
            rx: JOYSTICK_MID,
            ry: JOYSTICK_MID,
        }
    }
}

impl GamepadState {
    /// Creates a new state with default (released/centered) values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the digital directional mask into the primary dpad's configured
    /// representation.
    ///
    /// In the analog modes the mask is quantized onto the corresponding
    /// stick and the digital field is cleared, so downstream consumers see
    /// the direction in exactly one place. Digital mode leaves the state
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use dpad_mux::gamepad::{DpadMask, DpadMode, GamepadState, JOYSTICK_MIN, JOYSTICK_MID};
    ///
    /// let mut state = GamepadState::new();
    /// state.dpad = DpadMask::UP;
    /// state.process_dpad(DpadMode::LeftAnalog);
    ///
    /// assert!(state.dpad.is_empty());
    /// assert_eq!(state.lx, JOYSTICK_MID);
    /// assert_eq!(state.ly, JOYSTICK_MIN);
    /// ```
    pub fn process_dpad(&mut self, mode: DpadMode) {
        match mode {
            DpadMode::Digital => {}
            DpadMode::LeftAnalog => {
                self.lx = dpad_to_analog_x(self.dpad);
                self.ly = dpad_to_analog_y(self.dpad);
                self.dpad = DpadMask::empty();
            }
            DpadMode::RightAnalog => {
                self.rx = dpad_to_analog_x(self.dpad);
                self.ry = dpad_to_analog_y(self.dpad);
                self.dpad = DpadMask::empty();
            }
        }
    }
}
