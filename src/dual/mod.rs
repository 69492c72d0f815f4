//! # Dual-Directional Pipeline Module
//!
//! Conditions a four-line auxiliary D-pad and merges it with the gamepad's
//! primary directional state into one authoritative result.
//!
//! This module handles:
//! - Sampling the four raw line levels into a directional mask
//! - Debouncing each direction independently ([`debounce`])
//! - SOCD cleaning per axis with last-input-wins history ([`socd`])
//! - Combining auxiliary and primary masks per the configured policy
//! - Mapping the authoritative result onto the configured output target
//!
//! ## Processing Order
//!
//! Each polling tick runs two phases around the primary representation
//! conversion, in this exact order:
//!
//! 1. [`DualDirectional::preprocess`]: sample, debounce, combine, write the
//!    authoritative mask into the digital directional field.
//! 2. [`GamepadState::process_dpad`]: the primary dpad moves the digital
//!    field into its own representation (external to this module).
//! 3. [`DualDirectional::process`]: map the result onto the auxiliary
//!    output target.
//!
//! Running `process` before the representation conversion breaks the mixed
//! mode, which re-reads the converted value.
//!
//! ## Combine Modes
//!
//! | Mode | Behavior |
//! |------|----------|
//! | `mixed` | Both masks SOCD-cleaned per source, then OR-combined |
//! | `auxiliary-override` | A non-idle auxiliary mask replaces the primary |
//! | `primary-override` | A non-idle primary mask replaces the auxiliary |

pub mod debounce;
pub mod socd;

use serde::Deserialize;

use crate::gamepad::{
    dpad_to_analog_x, dpad_to_analog_y, DpadMap, DpadMask, DpadMode, GamepadState, SocdMode,
    JOYSTICK_MAX, JOYSTICK_MIN,
};
use debounce::{DebounceFilter, Millis};
use socd::SocdAxis;

/// Policy for merging the auxiliary mask with the primary directional mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombineMode {
    /// Clean each source per axis, then OR the results together.
    Mixed,
    /// A non-idle auxiliary mask replaces the primary mask entirely.
    AuxiliaryOverride,
    /// A non-idle primary mask replaces the auxiliary value entirely.
    PrimaryOverride,
}

/// Raw levels of the four direction lines.
///
/// Lines are active low: `true` is the idle pulled-up level, `false` means
/// the direction is pressed. The levels are inverted during sampling so the
/// rest of the pipeline works with an active-high mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLevels {
    /// Up line level.
    pub up: bool,
    /// Down line level.
    pub down: bool,
    /// Left line level.
    pub left: bool,
    /// Right line level.
    pub right: bool,
}

impl Default for LineLevels {
    /// All lines high: nothing pressed.
    fn default() -> Self {
        Self {
            up: true,
            down: true,
            left: true,
            right: true,
        }
    }
}

/// Session settings injected at construction.
///
/// Assembled from the persisted configuration once at startup; read-only for
/// the component's lifetime.
#[derive(Debug, Clone, Copy)]
pub struct DualSettings {
    /// How the auxiliary mask merges with the primary mask.
    pub combine_mode: CombineMode,
    /// Where the auxiliary result is written.
    pub output_mode: DpadMode,
    /// SOCD policy for the mixed combine mode.
    pub socd_mode: SocdMode,
    /// The primary dpad's own representation.
    pub primary_dpad_mode: DpadMode,
    /// Debounce window in milliseconds.
    pub debounce_ms: u32,
    /// Which output bit each physical direction asserts.
    pub dpad_map: DpadMap,
}

/// The dual-directional input pipeline.
///
/// Owns all conditioning state: the debounce filter, the debounced working
/// value, and four per-axis SOCD cleaners (primary and auxiliary, vertical
/// and horizontal). The shared [`GamepadState`] is passed in by the caller
/// each phase; only its directional fields are touched.
///
/// # Examples
///
/// ```
/// use dpad_mux::dual::{CombineMode, DualDirectional, DualSettings, LineLevels};
/// use dpad_mux::gamepad::{DpadMap, DpadMask, DpadMode, GamepadState, SocdMode};
///
/// let settings = DualSettings {
///     combine_mode: CombineMode::Mixed,
///     output_mode: DpadMode::Digital,
///     socd_mode: SocdMode::SecondInputPriority,
///     primary_dpad_mode: DpadMode::Digital,
///     debounce_ms: 0,
///     dpad_map: DpadMap::default(),
/// };
/// let mut dual = DualDirectional::new(settings, 0);
/// let mut gamepad = GamepadState::new();
///
/// // Auxiliary up line pressed (active low), primary idle
/// let levels = LineLevels { up: false, ..LineLevels::default() };
/// dual.preprocess(levels, 10, &mut gamepad);
/// gamepad.process_dpad(DpadMode::Digital);
/// dual.process(&mut gamepad);
///
/// assert_eq!(gamepad.dpad, DpadMask::UP);
/// ```
#[derive(Debug)]
pub struct DualDirectional {
    settings: DualSettings,
    debounce: DebounceFilter,
    /// Debounced auxiliary working value for the current tick.
    dual_state: DpadMask,
    primary_vertical: SocdAxis,
    primary_horizontal: SocdAxis,
    dual_vertical: SocdAxis,
    dual_horizontal: SocdAxis,
}

impl DualDirectional {
    /// Creates the pipeline with all directions released and every debounce
    /// timer set to `now`.
    #[must_use]
    pub fn new(settings: DualSettings, now: Millis) -> Self {
        Self {
            debounce: DebounceFilter::new(settings.debounce_ms, now),
            settings,
            dual_state: DpadMask::empty(),
            primary_vertical: SocdAxis::vertical(),
            primary_horizontal: SocdAxis::horizontal(),
            dual_vertical: SocdAxis::vertical(),
            dual_horizontal: SocdAxis::horizontal(),
        }
    }

    /// The settings the pipeline was constructed with.
    #[must_use]
    pub fn settings(&self) -> &DualSettings {
        &self.settings
    }

    /// Merge phase; runs before the primary representation conversion.
    ///
    /// Samples the line levels into a mask, debounces it, merges it with the
    /// primary mask currently in `gamepad.dpad` per the combine mode, and
    /// writes the authoritative mask back into `gamepad.dpad`.
    ///
    /// In mixed mode with second-input priority, both sources are cleaned
    /// per axis before the OR, so neither source can contribute an opposing
    /// pair. In the override modes the losing side is replaced wholesale:
    /// `auxiliary-override` rewrites `gamepad.dpad`, while `primary-override`
    /// rewrites the debounced working value that [`Self::process`] maps out.
    /// An idle mask never overrides.
    pub fn preprocess(&mut self, levels: LineLevels, now: Millis, gamepad: &mut GamepadState) {
        let raw = self.mask_from_lines(levels);
        self.dual_state = self.debounce.update(raw, now);

        let mut primary = gamepad.dpad;

        match self.settings.combine_mode {
            CombineMode::Mixed => {
                let mut dual_out = self.dual_state;
                if self.settings.socd_mode == SocdMode::SecondInputPriority {
                    primary = self.primary_vertical.clean(primary);
                    primary = self.primary_horizontal.clean(primary);
                    dual_out = self.dual_vertical.clean(dual_out);
                    dual_out = self.dual_horizontal.clean(dual_out);
                }
                primary |= dual_out;
            }
            CombineMode::AuxiliaryOverride => {
                if !self.dual_state.is_empty() && primary != self.dual_state {
                    primary = self.dual_state;
                }
            }
            CombineMode::PrimaryOverride => {
                if !primary.is_empty() && primary != self.dual_state {
                    self.dual_state = primary;
                }
            }
        }

        gamepad.dpad = primary;
    }

    /// Output phase; runs after the primary representation conversion.
    ///
    /// Picks the value to map (in mixed mode re-derived from wherever the
    /// primary representation left it, otherwise the debounced working value)
    /// and writes it to exactly one output target per the configured output
    /// mode.
    pub fn process(&self, gamepad: &mut GamepadState) {
        let dual_out = match self.settings.combine_mode {
            CombineMode::Mixed => {
                Self::mask_from_primary(gamepad, self.settings.primary_dpad_mode)
            }
            CombineMode::AuxiliaryOverride | CombineMode::PrimaryOverride => self.dual_state,
        };

        match self.settings.output_mode {
            DpadMode::Digital => {
                gamepad.dpad = dual_out;
            }
            DpadMode::LeftAnalog => {
                gamepad.lx = dpad_to_analog_x(dual_out);
                gamepad.ly = dpad_to_analog_y(dual_out);
            }
            DpadMode::RightAnalog => {
                gamepad.rx = dpad_to_analog_x(dual_out);
                gamepad.ry = dpad_to_analog_y(dual_out);
            }
        }
    }

    /// Inverts the active-low levels and maps each pressed direction to its
    /// configured output bit.
    fn mask_from_lines(&self, levels: LineLevels) -> DpadMask {
        let map = self.settings.dpad_map;
        let mut mask = DpadMask::empty();
        if !levels.up {
            mask |= map.up;
        }
        if !levels.down {
            mask |= map.down;
        }
        if !levels.left {
            mask |= map.left;
        }
        if !levels.right {
            mask |= map.right;
        }
        mask
    }

    /// Re-derives a directional mask from the primary dpad's current
    /// representation.
    ///
    /// Only stick coordinates exactly at the quantized extremes count as a
    /// direction; anything else reads back as neutral on that axis.
    fn mask_from_primary(gamepad: &GamepadState, mode: DpadMode) -> DpadMask {
        match mode {
            DpadMode::Digital => gamepad.dpad,
            DpadMode::LeftAnalog => Self::mask_from_stick(gamepad.lx, gamepad.ly),
            DpadMode::RightAnalog => Self::mask_from_stick(gamepad.rx, gamepad.ry),
        }
    }

    fn mask_from_stick(x: u16, y: u16) -> DpadMask {
        let mut mask = DpadMask::empty();
        if x == JOYSTICK_MIN {
            mask |= DpadMask::LEFT;
        } else if x == JOYSTICK_MAX {
            mask |= DpadMask::RIGHT;
        }
        if y == JOYSTICK_MIN {
            mask |= DpadMask::UP;
        } else if y == JOYSTICK_MAX {
            mask |= DpadMask::DOWN;
        }
        mask
    }
}
