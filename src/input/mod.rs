//! # Input Module
//!
//! Reads the auxiliary D-pad from a Linux evdev input device.
//!
//! This module handles:
//! - Discovering a suitable device by path or by key capability scan
//! - Mapping key events to the four active-low direction line levels
//! - Mapping hat axis events to the primary directional mask

pub mod evdev;

use ::evdev::Key;

/// The four evdev key codes driving the auxiliary direction lines.
///
/// A full set is required: the dual-directional feature is unavailable while
/// any direction is unassigned, and the host refuses to start without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionKeys {
    /// Key driving the up line.
    pub up: Key,
    /// Key driving the down line.
    pub down: Key,
    /// Key driving the left line.
    pub left: Key,
    /// Key driving the right line.
    pub right: Key,
}

impl DirectionKeys {
    /// Creates a key set from the four assigned codes.
    #[must_use]
    pub fn new(up: Key, down: Key, left: Key, right: Key) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    /// All four keys, for capability checks.
    #[must_use]
    pub fn all(&self) -> [Key; 4] {
        [self.up, self.down, self.left, self.right]
    }
}
