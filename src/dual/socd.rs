//! # SOCD Resolver Module
//!
//! Per-axis cleaning of simultaneous opposing cardinal directions with
//! last-input-wins history.
//!
//! One [`SocdAxis`] tracks a single axis (vertical or horizontal) for a
//! single input source. The pipeline runs four of them: primary-vertical,
//! primary-horizontal, auxiliary-vertical, auxiliary-horizontal, each with
//! its own memory of which direction last won.
//!
//! ## Tie-breaking
//!
//! When both opposing bits of the axis arrive together, the remembered last
//! winner's bit is cleared from the mask, leaving the more recent press in
//! effect. The memory is not changed by a conflict, so a held conflict
//! resolves the same way every cycle. A conflict observed with no remembered
//! direction passes through uncleaned for that cycle.

use crate::gamepad::DpadMask;

/// Which of a pair of opposing directions last won on one axis.
///
/// Negative is up or left, positive is down or right, matching the hat-axis
/// convention of the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDirection {
    /// Neither direction has won since the axis was last neutral.
    None,
    /// Down or right last won.
    Positive,
    /// Up or left last won.
    Negative,
}

/// SOCD cleaner for one axis of one input source.
///
/// # Examples
///
/// ```
/// use dpad_mux::dual::socd::SocdAxis;
/// use dpad_mux::gamepad::DpadMask;
///
/// let mut axis = SocdAxis::vertical();
/// assert_eq!(axis.clean(DpadMask::UP), DpadMask::UP);
///
/// // Down pressed while up is still held: the newer press wins
/// assert_eq!(axis.clean(DpadMask::UP | DpadMask::DOWN), DpadMask::DOWN);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SocdAxis {
    /// Bit for the positive (down or right) direction.
    positive: DpadMask,
    /// Bit for the negative (up or left) direction.
    negative: DpadMask,
    /// Last winning direction on this axis.
    last: AxisDirection,
}

impl SocdAxis {
    fn new(positive: DpadMask, negative: DpadMask) -> Self {
        Self {
            positive,
            negative,
            last: AxisDirection::None,
        }
    }

    /// Creates a cleaner for the up/down axis.
    #[must_use]
    pub fn vertical() -> Self {
        Self::new(DpadMask::DOWN, DpadMask::UP)
    }

    /// Creates a cleaner for the left/right axis.
    #[must_use]
    pub fn horizontal() -> Self {
        Self::new(DpadMask::RIGHT, DpadMask::LEFT)
    }

    /// The last winning direction on this axis.
    #[must_use]
    pub fn last(&self) -> AxisDirection {
        self.last
    }

    /// Resolves this axis within `mask` and updates the win history.
    ///
    /// Bits outside the axis pass through untouched. With exactly one of the
    /// axis bits set, that direction stands and is remembered. With neither
    /// set, the memory resets. With both set, the remembered direction's bit
    /// is cleared so the newer press wins; if nothing is remembered yet the
    /// conflict passes through unchanged for this cycle.
    pub fn clean(&mut self, mask: DpadMask) -> DpadMask {
        match (mask.contains(self.positive), mask.contains(self.negative)) {
            (true, true) => match self.last {
                AxisDirection::Positive => mask ^ self.positive,
                AxisDirection::Negative => mask ^ self.negative,
                AxisDirection::None => mask,
            },
            (true, false) => {
                self.last = AxisDirection::Positive;
                mask
            }
            (false, true) => {
                self.last = AxisDirection::Negative;
                mask
            }
            (false, false) => {
                self.last = AxisDirection::None;
                mask
            }
        }
    }
}
