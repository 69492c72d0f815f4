//! # Debounce Filter Module
//!
//! Stabilizes the four raw direction samples into a debounced mask.
//!
//! Each direction carries its own timestamp, so one direction can accept a
//! transition while another is still inside its debounce window. A
//! transition (press or release) is accepted only when the candidate differs
//! from the accepted value and strictly more than the threshold has elapsed
//! since that direction's last accepted transition. Timestamps are wrapping
//! 32-bit milliseconds, so the filter keeps working across clock rollover.

use crate::gamepad::DpadMask;

/// Wrapping millisecond timestamp from the host's tick clock.
pub type Millis = u32;

/// Debounce state for one direction.
#[derive(Debug, Clone, Copy)]
struct DirectionSlot {
    /// The mask bit this slot filters.
    bit: DpadMask,
    /// When this direction's accepted value last flipped.
    last_change: Millis,
}

/// Debounce filter over the four-direction mask.
///
/// # Examples
///
/// ```
/// use dpad_mux::dual::debounce::DebounceFilter;
/// use dpad_mux::gamepad::DpadMask;
///
/// let mut filter = DebounceFilter::new(5, 0);
///
/// // A press inside the window is held back, then accepted once it clears
/// assert_eq!(filter.update(DpadMask::UP, 3), DpadMask::empty());
/// assert_eq!(filter.update(DpadMask::UP, 6), DpadMask::UP);
/// ```
#[derive(Debug, Clone)]
pub struct DebounceFilter {
    /// Debounce window in milliseconds.
    threshold_ms: u32,
    /// Last accepted mask.
    accepted: DpadMask,
    /// Per-direction timers.
    slots: [DirectionSlot; 4],
}

impl DebounceFilter {
    /// Creates a filter with all directions released and every timer set to
    /// `now`.
    #[must_use]
    pub fn new(threshold_ms: u32, now: Millis) -> Self {
        Self {
            threshold_ms,
            accepted: DpadMask::empty(),
            slots: [DpadMask::UP, DpadMask::DOWN, DpadMask::LEFT, DpadMask::RIGHT]
                .map(|bit| DirectionSlot { bit, last_change: now }),
        }
    }

    /// Feeds one raw candidate mask and returns the accepted mask.
    ///
    /// Per direction: if the candidate bit differs from the accepted bit and
    /// strictly more than the threshold has elapsed since that direction's
    /// last accepted flip, the accepted bit toggles and the timer restarts.
    /// Candidate changes that get rejected do not restart the timer.
    pub fn update(&mut self, candidate: DpadMask, now: Millis) -> DpadMask {
        for slot in &mut self.slots {
            if (self.accepted ^ candidate).contains(slot.bit)
                && now.wrapping_sub(slot.last_change) > self.threshold_ms
            {
                self.accepted ^= slot.bit;
                slot.last_change = now;
            }
        }
        self.accepted
    }

    /// The current accepted mask.
    #[must_use]
    pub fn accepted(&self) -> DpadMask {
        self.accepted
    }
}
