//! # Evdev Pad Source Module
//!
//! This module handles reading the auxiliary D-pad from a Linux evdev input
//! device and converting its events into the line levels and primary mask
//! the conditioning pipeline consumes.
//!
//! ## Device Detection
//!
//! Unlike hardware identified by vendor/product IDs, any device exposing the
//! four configured direction keys can serve as the auxiliary pad. Detection
//! therefore scans `/dev/input/event*` for the first device whose supported
//! key set contains all four codes. An explicitly configured device path
//! skips the scan.
//!
//! ## Event Types
//!
//! | Input | evdev Event | Values | Meaning |
//! |-------|-------------|--------|---------|
//! | Direction key | EV_KEY | 0/1/2 | 0 = released (line high), 1/2 = pressed (line low) |
//! | Primary D-Pad X | ABS_HAT0X | -1/0/1 | Left/Center/Right |
//! | Primary D-Pad Y | ABS_HAT0Y | -1/0/1 | Up/Center/Down |
//!
//! The direction lines emulate a pulled-up input: idle is high, a press
//! pulls the line low. The pipeline inverts the levels when sampling.

use evdev::{AbsoluteAxisType, Device, EventStream, InputEvent, Key};
use std::path::Path;
use tracing::{debug, info};

use crate::dual::LineLevels;
use crate::error::{DpadMuxError, Result};
use crate::gamepad::DpadMask;
use crate::input::DirectionKeys;

/// Hat axis released value.
pub const HAT_RELEASED: i32 = 0;
/// Hat axis pressed negative direction (left or up).
pub const HAT_NEGATIVE: i32 = -1;
/// Hat axis pressed positive direction (right or down).
pub const HAT_POSITIVE: i32 = 1;

/// Parses raw evdev events and maintains the pad's input state.
///
/// The mapper accumulates key events into the four active-low line levels
/// and hat events into the primary directional mask. It holds no timing
/// state; the pipeline samples [`PadEventMapper::levels`] once per tick.
///
/// # Thread Safety
///
/// `PadEventMapper` is not thread-safe. Use from a single task/thread only.
///
/// # Examples
///
/// ```
/// use dpad_mux::input::evdev::PadEventMapper;
/// use dpad_mux::input::DirectionKeys;
/// use evdev::{EventType, InputEvent, Key};
///
/// let keys = DirectionKeys::new(Key::KEY_UP, Key::KEY_DOWN, Key::KEY_LEFT, Key::KEY_RIGHT);
/// let mut mapper = PadEventMapper::new(keys);
///
/// // A key press drives its line low
/// mapper.process_event(&InputEvent::new(EventType::KEY, Key::KEY_UP.code(), 1));
/// assert!(!mapper.levels().up);
/// ```
#[derive(Debug)]
pub struct PadEventMapper {
    keys: DirectionKeys,
    levels: LineLevels,
    hat_x: i32,
    hat_y: i32,
}

impl PadEventMapper {
    /// Creates a new mapper with all lines idle and the hat centered.
    #[must_use]
    pub fn new(keys: DirectionKeys) -> Self {
        Self {
            keys,
            levels: LineLevels::default(),
            hat_x: HAT_RELEASED,
            hat_y: HAT_RELEASED,
        }
    }

    /// The current levels of the four direction lines.
    #[must_use]
    pub fn levels(&self) -> LineLevels {
        self.levels
    }

    /// The primary directional mask derived from the hat axes.
    #[must_use]
    pub fn primary_mask(&self) -> DpadMask {
        let mut mask = DpadMask::empty();
        match self.hat_x {
            HAT_NEGATIVE => mask |= DpadMask::LEFT,
            HAT_POSITIVE => mask |= DpadMask::RIGHT,
            _ => {}
        }
        match self.hat_y {
            HAT_NEGATIVE => mask |= DpadMask::UP,
            HAT_POSITIVE => mask |= DpadMask::DOWN,
            _ => {}
        }
        mask
    }

    /// Processes a single evdev input event and updates internal state.
    ///
    /// Direction key events move their line level; hat axis events move the
    /// primary mask. Everything else, including sync events, is ignored.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event.kind() {
            evdev::InputEventKind::AbsAxis(axis) => {
                self.process_axis_event(axis, event.value());
            }
            evdev::InputEventKind::Key(key) => {
                self.process_key_event(key, event.value() != 0);
            }
            _ => {
                // Ignore sync events and other event types
            }
        }
    }

    /// Processes an absolute axis event.
    fn process_axis_event(&mut self, axis: AbsoluteAxisType, value: i32) {
        match axis {
            AbsoluteAxisType::ABS_HAT0X => self.hat_x = value,
            AbsoluteAxisType::ABS_HAT0Y => self.hat_y = value,
            _ => {
                // Ignore other axes
            }
        }
    }

    /// Processes a key event. Repeats count as held, so the line stays low.
    fn process_key_event(&mut self, key: Key, held: bool) {
        let level = !held;
        if key == self.keys.up {
            self.levels.up = level;
        } else if key == self.keys.down {
            self.levels.down = level;
        } else if key == self.keys.left {
            self.levels.left = level;
        } else if key == self.keys.right {
            self.levels.right = level;
        }
    }

    /// Resets all lines to idle and centers the hat.
    ///
    /// Useful when reconnecting a device mid-session.
    pub fn reset(&mut self) {
        self.levels = LineLevels::default();
        self.hat_x = HAT_RELEASED;
        self.hat_y = HAT_RELEASED;
    }
}

/// Auxiliary pad device handle.
///
/// Represents an open evdev device carrying the four configured direction
/// keys. Converted into an async event stream for the polling loop.
pub struct AuxPadDevice {
    device: Device,
    device_path: String,
}

impl AuxPadDevice {
    /// Opens the auxiliary pad device.
    ///
    /// An empty `device_path` scans `/dev/input/event*` for the first device
    /// supporting all four direction keys; otherwise the given path is
    /// opened and verified.
    ///
    /// # Errors
    ///
    /// - `Pad`: The explicit path cannot be opened or lacks the keys
    /// - `PadNotFound`: The scan found no suitable device
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dpad_mux::input::evdev::AuxPadDevice;
    /// use dpad_mux::input::DirectionKeys;
    /// use evdev::Key;
    ///
    /// let keys = DirectionKeys::new(Key::KEY_UP, Key::KEY_DOWN, Key::KEY_LEFT, Key::KEY_RIGHT);
    /// let pad = AuxPadDevice::open("", keys)?;
    /// println!("Connected to pad at: {}", pad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(device_path: &str, keys: DirectionKeys) -> Result<Self> {
        if device_path.is_empty() {
            Self::scan(keys)
        } else {
            Self::open_path(device_path, keys)
        }
    }

    /// Opens an explicitly configured device path and verifies its key set.
    fn open_path(device_path: &str, keys: DirectionKeys) -> Result<Self> {
        let device = Device::open(device_path)
            .map_err(|e| DpadMuxError::Pad(format!("Failed to open {}: {}", device_path, e)))?;

        if !Self::supports_keys(&device, keys) {
            return Err(DpadMuxError::Pad(format!(
                "Device {} does not expose all four direction keys",
                device_path
            )));
        }

        Ok(Self {
            device,
            device_path: device_path.to_string(),
        })
    }

    /// Scans `/dev/input` for the first device supporting all four keys.
    fn scan(keys: DirectionKeys) -> Result<Self> {
        let input_dir = Path::new("/dev/input");

        if !input_dir.exists() {
            return Err(DpadMuxError::Pad(
                "/dev/input directory not found".to_string(),
            ));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| DpadMuxError::Pad(format!("Failed to read /dev/input: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DpadMuxError::Pad(format!("Failed to read directory entry: {}", e)))?;

        // Sort entries for deterministic device selection when multiple pads are connected
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            // Only check event* devices
            if let Some(filename) = path.file_name() {
                if !filename.to_string_lossy().starts_with("event") {
                    continue;
                }
            } else {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    debug!(
                        "Found input device: {} ({})",
                        path.display(),
                        device.name().unwrap_or("unnamed")
                    );

                    if Self::supports_keys(&device, keys) {
                        let device_path = path.to_string_lossy().to_string();
                        info!("Found auxiliary pad device at: {}", device_path);

                        return Ok(Self {
                            device,
                            device_path,
                        });
                    }
                }
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(DpadMuxError::PadNotFound)
    }

    /// Whether the device's supported key set contains all four direction keys.
    fn supports_keys(device: &Device, keys: DirectionKeys) -> bool {
        match device.supported_keys() {
            Some(supported) => keys.all().iter().all(|&key| supported.contains(key)),
            None => false,
        }
    }

    /// The `/dev/input/eventX` path this device was opened from.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// The human-readable device name from evdev, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Converts the device into an async event stream.
    ///
    /// # Errors
    ///
    /// Returns `Pad` if the device cannot be registered with the reactor.
    pub fn into_event_stream(self) -> Result<EventStream> {
        self.device
            .into_event_stream()
            .map_err(|e| DpadMuxError::Pad(format!("Failed to start event stream: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::EventType;

    fn arrow_keys() -> DirectionKeys {
        DirectionKeys::new(Key::KEY_UP, Key::KEY_DOWN, Key::KEY_LEFT, Key::KEY_RIGHT)
    }

    /// Helper to create a key event for testing. Value 0 is a release,
    /// 1 a press and 2 an autorepeat.
    fn make_key_event(key: Key, value: i32) -> InputEvent {
        InputEvent::new(EventType::KEY, key.code(), value)
    }

    /// Helper to create an axis event for testing.
    fn make_axis_event(axis: AbsoluteAxisType, value: i32) -> InputEvent {
        InputEvent::new(EventType::ABSOLUTE, axis.0, value)
    }

    // ==================== Initial State Tests ====================

    #[test]
    fn test_mapper_starts_idle() {
        let mapper = PadEventMapper::new(arrow_keys());
        assert_eq!(mapper.levels(), LineLevels::default());
        assert!(mapper.primary_mask().is_empty());
    }

    // ==================== Key Event Tests ====================

    #[test]
    fn test_key_press_drives_line_low() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_key_event(Key::KEY_UP, 1));
        assert!(!mapper.levels().up);
        assert!(mapper.levels().down);
        assert!(mapper.levels().left);
        assert!(mapper.levels().right);
    }

    #[test]
    fn test_key_release_returns_line_high() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_key_event(Key::KEY_LEFT, 1));
        assert!(!mapper.levels().left);

        mapper.process_event(&make_key_event(Key::KEY_LEFT, 0));
        assert!(mapper.levels().left);
    }

    #[test]
    fn test_key_repeat_keeps_line_low() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_key_event(Key::KEY_DOWN, 1));
        mapper.process_event(&make_key_event(Key::KEY_DOWN, 2));
        assert!(!mapper.levels().down);
    }

    #[test]
    fn test_each_direction_has_its_own_line() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_key_event(Key::KEY_UP, 1));
        mapper.process_event(&make_key_event(Key::KEY_RIGHT, 1));

        assert!(!mapper.levels().up);
        assert!(mapper.levels().down);
        assert!(mapper.levels().left);
        assert!(!mapper.levels().right);
    }

    #[test]
    fn test_configured_keys_drive_the_lines() {
        // WASD instead of arrows
        let keys = DirectionKeys::new(Key::KEY_W, Key::KEY_S, Key::KEY_A, Key::KEY_D);
        let mut mapper = PadEventMapper::new(keys);

        mapper.process_event(&make_key_event(Key::KEY_A, 1));
        assert!(!mapper.levels().left);

        // The arrow key is unrelated under this key set
        mapper.process_event(&make_key_event(Key::KEY_LEFT, 1));
        assert!(mapper.levels().up);
        assert!(mapper.levels().down);
        assert!(mapper.levels().right);
    }

    #[test]
    fn test_unrelated_key_ignored() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_key_event(Key::KEY_SPACE, 1));
        assert_eq!(mapper.levels(), LineLevels::default());
    }

    // ==================== Hat Event Tests ====================

    #[test]
    fn test_hat_x_maps_left_and_right() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0X, HAT_NEGATIVE));
        assert_eq!(mapper.primary_mask(), DpadMask::LEFT);

        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0X, HAT_POSITIVE));
        assert_eq!(mapper.primary_mask(), DpadMask::RIGHT);

        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0X, HAT_RELEASED));
        assert!(mapper.primary_mask().is_empty());
    }

    #[test]
    fn test_hat_y_maps_up_and_down() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0Y, HAT_NEGATIVE));
        assert_eq!(mapper.primary_mask(), DpadMask::UP);

        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0Y, HAT_POSITIVE));
        assert_eq!(mapper.primary_mask(), DpadMask::DOWN);
    }

    #[test]
    fn test_hat_diagonal_combines_axes() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0X, HAT_NEGATIVE));
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0Y, HAT_NEGATIVE));
        assert_eq!(mapper.primary_mask(), DpadMask::UP | DpadMask::LEFT);
    }

    #[test]
    fn test_hat_and_lines_independent() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_key_event(Key::KEY_UP, 1));
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0X, HAT_POSITIVE));

        assert!(!mapper.levels().up);
        assert_eq!(mapper.primary_mask(), DpadMask::RIGHT);
    }

    #[test]
    fn test_unknown_axis_ignored() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_MISC, 100));
        assert!(mapper.primary_mask().is_empty());
    }

    #[test]
    fn test_sync_events_ignored() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        let event = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        mapper.process_event(&event);

        assert_eq!(mapper.levels(), LineLevels::default());
        assert!(mapper.primary_mask().is_empty());
    }

    // ==================== Reset Tests ====================

    #[test]
    fn test_reset_restores_idle() {
        let mut mapper = PadEventMapper::new(arrow_keys());

        mapper.process_event(&make_key_event(Key::KEY_UP, 1));
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0X, HAT_NEGATIVE));

        mapper.reset();
        assert_eq!(mapper.levels(), LineLevels::default());
        assert!(mapper.primary_mask().is_empty());
    }

    // ==================== Constants Tests ====================

    #[test]
    fn test_hat_constants() {
        assert_eq!(HAT_RELEASED, 0);
        assert_eq!(HAT_NEGATIVE, -1);
        assert_eq!(HAT_POSITIVE, 1);
    }

    // ==================== Device Tests ====================

    #[test]
    fn test_open_missing_path_errors() {
        let result = AuxPadDevice::open("/dev/input/event-does-not-exist", arrow_keys());
        assert!(matches!(result, Err(DpadMuxError::Pad(_))));
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_open_with_real_hardware() {
        // This test requires an input device with arrow keys (e.g. a keyboard)
        let result = AuxPadDevice::open("", arrow_keys());
        assert!(result.is_ok(), "Should detect a device with arrow keys");

        let pad = result.unwrap();
        assert!(pad.device_path().starts_with("/dev/input/event"));
        assert!(pad.name().is_some());
    }

    // Integration test - only runs with real hardware
    #[tokio::test]
    #[ignore]
    async fn test_event_stream_with_real_hardware() {
        // This test requires an input device with arrow keys
        let pad = AuxPadDevice::open("", arrow_keys()).expect("Pad not found");
        let mut events = pad.into_event_stream().expect("Stream failed");

        println!("Press an arrow key within 5 seconds...");

        let deadline = tokio::time::Duration::from_secs(5);
        let event = tokio::time::timeout(deadline, events.next_event()).await;
        assert!(event.is_ok(), "No events received from pad");
    }
}
