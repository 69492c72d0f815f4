//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use evdev::Key;
use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::dual::{CombineMode, DualSettings};
use crate::error::Result;
use crate::gamepad::{DpadMap, DpadMask, DpadMode, SocdMode};
use crate::input::DirectionKeys;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub pad: PadConfig,
    pub gamepad: GamepadConfig,
    pub tick: TickConfig,
    pub log: LogConfig,
    pub journal: JournalConfig,
}

/// Auxiliary pad configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PadConfig {
    #[serde(default)]
    pub device_path: String,

    pub key_up: Option<u16>,

    pub key_down: Option<u16>,

    pub key_left: Option<u16>,

    pub key_right: Option<u16>,

    #[serde(default = "default_combine_mode")]
    pub combine_mode: CombineMode,

    #[serde(default = "default_output_mode")]
    pub output_mode: DpadMode,
}

/// Gamepad session configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GamepadConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,

    #[serde(default = "default_socd_mode")]
    pub socd_mode: SocdMode,

    #[serde(default = "default_dpad_mode")]
    pub dpad_mode: DpadMode,

    #[serde(default = "default_map_dpad_up")]
    pub map_dpad_up: u8,

    #[serde(default = "default_map_dpad_down")]
    pub map_dpad_down: u8,

    #[serde(default = "default_map_dpad_left")]
    pub map_dpad_left: u8,

    #[serde(default = "default_map_dpad_right")]
    pub map_dpad_right: u8,
}

/// Polling loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TickConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Directory for rolling log files. Absent means console logging.
    pub dir: Option<String>,
}

/// Journal configuration
#[derive(Debug, Deserialize, Clone)]
pub struct JournalConfig {
    #[serde(default = "default_journal_enabled")]
    pub enabled: bool,

    #[serde(default = "default_journal_dir")]
    pub dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_journal_format")]
    pub format: String,
}

// Default value functions
fn default_combine_mode() -> CombineMode { CombineMode::Mixed }
fn default_output_mode() -> DpadMode { DpadMode::Digital }

fn default_debounce_ms() -> u32 { 5 }
fn default_socd_mode() -> SocdMode { SocdMode::SecondInputPriority }
fn default_dpad_mode() -> DpadMode { DpadMode::Digital }
fn default_map_dpad_up() -> u8 { 0b0001 }
fn default_map_dpad_down() -> u8 { 0b0010 }
fn default_map_dpad_left() -> u8 { 0b0100 }
fn default_map_dpad_right() -> u8 { 0b1000 }

fn default_rate_hz() -> u32 { 250 }

fn default_journal_enabled() -> bool { true }
fn default_journal_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_journal_format() -> String { "jsonl".to_string() }

impl PadConfig {
    /// The four direction key codes, or `None` while any is unassigned.
    #[must_use]
    pub fn direction_keys(&self) -> Option<DirectionKeys> {
        Some(DirectionKeys::new(
            Key::new(self.key_up?),
            Key::new(self.key_down?),
            Key::new(self.key_left?),
            Key::new(self.key_right?),
        ))
    }

    /// Whether the dual-directional feature is available under this
    /// configuration.
    #[must_use]
    pub fn available(&self) -> bool {
        self.direction_keys().is_some()
    }
}

impl GamepadConfig {
    /// The per-direction output-bit mapping.
    #[must_use]
    pub fn dpad_map(&self) -> DpadMap {
        DpadMap {
            up: DpadMask::from_bits_truncate(self.map_dpad_up),
            down: DpadMask::from_bits_truncate(self.map_dpad_down),
            left: DpadMask::from_bits_truncate(self.map_dpad_left),
            right: DpadMask::from_bits_truncate(self.map_dpad_right),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dpad_mux::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Assembles the settings injected into the dual-directional pipeline.
    #[must_use]
    pub fn dual_settings(&self) -> DualSettings {
        DualSettings {
            combine_mode: self.pad.combine_mode,
            output_mode: self.pad.output_mode,
            socd_mode: self.gamepad.socd_mode,
            primary_dpad_mode: self.gamepad.dpad_mode,
            debounce_ms: self.gamepad.debounce_ms,
            dpad_map: self.gamepad.dpad_map(),
        }
    }

    /// Validate configuration values
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if valid, Err if invalid
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Validate direction key codes. Unassigned keys are allowed here;
        // the host gates on availability at startup.
        let assigned = [
            ("key_up", self.pad.key_up),
            ("key_down", self.pad.key_down),
            ("key_left", self.pad.key_left),
            ("key_right", self.pad.key_right),
        ];

        for (name, key) in assigned {
            if key == Some(0) {
                return Err(crate::error::DpadMuxError::Config(
                    toml::de::Error::custom(format!("{} must be a non-zero evdev key code", name))
                ));
            }
        }

        for (i, (_, a)) in assigned.iter().enumerate() {
            for (_, b) in assigned.iter().skip(i + 1) {
                if a.is_some() && a == b {
                    return Err(crate::error::DpadMuxError::Config(
                        toml::de::Error::custom("direction key codes must be distinct")
                    ));
                }
            }
        }

        // Validate debounce window
        if self.gamepad.debounce_ms > 5000 {
            return Err(crate::error::DpadMuxError::Config(
                toml::de::Error::custom("debounce_ms must be at most 5000")
            ));
        }

        // Validate direction mask bits
        for (name, value) in [
            ("map_dpad_up", self.gamepad.map_dpad_up),
            ("map_dpad_down", self.gamepad.map_dpad_down),
            ("map_dpad_left", self.gamepad.map_dpad_left),
            ("map_dpad_right", self.gamepad.map_dpad_right),
        ] {
            if !matches!(value, 0b0001 | 0b0010 | 0b0100 | 0b1000) {
                return Err(crate::error::DpadMuxError::Config(
                    toml::de::Error::custom(format!("{} must be a single bit in the low nibble (1, 2, 4 or 8)", name))
                ));
            }
        }

        let combined = self.gamepad.map_dpad_up
            | self.gamepad.map_dpad_down
            | self.gamepad.map_dpad_left
            | self.gamepad.map_dpad_right;
        if combined.count_ones() != 4 {
            return Err(crate::error::DpadMuxError::Config(
                toml::de::Error::custom("map_dpad_* values must be distinct")
            ));
        }

        // Validate tick rate
        if ![125, 250, 500, 1000].contains(&self.tick.rate_hz) {
            return Err(crate::error::DpadMuxError::Config(
                toml::de::Error::custom("rate_hz must be one of: 125, 250, 500, 1000")
            ));
        }

        // Validate log directory
        if let Some(dir) = &self.log.dir {
            if dir.is_empty() {
                return Err(crate::error::DpadMuxError::Config(
                    toml::de::Error::custom("log dir cannot be empty when set")
                ));
            }
        }

        // Validate journal configuration
        if self.journal.enabled && self.journal.dir.is_empty() {
            return Err(crate::error::DpadMuxError::Config(
                toml::de::Error::custom("journal dir cannot be empty when enabled")
            ));
        }

        if self.journal.max_records_per_file == 0 {
            return Err(crate::error::DpadMuxError::Config(
                toml::de::Error::custom("max_records_per_file must be greater than 0")
            ));
        }

        if self.journal.max_files_to_keep == 0 {
            return Err(crate::error::DpadMuxError::Config(
                toml::de::Error::custom("max_files_to_keep must be greater than 0")
            ));
        }

        // Validate journal format
        if self.journal.format != "jsonl" {
            return Err(crate::error::DpadMuxError::Config(
                toml::de::Error::custom("journal format must be 'jsonl' (only supported format)")
            ));
        }

        Ok(())
    }
}
