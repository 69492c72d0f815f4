//! # Journal Module
//!
//! Records gamepad output state changes to JSONL files with rotation.
//!
//! This module handles:
//! - Serializing one record per output state change
//! - Formatting as JSONL (JSON Lines)
//! - Writing to rotating journal files (max N records per file)
//! - Retaining only the last M files
//!
//! ## File Naming
//!
//! Files are named `dpad-<UTC timestamp>-<sequence>.jsonl`, so their
//! lexicographic order matches their chronological order. The sequence
//! number keeps names unique when several files open within one second.
//!
//! Journaling is best-effort: a failed write surfaces as an error for the
//! host to log, never as a reason to stop conditioning input.

use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::JournalConfig;
use crate::error::Result;
use crate::gamepad::GamepadState;

/// Journal file name prefix.
const FILE_PREFIX: &str = "dpad-";
/// Journal file name extension.
const FILE_SUFFIX: &str = ".jsonl";

/// One journal record, capturing the full output state at a change.
///
/// # Examples
///
/// ```
/// use dpad_mux::gamepad::{DpadMask, GamepadState};
/// use dpad_mux::journal::StateRecord;
///
/// let mut state = GamepadState::new();
/// state.dpad = DpadMask::UP | DpadMask::LEFT;
///
/// let record = StateRecord::from_state(&state);
/// assert_eq!(record.dpad, "up+left");
/// assert_eq!(record.dpad_bits, 0b0101);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct StateRecord {
    /// RFC 3339 UTC timestamp of the change.
    pub timestamp: String,
    /// Human-readable direction rendering, e.g. `"up+left"` or `"none"`.
    pub dpad: String,
    /// Raw directional mask bits.
    pub dpad_bits: u8,
    /// Left stick X coordinate.
    pub lx: u16,
    /// Left stick Y coordinate.
    pub ly: u16,
    /// Right stick X coordinate.
    pub rx: u16,
    /// Right stick Y coordinate.
    pub ry: u16,
}

impl StateRecord {
    /// Captures the given state with the current wall-clock timestamp.
    #[must_use]
    pub fn from_state(state: &GamepadState) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            dpad: state.dpad.to_string(),
            dpad_bits: state.dpad.bits(),
            lx: state.lx,
            ly: state.ly,
            rx: state.rx,
            ry: state.ry,
        }
    }
}

/// Rotating JSONL journal of output state changes.
///
/// The journal owns at most one open file at a time. Once a file reaches
/// the configured record count, the next record opens a fresh file and the
/// oldest files beyond the retention limit are deleted.
#[derive(Debug)]
pub struct StateJournal {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    file: Option<File>,
    records_in_file: usize,
    sequence: u64,
    total_records: u64,
}

impl StateJournal {
    /// Creates the journal, creating its directory if needed.
    ///
    /// No file is opened until the first record arrives.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the journal directory cannot be created.
    pub fn new(config: &JournalConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.dir);
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            max_records_per_file: config.max_records_per_file,
            max_files_to_keep: config.max_files_to_keep,
            file: None,
            records_in_file: 0,
            sequence: 0,
            total_records: 0,
        })
    }

    /// Appends one record for the given state.
    ///
    /// Rotates to a new file when the current one is full, pruning journal
    /// files beyond the retention limit.
    ///
    /// # Errors
    ///
    /// Returns `Journal` if serialization fails or `Io` on write failure.
    pub fn record(&mut self, state: &GamepadState) -> Result<()> {
        let record = StateRecord::from_state(state);
        let line = serde_json::to_string(&record)?;

        let mut file = match self.file.take() {
            Some(file) if self.records_in_file < self.max_records_per_file => file,
            _ => self.open_next_file()?,
        };
        writeln!(file, "{}", line)?;
        self.file = Some(file);

        self.records_in_file += 1;
        self.total_records += 1;
        Ok(())
    }

    /// Total records written over the journal's lifetime.
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    /// Opens the next journal file and prunes old ones.
    fn open_next_file(&mut self) -> Result<File> {
        let filename = format!(
            "{}{}-{:04}{}",
            FILE_PREFIX,
            Utc::now().format("%Y%m%dT%H%M%SZ"),
            self.sequence,
            FILE_SUFFIX
        );
        let path = self.dir.join(filename);
        let file = File::create(&path)?;
        debug!("Opened journal file: {}", path.display());

        self.records_in_file = 0;
        self.sequence += 1;
        self.prune()?;
        Ok(file)
    }

    /// Deletes the oldest journal files beyond the retention limit.
    fn prune(&self) -> Result<()> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| Self::is_journal_file(path))
            .collect();

        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        // Names sort chronologically, oldest first
        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            fs::remove_file(&path)?;
            debug!("Pruned old journal file: {}", path.display());
        }
        Ok(())
    }

    fn is_journal_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| {
                name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamepad::{DpadMask, JOYSTICK_MAX, JOYSTICK_MID, JOYSTICK_MIN};
    use tempfile::TempDir;

    fn journal_config(dir: &Path, max_records: usize, max_files: usize) -> JournalConfig {
        JournalConfig {
            enabled: true,
            dir: dir.to_string_lossy().to_string(),
            max_records_per_file: max_records,
            max_files_to_keep: max_files,
            format: "jsonl".to_string(),
        }
    }

    fn journal_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(String::from))
            .filter(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX))
            .collect();
        names.sort();
        names
    }

    fn read_lines(dir: &Path, name: &str) -> Vec<String> {
        fs::read_to_string(dir.join(name))
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    // ==================== Record Tests ====================

    #[test]
    fn test_record_captures_state() {
        let mut state = GamepadState::new();
        state.dpad = DpadMask::DOWN | DpadMask::RIGHT;
        state.lx = JOYSTICK_MIN;
        state.ry = JOYSTICK_MAX;

        let record = StateRecord::from_state(&state);
        assert_eq!(record.dpad, "down+right");
        assert_eq!(record.dpad_bits, 0b1010);
        assert_eq!(record.lx, JOYSTICK_MIN);
        assert_eq!(record.ly, JOYSTICK_MID);
        assert_eq!(record.rx, JOYSTICK_MID);
        assert_eq!(record.ry, JOYSTICK_MAX);
        assert!(record.timestamp.contains('T'));
    }

    #[test]
    fn test_record_renders_idle_as_none() {
        let record = StateRecord::from_state(&GamepadState::new());
        assert_eq!(record.dpad, "none");
        assert_eq!(record.dpad_bits, 0);
    }

    #[test]
    fn test_record_serializes_all_fields() {
        let record = StateRecord {
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            dpad: "up".to_string(),
            dpad_bits: 1,
            lx: 0,
            ly: 0x7fff,
            rx: 0x7fff,
            ry: 0xffff,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["timestamp"], "2026-01-01T00:00:00+00:00");
        assert_eq!(value["dpad"], "up");
        assert_eq!(value["dpad_bits"], 1);
        assert_eq!(value["lx"], 0);
        assert_eq!(value["ly"], 0x7fff);
        assert_eq!(value["rx"], 0x7fff);
        assert_eq!(value["ry"], 0xffff);
    }

    // ==================== Journal Tests ====================

    #[test]
    fn test_new_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("journals").join("pad");

        StateJournal::new(&journal_config(&nested, 10, 3)).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_record_writes_one_json_line() {
        let tmp = TempDir::new().unwrap();
        let mut journal = StateJournal::new(&journal_config(tmp.path(), 10, 3)).unwrap();

        let mut state = GamepadState::new();
        state.dpad = DpadMask::UP;
        journal.record(&state).unwrap();

        let files = journal_files(tmp.path());
        assert_eq!(files.len(), 1);

        let lines = read_lines(tmp.path(), &files[0]);
        assert_eq!(lines.len(), 1);

        let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value["dpad"], "up");
        assert_eq!(value["dpad_bits"], 1);
    }

    #[test]
    fn test_records_append_to_current_file() {
        let tmp = TempDir::new().unwrap();
        let mut journal = StateJournal::new(&journal_config(tmp.path(), 10, 3)).unwrap();

        let state = GamepadState::new();
        for _ in 0..3 {
            journal.record(&state).unwrap();
        }

        let files = journal_files(tmp.path());
        assert_eq!(files.len(), 1);
        assert_eq!(read_lines(tmp.path(), &files[0]).len(), 3);
    }

    #[test]
    fn test_rotation_at_record_limit() {
        let tmp = TempDir::new().unwrap();
        let mut journal = StateJournal::new(&journal_config(tmp.path(), 2, 10)).unwrap();

        let state = GamepadState::new();
        for _ in 0..5 {
            journal.record(&state).unwrap();
        }

        let files = journal_files(tmp.path());
        assert_eq!(files.len(), 3);
        assert_eq!(read_lines(tmp.path(), &files[0]).len(), 2);
        assert_eq!(read_lines(tmp.path(), &files[1]).len(), 2);
        assert_eq!(read_lines(tmp.path(), &files[2]).len(), 1);
    }

    #[test]
    fn test_retention_prunes_oldest() {
        let tmp = TempDir::new().unwrap();
        let mut journal = StateJournal::new(&journal_config(tmp.path(), 1, 2)).unwrap();

        let state = GamepadState::new();
        for _ in 0..4 {
            journal.record(&state).unwrap();
        }

        // Four files were opened; only the two newest survive
        let files = journal_files(tmp.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("-0002.jsonl"));
        assert!(files[1].ends_with("-0003.jsonl"));
    }

    #[test]
    fn test_file_names_sort_chronologically() {
        let tmp = TempDir::new().unwrap();
        let mut journal = StateJournal::new(&journal_config(tmp.path(), 1, 10)).unwrap();

        let state = GamepadState::new();
        for _ in 0..3 {
            journal.record(&state).unwrap();
        }

        let files = journal_files(tmp.path());
        assert_eq!(files.len(), 3);
        assert!(files[0] < files[1]);
        assert!(files[1] < files[2]);
    }

    #[test]
    fn test_total_records_counts_across_rotations() {
        let tmp = TempDir::new().unwrap();
        let mut journal = StateJournal::new(&journal_config(tmp.path(), 2, 2)).unwrap();

        let state = GamepadState::new();
        assert_eq!(journal.total_records(), 0);
        for _ in 0..5 {
            journal.record(&state).unwrap();
        }
        assert_eq!(journal.total_records(), 5);
    }

    #[test]
    fn test_unrelated_files_untouched_by_prune() {
        let tmp = TempDir::new().unwrap();
        let other = tmp.path().join("notes.txt");
        fs::write(&other, "keep me").unwrap();

        let mut journal = StateJournal::new(&journal_config(tmp.path(), 1, 1)).unwrap();
        let state = GamepadState::new();
        for _ in 0..3 {
            journal.record(&state).unwrap();
        }

        assert!(other.is_file());
        assert_eq!(journal_files(tmp.path()).len(), 1);
    }
}
