//! Settings file I/O with debounced, atomic writes
//!
//! All methods run on the UI thread. Saves are coalesced: `request_save`
//! only records the latest snapshot and re-arms a deadline, and `poll`
//! performs the write once the deadline has passed.

use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::PersistedSettings;
use crate::constants::{config, persistence};
use crate::error::ChromeError;

/// Write attempts allowed per requested save before it is dropped
const WRITE_ATTEMPTS: u8 = 2;

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    debounce: Duration,
    pending: Option<PersistedSettings>,
    due: Option<Instant>,
    attempts_left: u8,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            debounce: Duration::from_millis(persistence::DEBOUNCE_MS),
            pending: None,
            due: None,
            attempts_left: WRITE_ATTEMPTS,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// `<config dir>/meritscalc/settings.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path.push(config::FILENAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read settings from disk. Never fails: a missing file yields defaults,
    /// a corrupt one yields defaults and is copied aside for inspection.
    pub fn load(&self) -> PersistedSettings {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No settings file found, using defaults");
                return PersistedSettings::default();
            }
            Err(e) => {
                self.report_corrupt(e.to_string());
                return PersistedSettings::default();
            }
        };

        match serde_json::from_str::<PersistedSettings>(&contents) {
            Ok(mut settings) => {
                settings.validate_and_clamp();
                info!(path = %self.path.display(), "Loaded settings");
                settings
            }
            Err(e) => {
                self.report_corrupt(e.to_string());
                PersistedSettings::default()
            }
        }
    }

    fn report_corrupt(&self, reason: String) {
        let err = ChromeError::ConfigCorrupt {
            path: self.path.clone(),
            reason,
        };
        warn!(error = %err, "Falling back to default settings");

        let backup = self.corrupt_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => info!(
                backup = %backup.display(),
                "Kept a copy of the unreadable settings file"
            ),
            Err(e) => debug!(error = %e, "Could not copy unreadable settings file"),
        }
    }

    /// `settings.json` -> `settings.json.corrupt`
    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(persistence::CORRUPT_SUFFIX);
        self.path.with_file_name(name)
    }

    pub fn request_save(&mut self, settings: PersistedSettings) {
        self.request_save_at(settings, Instant::now());
    }

    /// Record the newest snapshot and push the write deadline out
    pub fn request_save_at(&mut self, settings: PersistedSettings, now: Instant) {
        self.pending = Some(settings);
        self.due = Some(now + self.debounce);
        self.attempts_left = WRITE_ATTEMPTS;
        debug!(debounce_ms = self.debounce.as_millis() as u64, "Save requested");
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the next debounced write is due, for scheduling a repaint
    pub fn next_deadline(&self) -> Option<Instant> {
        self.due
    }

    pub fn poll(&mut self) -> Option<Result<(), ChromeError>> {
        self.poll_at(Instant::now())
    }

    /// Write the pending snapshot if its deadline has passed.
    ///
    /// Returns `None` when nothing was attempted. A failed write is retried
    /// once on the next debounce cycle, then dropped until the next request.
    pub fn poll_at(&mut self, now: Instant) -> Option<Result<(), ChromeError>> {
        let due = self.due?;
        if now < due {
            return None;
        }
        let settings = self.pending.take()?;

        match self.write(&settings) {
            Ok(()) => {
                self.due = None;
                Some(Ok(()))
            }
            Err(e) => {
                self.attempts_left = self.attempts_left.saturating_sub(1);
                if self.attempts_left > 0 {
                    warn!(error = %e, "Settings write failed, retrying on next cycle");
                    self.pending = Some(settings);
                    self.due = Some(now + self.debounce);
                } else {
                    error!(
                        error = %e,
                        "Settings write failed again, keeping changes in memory only"
                    );
                    self.due = None;
                }
                Some(Err(e))
            }
        }
    }

    /// Write immediately, cancelling any pending debounced write
    pub fn flush_now(&mut self, settings: &PersistedSettings) -> Result<(), ChromeError> {
        self.pending = None;
        self.due = None;
        self.write(settings)
    }

    fn write(&self, settings: &PersistedSettings) -> Result<(), ChromeError> {
        let contents = serde_json::to_string_pretty(settings)?;
        let failure = |source| ChromeError::PersistenceWriteFailure {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(failure)?;
        }

        let mut file = AtomicWriteFile::options().open(&self.path).map_err(failure)?;
        file.write_all(contents.as_bytes()).map_err(failure)?;
        file.commit().map_err(failure)?;

        info!(path = %self.path.display(), "Saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::actions;
    use crate::geometry::{Opacity, WindowGeometry};
    use crate::hotkeys::KeyChord;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("settings.json"))
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let mut settings = PersistedSettings::default();
        settings.geometry = WindowGeometry::new(-300, 40, 640, 880);
        settings.opacity = Opacity::new(0.55);
        settings.always_on_top = true;
        settings.aspect_lock.enabled = true;
        settings.aspect_lock.ratio = Some(0.75);
        settings.shortcuts.bind(actions::SAVE, KeyChord::new("F2")).unwrap();
        store.flush_now(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let settings = store.load();
        assert!((settings.opacity.value() - 0.9).abs() < f32::EPSILON);
        assert_eq!(settings.shortcuts.chord_for(actions::SAVE), Some(&KeyChord::new("S").ctrl()));
        assert_eq!(settings.shortcuts.chord_for(actions::QUIT), Some(&KeyChord::new("Q").ctrl()));
    }

    #[test]
    fn test_deleted_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let mut settings = PersistedSettings::default();
        settings.opacity = Opacity::new(0.3);
        store.flush_now(&settings).unwrap();
        fs::remove_file(store.path()).unwrap();
        assert_eq!(store.load(), PersistedSettings::default());
    }

    #[test]
    fn test_corrupt_file_is_copied_aside() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load(), PersistedSettings::default());
        let backup = dir.path().join("settings.json.corrupt");
        assert_eq!(fs::read_to_string(backup).unwrap(), "{ not json");
    }

    #[test]
    fn test_debounce_coalesces_requests() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let start = Instant::now();
        let mut first = PersistedSettings::default();
        first.opacity = Opacity::new(0.4);
        let mut second = PersistedSettings::default();
        second.opacity = Opacity::new(0.6);

        store.request_save_at(first, start);
        store.request_save_at(second.clone(), start + Duration::from_millis(200));

        // First deadline has passed but the second request re-armed it
        assert!(store.poll_at(start + Duration::from_millis(350)).is_none());
        assert!(!store.path().exists());

        assert!(matches!(store.poll_at(start + Duration::from_millis(500)), Some(Ok(()))));
        assert_eq!(store.load(), second);
        assert!(!store.has_pending());
        assert!(store.poll_at(start + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_flush_cancels_pending() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let start = Instant::now();
        store.request_save_at(PersistedSettings::default(), start);
        let mut latest = PersistedSettings::default();
        latest.always_on_top = true;
        store.flush_now(&latest).unwrap();
        assert_eq!(store.next_deadline(), None);
        assert!(store.poll_at(start + Duration::from_secs(1)).is_none());
        assert!(store.load().always_on_top);
    }

    #[test]
    fn test_failed_write_retries_once() {
        let dir = TempDir::new().unwrap();
        // Parent "directory" is a regular file, so every write fails
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut store = SettingsStore::new(blocker.join("settings.json"));
        let start = Instant::now();
        store.request_save_at(PersistedSettings::default(), start);

        let t1 = start + Duration::from_millis(300);
        assert!(matches!(
            store.poll_at(t1),
            Some(Err(ChromeError::PersistenceWriteFailure { .. }))
        ));
        assert!(store.has_pending());

        let t2 = t1 + Duration::from_millis(300);
        assert!(matches!(store.poll_at(t2), Some(Err(_))));
        assert!(!store.has_pending());
        assert!(store.poll_at(t2 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_external_fields_survive_save() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"opacity": 0.8, "rate_merits_auec": 0.7, "history": [1, 2, 3]}"#,
        )
        .unwrap();
        let mut settings = store.load();
        settings.always_on_top = true;
        store.flush_now(&settings).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["rate_merits_auec"], serde_json::json!(0.7));
        assert_eq!(raw["history"], serde_json::json!([1, 2, 3]));
        assert_eq!(raw["alwaysOnTop"], serde_json::json!(true));
    }

    #[test]
    fn test_external_numbers_written_back_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"rate_merits_auec": 0.6180, "big": 123456789012345678901234567890}"#,
        )
        .unwrap();
        let settings = store.load();
        store.flush_now(&settings).unwrap();

        let written = fs::read_to_string(store.path()).unwrap();
        assert!(written.contains(r#""rate_merits_auec": 0.6180"#), "{written}");
        assert!(written.contains(r#""big": 123456789012345678901234567890"#), "{written}");
        assert_eq!(store.load(), settings);
    }
}
