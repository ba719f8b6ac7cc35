//! API-key settings storage
//!
//! Two-tier storage: a primary settings file in the user config directory and
//! a fallback copy in the local data directory. Loading prefers the primary
//! and degrades to the fallback, then to defaults; saving writes both.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "webclip";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Settings {
    /// Load settings from the default locations. Never fails: missing or
    /// corrupt files fall through to the next location, then to defaults.
    pub fn load() -> Self {
        Self::load_from(&default_paths())
    }

    /// Load from an explicit list of locations, first usable one wins.
    /// A file without an API key counts as empty and is skipped.
    pub fn load_from(paths: &[PathBuf]) -> Self {
        for path in paths {
            if let Some(settings) = Self::read_file(path) {
                if settings.api_key.is_some() {
                    return settings;
                }
            }
        }
        Self::default()
    }

    fn read_file(path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(settings) => Some(settings),
            Err(err) => {
                log::warn!("ignoring corrupt settings file {}: {err}", path.display());
                None
            }
        }
    }

    /// Save to the default locations. The primary write must succeed; the
    /// fallback copies are best-effort.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&default_paths())
    }

    /// Save to an explicit list of locations (first is the primary).
    pub fn save_to(&self, paths: &[PathBuf]) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut paths = paths.iter();
        let Some(primary) = paths.next() else {
            return Ok(());
        };
        write_file(primary, &json)?;
        for path in paths {
            if let Err(err) = write_file(path, &json) {
                log::warn!("could not write settings copy {}: {err}", path.display());
            }
        }
        Ok(())
    }
}

fn write_file(path: &Path, json: &str) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    Ok(())
}

/// Primary (config dir) and fallback (local data dir) settings paths.
fn default_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR).join(SETTINGS_FILE));
    }
    if let Some(dir) = dirs::data_local_dir() {
        paths.push(dir.join(APP_DIR).join(SETTINGS_FILE));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_paths(dir: &tempfile::TempDir) -> Vec<PathBuf> {
        vec![
            dir.path().join("config").join(SETTINGS_FILE),
            dir.path().join("local").join(SETTINGS_FILE),
        ]
    }

    #[test]
    fn save_writes_every_location_and_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let paths = scratch_paths(&dir);
        let settings = Settings {
            api_key: Some("k123".to_string()),
        };

        settings.save_to(&paths).unwrap();

        assert!(paths[0].exists());
        assert!(paths[1].exists());
        assert_eq!(Settings::load_from(&paths), settings);
    }

    #[test]
    fn load_falls_back_when_primary_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = scratch_paths(&dir);
        let settings = Settings {
            api_key: Some("k123".to_string()),
        };
        settings.save_to(&paths).unwrap();
        fs::remove_file(&paths[0]).unwrap();

        assert_eq!(Settings::load_from(&paths), settings);
    }

    #[test]
    fn corrupt_primary_degrades_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let paths = scratch_paths(&dir);
        let settings = Settings {
            api_key: Some("k123".to_string()),
        };
        settings.save_to(&paths).unwrap();
        fs::write(&paths[0], "not json").unwrap();

        assert_eq!(Settings::load_from(&paths), settings);
    }

    #[test]
    fn empty_primary_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = scratch_paths(&dir);
        Settings::default().save_to(&paths[..1]).unwrap();
        let settings = Settings {
            api_key: Some("k123".to_string()),
        };
        settings.save_to(&paths[1..]).unwrap();

        assert_eq!(Settings::load_from(&paths), settings);
    }

    #[test]
    fn missing_everything_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = scratch_paths(&dir);
        assert_eq!(Settings::load_from(&paths), Settings::default());
    }
}
