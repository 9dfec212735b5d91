// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::{Path, PathBuf};

use crate::error::Result;

use super::Settings;

impl Settings {
    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        Self::luminous_home().join("settings.json")
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save settings to a specific path, fully overwriting.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the luminous home directory (~/.luminous-nix or $LUMINOUS_HOME).
    pub fn luminous_home() -> PathBuf {
        if let Ok(home) = std::env::var("LUMINOUS_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".luminous-nix")
    }

    /// Get the curator state directory.
    pub fn curator_dir() -> PathBuf {
        Self::luminous_home().join("model-curator")
    }

    /// Get the registry override file.
    pub fn models_path() -> PathBuf {
        Self::luminous_home().join("models.toml")
    }

    /// Get the hardware profile cache file.
    ///
    /// Lives under the platform config directory rather than the luminous
    /// home so that a profile survives a wiped state directory.
    pub fn hardware_cache_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(Self::luminous_home)
            .join("luminous-nix")
            .join("hardware_profile.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories() -> Result<()> {
        for dir in [Self::luminous_home(), Self::curator_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.curator.auto_integrate = true;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert!(loaded.curator.auto_integrate);
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_paths_are_rooted_in_home() {
        let home = Settings::luminous_home();
        assert!(Settings::default_path().starts_with(&home));
        assert!(Settings::curator_dir().starts_with(&home));
        assert!(Settings::models_path().ends_with("models.toml"));
        assert!(Settings::hardware_cache_path().ends_with("hardware_profile.json"));
    }
}
