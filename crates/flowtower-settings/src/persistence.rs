//! Settings Persistence
//!
//! Reads flat settings files into [`RawSettings`] and writes a resolved
//! [`CalibrationSettings`] back out. The format follows the file extension:
//! `.json` or `.toml`.

use crate::config::CalibrationSettings;
use crate::error::{ConfigError, SettingsError, SettingsResult};
use crate::resolve::{resolve, RawSettings};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_for(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("<none>").to_string()).into()),
    }
}

/// Load a settings file as raw key/value pairs.
pub fn load_raw_settings(path: &Path) -> SettingsResult<RawSettings> {
    let format = format_for(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        SettingsError::LoadError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let raw = match format {
        Format::Json => RawSettings::from_json_value(serde_json::from_str::<Value>(&content)?)?,
        Format::Toml => toml::from_str::<RawSettings>(&content)?,
    };

    debug!("Loaded {} settings from {}", raw.len(), path.display());
    Ok(raw)
}

/// Load and resolve a settings file.
pub fn load_settings(path: &Path) -> SettingsResult<CalibrationSettings> {
    Ok(resolve(&load_raw_settings(path)?))
}

/// Save resolved settings (JSON or TOML, pretty printed).
pub fn save_settings(path: &Path, settings: &CalibrationSettings) -> SettingsResult<()> {
    let content = match format_for(path)? {
        Format::Json => serde_json::to_string_pretty(settings)?,
        Format::Toml => toml::to_string_pretty(settings)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| {
        SettingsError::SaveError(format!("Failed to write {}: {}", path.display(), e))
    })?;

    debug!("Saved settings to {}", path.display());
    Ok(())
}

/// Default location of the user settings file.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flowtower").join("settings.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Direction, SweepMode};
    use tempfile::TempDir;

    #[test]
    fn test_load_json_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "startFlow": 8, "offset": "2", "steps": 20 }"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.start_flow, 8.0);
        assert_eq!(settings.flow_offset, 2.0);
        assert_eq!(settings.flow_steps, 20);
    }

    #[test]
    fn test_load_toml_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "bedWidth = 256\nsweepMode = \"matrix\"\ndirection = 1\n").unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.bed_width, 256.0);
        assert_eq!(settings.sweep_mode, Some(SweepMode::Matrix));
        assert_eq!(settings.direction, Direction::Mirrored);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "bedWidth: 1").unwrap();

        assert!(matches!(
            load_raw_settings(&path),
            Err(SettingsError::Config(ConfigError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn test_json_array_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            load_raw_settings(&path),
            Err(SettingsError::Config(ConfigError::NotAnObject(_)))
        ));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(load_raw_settings(&path), Err(SettingsError::LoadError(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut settings = CalibrationSettings::default();
        settings.start_flow = 4.5;
        settings.direction = Direction::Mirrored;
        settings.bed_margin_x = Some(12.0);

        for name in ["nested/settings.toml", "settings.json"] {
            let path = dir.path().join(name);
            save_settings(&path, &settings).unwrap();
            assert_eq!(load_settings(&path).unwrap(), settings);
        }
    }

    #[test]
    fn test_default_settings_path_file_name() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with("flowtower/settings.toml"));
        }
    }
}
