//! FlowTower Settings Crate
//!
//! Turns loosely-typed calibration input (settings files, command-line
//! overrides, printer overlays) into one fully-defaulted
//! [`CalibrationSettings`] record.

pub mod config;
pub mod error;
pub mod persistence;
pub mod resolve;

pub use config::{CalibrationSettings, Direction, SweepMode};
pub use error::{ConfigError, SettingsError, SettingsResult};
pub use persistence::{default_settings_path, load_raw_settings, load_settings, save_settings};
pub use resolve::{resolve, RawSettings, SettingRule, SETTING_ALIASES};
