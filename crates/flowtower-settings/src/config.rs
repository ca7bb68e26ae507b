//! Calibration settings record
//!
//! [`CalibrationSettings`] is the single typed input of the generator. Every
//! field is defaulted; values arrive through [`crate::resolve`] so the record
//! never holds `NaN` or an infinity.
//!
//! Settings are organized into logical groups:
//! - Bed geometry (size, margins)
//! - Filament and motion
//! - Thermal and fan
//! - Priming, wiping, retraction
//! - Blob shaping
//! - Plate layout spacing and direction
//! - Flow sweep

use flowtower_core::constants::MAX_SWEEP_STEPS;
use flowtower_core::format_number;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const DEFAULT_BED_WIDTH: f64 = 180.0;
pub const DEFAULT_BED_LENGTH: f64 = 180.0;
pub const DEFAULT_BED_MARGIN: f64 = 20.0;
pub const DEFAULT_FILAMENT_DIAMETER: f64 = 1.75;
pub const DEFAULT_MOVEMENT_SPEED: f64 = 60.0;
pub const DEFAULT_STABILIZATION_TIME: f64 = 3.0;
pub const DEFAULT_BED_TEMP: f64 = 60.0;
pub const DEFAULT_START_TEMP: f64 = 200.0;
pub const DEFAULT_TEMP_OFFSET: f64 = 0.0;
pub const DEFAULT_TEMP_STEPS: usize = 1;
pub const DEFAULT_FAN_SPEED: f64 = 0.0;
pub const DEFAULT_PRIME_LENGTH: f64 = 10.0;
pub const DEFAULT_PRIME_AMOUNT: f64 = 3.0;
pub const DEFAULT_PRIME_SPEED: f64 = 5.0;
pub const DEFAULT_WIPE_LENGTH: f64 = 10.0;
pub const DEFAULT_RETRACTION_DISTANCE: f64 = 1.0;
pub const DEFAULT_RETRACTION_SPEED: f64 = 30.0;
pub const DEFAULT_BLOB_HEIGHT: f64 = 5.0;
pub const DEFAULT_EXTRUSION_AMOUNT: f64 = 50.0;
pub const DEFAULT_X_SPACING: f64 = 25.0;
pub const DEFAULT_Y_SPACING: f64 = 25.0;
pub const DEFAULT_START_FLOW: f64 = 2.0;
pub const DEFAULT_FLOW_OFFSET: f64 = 2.0;
pub const DEFAULT_FLOW_STEPS: usize = 10;

/// Row layout direction on the bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Rows start at the back margin and advance toward the front (flag `0`).
    #[default]
    BackToFront,
    /// Row coordinates mirrored about zero, for printers homing in the other corner (flag `1`).
    Mirrored,
}

impl Direction {
    /// Numeric flag used by settings files.
    pub fn flag(self) -> u8 {
        match self {
            Self::BackToFront => 0,
            Self::Mirrored => 1,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BackToFront => write!(f, "back_to_front"),
            Self::Mirrored => write!(f, "mirrored"),
        }
    }
}

/// How flow values advance through the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// One continuous flow ramp across the whole sweep, ignoring columns.
    Fill,
    /// Flow restarts at every temperature column and climbs by row.
    Matrix,
}

impl std::fmt::Display for SweepMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fill => write!(f, "fill"),
            Self::Matrix => write!(f, "matrix"),
        }
    }
}

/// Fully-resolved calibration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalibrationSettings {
    /// Bed width along X (mm)
    pub bed_width: f64,
    /// Bed length along Y (mm)
    pub bed_length: f64,
    /// Legacy symmetric margin (mm), used when an axis margin is unset
    pub bed_margin: Option<f64>,
    pub bed_margin_x: Option<f64>,
    pub bed_margin_y: Option<f64>,
    /// Filament diameter (mm)
    pub filament_diameter: f64,
    /// Travel speed (mm/s)
    pub movement_speed: f64,
    /// Dwell before each test (s)
    pub stabilization_time: f64,
    pub bed_temp: f64,
    pub start_temp: f64,
    /// Temperature change per sweep column (°C)
    pub temp_offset: f64,
    /// Number of temperature columns in the sweep
    pub temp_steps: usize,
    /// Part cooling fan (percent)
    pub fan_speed: f64,
    pub prime_length: f64,
    /// Filament pushed while priming (mm)
    pub prime_amount: f64,
    /// Prime move speed (mm/s)
    pub prime_speed: f64,
    pub wipe_length: f64,
    pub retraction_distance: f64,
    /// Retraction speed (mm/s)
    pub retraction_speed: f64,
    /// Blob height (mm)
    pub blob_height: f64,
    /// Filament extruded per blob (mm)
    pub extrusion_amount: f64,
    pub x_spacing: f64,
    pub y_spacing: f64,
    pub direction: Direction,
    /// First flow of the sweep (mm³/s)
    pub start_flow: f64,
    /// Flow increment per step (mm³/s)
    pub flow_offset: f64,
    /// Flow steps per temperature column
    pub flow_steps: usize,
    pub end_flow: Option<f64>,
    /// Explicit sweep policy; derived from `temp_offset` when unset
    pub sweep_mode: Option<SweepMode>,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            bed_width: DEFAULT_BED_WIDTH,
            bed_length: DEFAULT_BED_LENGTH,
            bed_margin: Some(DEFAULT_BED_MARGIN),
            bed_margin_x: None,
            bed_margin_y: None,
            filament_diameter: DEFAULT_FILAMENT_DIAMETER,
            movement_speed: DEFAULT_MOVEMENT_SPEED,
            stabilization_time: DEFAULT_STABILIZATION_TIME,
            bed_temp: DEFAULT_BED_TEMP,
            start_temp: DEFAULT_START_TEMP,
            temp_offset: DEFAULT_TEMP_OFFSET,
            temp_steps: DEFAULT_TEMP_STEPS,
            fan_speed: DEFAULT_FAN_SPEED,
            prime_length: DEFAULT_PRIME_LENGTH,
            prime_amount: DEFAULT_PRIME_AMOUNT,
            prime_speed: DEFAULT_PRIME_SPEED,
            wipe_length: DEFAULT_WIPE_LENGTH,
            retraction_distance: DEFAULT_RETRACTION_DISTANCE,
            retraction_speed: DEFAULT_RETRACTION_SPEED,
            blob_height: DEFAULT_BLOB_HEIGHT,
            extrusion_amount: DEFAULT_EXTRUSION_AMOUNT,
            x_spacing: DEFAULT_X_SPACING,
            y_spacing: DEFAULT_Y_SPACING,
            direction: Direction::default(),
            start_flow: DEFAULT_START_FLOW,
            flow_offset: DEFAULT_FLOW_OFFSET,
            flow_steps: DEFAULT_FLOW_STEPS,
            end_flow: None,
            sweep_mode: None,
        }
    }
}

impl CalibrationSettings {
    /// Create settings with every field at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective X margin: explicit axis margin, else legacy margin, else zero.
    pub fn margin_x(&self) -> f64 {
        self.bed_margin_x.or(self.bed_margin).unwrap_or(0.0)
    }

    /// Effective Y margin: explicit axis margin, else legacy margin, else zero.
    pub fn margin_y(&self) -> f64 {
        self.bed_margin_y.or(self.bed_margin).unwrap_or(0.0)
    }

    /// Sweep policy in effect. A zero temperature offset selects `Fill`.
    pub fn sweep_mode(&self) -> SweepMode {
        match self.sweep_mode {
            Some(mode) => mode,
            None if self.temp_offset == 0.0 => SweepMode::Fill,
            None => SweepMode::Matrix,
        }
    }

    /// Number of temperature columns, never less than one.
    pub fn temperature_columns(&self) -> usize {
        self.temp_steps.max(1)
    }

    /// Total number of tests in the sweep across all plates, capped at
    /// [`MAX_SWEEP_STEPS`]. Columns past the cap are dropped.
    pub fn total_steps(&self) -> usize {
        self.flow_steps
            .saturating_mul(self.temperature_columns())
            .min(MAX_SWEEP_STEPS)
    }

    /// Filament cross-section (mm²).
    pub fn filament_area(&self) -> f64 {
        PI * (self.filament_diameter / 2.0).powi(2)
    }

    /// Distance between neighbouring grid columns (mm).
    pub fn column_pitch(&self) -> f64 {
        self.prime_length + self.wipe_length + self.x_spacing
    }

    /// Flow value of the last sweep step, as the form used to display it.
    pub fn computed_end_flow(&self) -> f64 {
        self.start_flow + self.flow_offset * (self.flow_steps.max(1) - 1) as f64
    }

    /// Name/value pairs echoed into the header of generated programs.
    pub fn echo_entries(&self) -> Vec<(&'static str, String)> {
        let optional = |value: Option<f64>| {
            value
                .map(format_number)
                .unwrap_or_else(|| "unset".to_string())
        };
        vec![
            ("bedWidth", format_number(self.bed_width)),
            ("bedLength", format_number(self.bed_length)),
            ("bedMarginX", format_number(self.margin_x())),
            ("bedMarginY", format_number(self.margin_y())),
            ("filamentDiameter", format_number(self.filament_diameter)),
            ("movementSpeed", format_number(self.movement_speed)),
            ("stabilizationTime", format_number(self.stabilization_time)),
            ("bedTemp", format_number(self.bed_temp)),
            ("fanSpeed", format_number(self.fan_speed)),
            ("primeLength", format_number(self.prime_length)),
            ("primeAmount", format_number(self.prime_amount)),
            ("primeSpeed", format_number(self.prime_speed)),
            ("wipeLength", format_number(self.wipe_length)),
            ("retractionDistance", format_number(self.retraction_distance)),
            ("retractionSpeed", format_number(self.retraction_speed)),
            ("blobHeight", format_number(self.blob_height)),
            ("extrusionAmount", format_number(self.extrusion_amount)),
            ("xSpacing", format_number(self.x_spacing)),
            ("ySpacing", format_number(self.y_spacing)),
            ("startFlow", format_number(self.start_flow)),
            ("flowOffset", format_number(self.flow_offset)),
            ("flowSteps", self.flow_steps.to_string()),
            ("endFlow", optional(self.end_flow)),
            ("startTemp", format_number(self.start_temp)),
            ("tempOffset", format_number(self.temp_offset)),
            ("tempSteps", self.temp_steps.to_string()),
            ("sweepMode", self.sweep_mode().to_string()),
            ("direction", self.direction.flag().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_precedence() {
        let mut settings = CalibrationSettings::default();
        assert_eq!(settings.margin_x(), DEFAULT_BED_MARGIN);

        settings.bed_margin_x = Some(10.0);
        assert_eq!(settings.margin_x(), 10.0);
        assert_eq!(settings.margin_y(), DEFAULT_BED_MARGIN);

        settings.bed_margin = None;
        assert_eq!(settings.margin_y(), 0.0);
    }

    #[test]
    fn test_sweep_mode_derivation() {
        let mut settings = CalibrationSettings::default();
        assert_eq!(settings.sweep_mode(), SweepMode::Fill);

        settings.temp_offset = 5.0;
        assert_eq!(settings.sweep_mode(), SweepMode::Matrix);

        settings.sweep_mode = Some(SweepMode::Fill);
        assert_eq!(settings.sweep_mode(), SweepMode::Fill);
    }

    #[test]
    fn test_total_steps_counts_temperature_columns() {
        let mut settings = CalibrationSettings::default();
        settings.flow_steps = 6;
        assert_eq!(settings.total_steps(), 6);

        settings.temp_steps = 3;
        assert_eq!(settings.total_steps(), 18);

        settings.temp_steps = 0;
        assert_eq!(settings.total_steps(), 6);
    }

    #[test]
    fn test_total_steps_capped_when_both_counts_are_maxed() {
        let mut raw = crate::RawSettings::new();
        raw.insert("flowSteps", 1e9);
        raw.insert("tempSteps", 1e9);
        let settings = crate::resolve(&raw);

        assert_eq!(settings.flow_steps, MAX_SWEEP_STEPS);
        assert_eq!(settings.temp_steps, MAX_SWEEP_STEPS);
        assert_eq!(settings.total_steps(), MAX_SWEEP_STEPS);
    }

    #[test]
    fn test_filament_area() {
        let settings = CalibrationSettings::default();
        let expected = PI * 0.875 * 0.875;
        assert!((settings.filament_area() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_echo_entries_are_finite_text() {
        let settings = CalibrationSettings::default();
        let entries = settings.echo_entries();
        assert!(entries.iter().any(|(k, v)| *k == "bedWidth" && v == "180"));
        assert!(entries.iter().any(|(k, v)| *k == "endFlow" && v == "unset"));
        assert!(entries.iter().all(|(_, v)| !v.contains("NaN")));
    }

    #[test]
    fn test_serde_uses_camel_case_keys() {
        let settings = CalibrationSettings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert!(json.get("bedWidth").is_some());
        assert!(json.get("retractionDistance").is_some());
        assert_eq!(json["direction"], "back_to_front");
    }
}
