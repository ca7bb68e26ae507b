//! Preview rendering options

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Stroke color and width for one layer of the preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
}

impl StrokeStyle {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

/// Options controlling the preview. Every field has a default, so a partial
/// JSON document deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Bed width (mm)
    pub bed_width: f64,
    /// Bed length (mm)
    pub bed_length: f64,
    /// Space around the bed in the scene (mm)
    pub margin: f64,
    /// Grid pitch (mm); zero or less hides the grid
    pub grid_step: f64,
    /// Used to turn extruded length into blob volume (mm)
    pub filament_diameter: f64,
    /// Smallest extruder delta drawn as a blob (mm of filament)
    pub blob_min_e: f64,
    /// Largest XY drift still counted as a blob (mm)
    pub blob_max_xy: f64,
    /// Radius scale applied to the square root of blob volume
    pub blob_scale: f64,
    pub travel: StrokeStyle,
    pub extrusion: StrokeStyle,
    pub blob: StrokeStyle,
    pub font_family: String,
    pub font_size: f64,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            bed_width: 220.0,
            bed_length: 220.0,
            margin: 5.0,
            grid_step: 20.0,
            filament_diameter: 1.75,
            blob_min_e: 20.0,
            blob_max_xy: 0.1,
            blob_scale: 0.06,
            travel: StrokeStyle::new("#F00", 0.6),
            extrusion: StrokeStyle::new("#0b79d0", 2.0),
            blob: StrokeStyle::new("#cc3300", 3.0),
            font_family: "Arial, sans-serif".to_string(),
            font_size: 4.0,
        }
    }
}

impl ViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filament cross-section (mm²).
    pub fn filament_area(&self) -> f64 {
        PI * (self.filament_diameter / 2.0).powi(2)
    }
}
