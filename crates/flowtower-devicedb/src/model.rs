use flowtower_core::{Point2D, Rect};
use flowtower_settings::RawSettings;
use serde::{Deserialize, Serialize};

/// Spacing applied when a profile carries no spacing hint (mm).
pub const DEFAULT_PROFILE_SPACING: f64 = 20.0;

/// Placeholder model name of the empty profile.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Printable volume (mm).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildVolume {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

impl BuildVolume {
    pub fn new(width: f64, depth: f64, height: f64) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }
}

/// Bed rectangle where no calibration site may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExcludedArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub depth: f64,
}

impl ExcludedArea {
    pub fn new(x: f64, y: f64, width: f64, depth: f64) -> Self {
        Self { x, y, width, depth }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.depth)
    }

    /// Closed test over `[x, x+width] x [y, y+depth]`.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.as_rect().contains(Point2D::new(x, y))
    }
}

/// Static printer descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterProfile {
    pub model: String,
    pub build_volume: BuildVolume,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bed_margin_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bed_margin_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_areas: Vec<ExcludedArea>,
}

impl PrinterProfile {
    pub fn new(model: impl Into<String>, build_volume: BuildVolume) -> Self {
        Self {
            model: model.into(),
            build_volume,
            bed_margin_x: None,
            bed_margin_y: None,
            x_spacing: None,
            y_spacing: None,
            excluded_areas: Vec::new(),
        }
    }

    /// Empty profile for indices outside the catalog.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_MODEL, BuildVolume::default())
    }

    pub fn is_unknown(&self) -> bool {
        self.model == UNKNOWN_MODEL && self.build_volume == BuildVolume::default()
    }

    pub fn with_margins(mut self, x: f64, y: f64) -> Self {
        self.bed_margin_x = Some(x);
        self.bed_margin_y = Some(y);
        self
    }

    pub fn with_spacing(mut self, x: f64, y: f64) -> Self {
        self.x_spacing = Some(x);
        self.y_spacing = Some(y);
        self
    }

    pub fn with_excluded_area(mut self, area: ExcludedArea) -> Self {
        self.excluded_areas.push(area);
        self
    }

    /// True when the point falls in any excluded area.
    pub fn is_excluded(&self, x: f64, y: f64) -> bool {
        self.excluded_areas.iter().any(|area| area.contains(x, y))
    }

    /// Values applied to the settings when this printer is selected.
    ///
    /// The empty profile contributes nothing.
    pub fn settings_overlay(&self) -> RawSettings {
        let mut overlay = RawSettings::new();
        if self.is_unknown() {
            return overlay;
        }

        overlay.insert("bedWidth", self.build_volume.width);
        overlay.insert("bedLength", self.build_volume.depth);
        if let Some(margin) = self.bed_margin_x {
            overlay.insert("bedMarginX", margin);
        }
        if let Some(margin) = self.bed_margin_y {
            overlay.insert("bedMarginY", margin);
        }
        overlay.insert("xSpacing", self.x_spacing.unwrap_or(DEFAULT_PROFILE_SPACING));
        overlay.insert("ySpacing", self.y_spacing.unwrap_or(DEFAULT_PROFILE_SPACING));
        overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_excluded_area_is_closed() {
        let area = ExcludedArea::new(0.0, 0.0, 18.0, 28.0);
        assert!(area.contains(18.0, 28.0));
        assert!(area.contains(0.0, 0.0));
        assert!(!area.contains(18.5, 10.0));
    }

    #[test]
    fn test_unknown_profile() {
        let profile = PrinterProfile::unknown();
        assert_eq!(profile.model, "unknown");
        assert!(profile.is_unknown());
        assert!(profile.excluded_areas.is_empty());
        assert!(profile.settings_overlay().is_empty());
    }

    #[test]
    fn test_settings_overlay() {
        let profile = PrinterProfile::new("Test", BuildVolume::new(256.0, 220.0, 250.0))
            .with_margins(30.0, 10.0);
        let overlay = profile.settings_overlay();
        assert_eq!(overlay.get("bedWidth"), Some(&json!(256.0)));
        assert_eq!(overlay.get("bedLength"), Some(&json!(220.0)));
        assert_eq!(overlay.get("bedMarginX"), Some(&json!(30.0)));
        assert_eq!(overlay.get("xSpacing"), Some(&json!(20.0)));
        assert_eq!(overlay.get("ySpacing"), Some(&json!(20.0)));
    }

    #[test]
    fn test_overlay_omits_undeclared_margins() {
        let profile = PrinterProfile::new("Bare", BuildVolume::new(200.0, 200.0, 200.0))
            .with_spacing(13.0, 20.0);
        let overlay = profile.settings_overlay();
        assert!(!overlay.contains_key("bedMarginX"));
        assert_eq!(overlay.get("xSpacing"), Some(&json!(13.0)));
    }
}
