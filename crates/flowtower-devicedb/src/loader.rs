//! Raw profile normalization
//!
//! Profiles found in the wild come in a few shapes. This module is the only
//! place that knows about them:
//! - the build volume lives under `buildVolume` or `build_volume_mm`,
//!   optionally nested once more under `single_nozzle`;
//! - a missing width falls back to the depth and vice versa;
//! - a symmetric `bedMargin` (top level, in the build volume, or in the
//!   nested variant) sets both axis margins;
//! - excluded areas are listed under `excludedAreas` or `excluded_areas`.

use crate::error::{ProfileError, ProfileResult};
use crate::model::{BuildVolume, ExcludedArea, PrinterProfile};
use serde_json::{Map, Value};

fn number(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn build_volume(vol: &Map<String, Value>) -> ProfileResult<BuildVolume> {
    let width = number(vol, "width").or_else(|| number(vol, "depth"));
    let depth = number(vol, "depth").or_else(|| number(vol, "width"));
    let (Some(width), Some(depth)) = (width, depth) else {
        return Err(ProfileError::InvalidBuildVolume(
            "neither width nor depth given".to_string(),
        ));
    };
    let height = number(vol, "height").unwrap_or(0.0);

    if width < 0.0 || depth < 0.0 || height < 0.0 {
        return Err(ProfileError::InvalidBuildVolume(format!(
            "negative dimension {}x{}x{}",
            width, depth, height
        )));
    }
    Ok(BuildVolume::new(width, depth, height))
}

fn excluded_area(index: usize, value: &Value) -> ProfileResult<ExcludedArea> {
    let invalid = |reason: String| ProfileError::InvalidExcludedArea { index, reason };
    let object = value
        .as_object()
        .ok_or_else(|| invalid("expected an object".to_string()))?;
    let field = |key: &str| number(object, key).ok_or_else(|| invalid(format!("missing {}", key)));

    Ok(ExcludedArea::new(
        field("x")?,
        field("y")?,
        field("width")?,
        field("depth")?,
    ))
}

/// Turn one raw profile object into a [`PrinterProfile`].
pub fn normalize_profile(raw: &Value) -> ProfileResult<PrinterProfile> {
    let object = raw
        .as_object()
        .ok_or_else(|| ProfileError::MissingField("model".to_string()))?;

    let model = object
        .get("model")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .ok_or_else(|| ProfileError::MissingField("model".to_string()))?;

    let bv = first_present(object, &["buildVolume", "build_volume_mm"])
        .and_then(Value::as_object)
        .ok_or_else(|| ProfileError::MissingField("buildVolume".to_string()))?;
    let vol = bv
        .get("single_nozzle")
        .and_then(Value::as_object)
        .unwrap_or(bv);

    let mut profile = PrinterProfile::new(model, build_volume(vol)?);

    profile.bed_margin_x = number(object, "bedMarginX");
    profile.bed_margin_y = number(object, "bedMarginY");
    let symmetric = number(object, "bedMargin")
        .or_else(|| number(bv, "bedMargin"))
        .or_else(|| number(vol, "bedMargin"));
    if let Some(margin) = symmetric {
        profile.bed_margin_x = Some(margin);
        profile.bed_margin_y = Some(margin);
    }

    profile.x_spacing = number(object, "xSpacing");
    profile.y_spacing = number(object, "ySpacing");

    if let Some(areas) = first_present(object, &["excludedAreas", "excluded_areas"]) {
        let areas = areas.as_array().ok_or_else(|| ProfileError::InvalidExcludedArea {
            index: 0,
            reason: "expected a list".to_string(),
        })?;
        profile.excluded_areas = areas
            .iter()
            .enumerate()
            .map(|(index, area)| excluded_area(index, area))
            .collect::<ProfileResult<Vec<_>>>()?;
    }

    Ok(profile)
}
