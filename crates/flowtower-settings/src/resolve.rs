//! Raw settings resolution
//!
//! Input arrives as an untyped key/value map ([`RawSettings`]). [`resolve`]
//! turns it into a [`CalibrationSettings`] in one pass. Which raw keys feed a
//! field, and in which order, is spelled out in [`SETTING_ALIASES`]; a value
//! that is missing or cannot be read as a number falls through to the next
//! key and finally to the field default.

use crate::config::*;
use crate::error::{ConfigError, SettingsError, SettingsResult};
use flowtower_core::constants::MAX_SWEEP_STEPS;
use flowtower_core::parse_lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// Untyped settings as read from a file, flags, or a printer overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSettings(BTreeMap<String, Value>);

impl RawSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value, which must be an object.
    pub fn from_json_value(value: Value) -> SettingsResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            other => Err(ConfigError::NotAnObject(value_kind(&other).to_string()).into()),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Copy every entry of `other` over this map; `other` wins on conflicts.
    pub fn merge(&mut self, other: &RawSettings) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Apply a `key=value` override. The value is read as JSON when it parses,
    /// otherwise kept as a string.
    pub fn set_from_pair(&mut self, pair: &str) -> SettingsResult<()> {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(SettingsError::InvalidOverride(pair.to_string()));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(SettingsError::InvalidOverride(pair.to_string()));
        }
        let value = value.trim();
        let parsed = serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        self.0.insert(key.to_string(), parsed);
        Ok(())
    }
}

impl FromIterator<(String, Value)> for RawSettings {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of the precedence table: the raw keys feeding `field`, highest
/// priority first.
#[derive(Debug, Clone, Copy)]
pub struct SettingRule {
    pub field: &'static str,
    pub keys: &'static [&'static str],
}

/// Precedence table for every resolvable field.
///
/// The short names used by the interactive form (`offset`, `steps`,
/// `bedTemperature`, ...) are accepted as aliases.
pub const SETTING_ALIASES: &[SettingRule] = &[
    SettingRule { field: "bedWidth", keys: &["bedWidth"] },
    SettingRule { field: "bedLength", keys: &["bedLength"] },
    SettingRule { field: "bedMargin", keys: &["bedMargin"] },
    SettingRule { field: "bedMarginX", keys: &["bedMarginX"] },
    SettingRule { field: "bedMarginY", keys: &["bedMarginY"] },
    SettingRule { field: "filamentDiameter", keys: &["filamentDiameter"] },
    SettingRule { field: "movementSpeed", keys: &["movementSpeed", "travelSpeed"] },
    SettingRule { field: "stabilizationTime", keys: &["stabilizationTime"] },
    SettingRule { field: "bedTemp", keys: &["bedTemp", "bedTemperature"] },
    SettingRule { field: "startTemp", keys: &["startTemp", "startTemperature"] },
    SettingRule { field: "tempOffset", keys: &["tempOffset", "temperatureSpacing"] },
    SettingRule { field: "tempSteps", keys: &["tempSteps"] },
    SettingRule { field: "fanSpeed", keys: &["fanSpeed"] },
    SettingRule { field: "primeLength", keys: &["primeLength"] },
    SettingRule { field: "primeAmount", keys: &["primeAmount"] },
    SettingRule { field: "primeSpeed", keys: &["primeSpeed"] },
    SettingRule { field: "wipeLength", keys: &["wipeLength"] },
    SettingRule { field: "retractionDistance", keys: &["retractionDistance"] },
    SettingRule { field: "retractionSpeed", keys: &["retractionSpeed"] },
    SettingRule { field: "blobHeight", keys: &["blobHeight"] },
    SettingRule { field: "extrusionAmount", keys: &["extrusionAmount"] },
    SettingRule { field: "xSpacing", keys: &["xSpacing"] },
    SettingRule { field: "ySpacing", keys: &["ySpacing"] },
    SettingRule { field: "direction", keys: &["direction"] },
    SettingRule { field: "startFlow", keys: &["startFlow"] },
    SettingRule { field: "flowOffset", keys: &["offset", "flowOffset"] },
    SettingRule { field: "flowSteps", keys: &["steps", "flowSteps"] },
    SettingRule { field: "endFlow", keys: &["endFlow"] },
    SettingRule { field: "sweepMode", keys: &["sweepMode"] },
];

fn keys_for(field: &str) -> &'static [&'static str] {
    SETTING_ALIASES
        .iter()
        .find(|rule| rule.field == field)
        .map(|rule| rule.keys)
        .unwrap_or(&[])
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a raw value as a finite number, or `None` when it should count as missing.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_lenient(s),
        _ => None,
    }
}

struct Resolver<'a> {
    raw: &'a RawSettings,
}

impl Resolver<'_> {
    fn number(&self, field: &str) -> Option<f64> {
        for key in keys_for(field) {
            let Some(value) = self.raw.get(key) else {
                continue;
            };
            match coerce_number(value) {
                Some(number) => return Some(number),
                None => {
                    if !matches!(value, Value::Null) && value.as_str() != Some("") {
                        warn!(
                            "Ignoring unreadable value for '{}' ({}): {}",
                            key,
                            value_kind(value),
                            value
                        );
                    }
                }
            }
        }
        None
    }

    fn number_or(&self, field: &str, default: f64) -> f64 {
        self.number(field).unwrap_or_else(|| {
            trace!("Setting '{}' defaulted to {}", field, default);
            default
        })
    }

    fn count_or(&self, field: &str, default: usize) -> usize {
        match self.number(field) {
            Some(value) if value <= 0.0 => 0,
            Some(value) => (value.ceil() as usize).min(MAX_SWEEP_STEPS),
            None => {
                trace!("Setting '{}' defaulted to {}", field, default);
                default
            }
        }
    }

    fn text(&self, field: &str) -> Option<String> {
        keys_for(field)
            .iter()
            .filter_map(|key| self.raw.get(key))
            .find_map(|value| value.as_str().map(|s| s.trim().to_lowercase()))
    }

    fn direction(&self) -> Direction {
        if let Some(text) = self.text("direction") {
            match text.as_str() {
                "mirrored" | "mirror" => return Direction::Mirrored,
                "back_to_front" | "normal" => return Direction::BackToFront,
                _ => {}
            }
        }
        match self.number("direction") {
            Some(flag) if flag == 1.0 => Direction::Mirrored,
            _ => Direction::BackToFront,
        }
    }

    fn sweep_mode(&self) -> Option<SweepMode> {
        match self.text("sweepMode")?.as_str() {
            "fill" => Some(SweepMode::Fill),
            "matrix" => Some(SweepMode::Matrix),
            other => {
                warn!("Unknown sweep mode '{}', deriving from temperature offset", other);
                None
            }
        }
    }
}

/// Resolve raw input into fully-defaulted settings. Never fails.
pub fn resolve(raw: &RawSettings) -> CalibrationSettings {
    let r = Resolver { raw };

    let start_flow = r.number_or("startFlow", DEFAULT_START_FLOW);
    let flow_steps = r.count_or("flowSteps", DEFAULT_FLOW_STEPS);
    let end_flow = r.number("endFlow");
    let flow_offset = match (r.number("flowOffset"), end_flow) {
        (Some(offset), _) => offset,
        (None, Some(end)) if flow_steps > 1 => (end - start_flow) / (flow_steps - 1) as f64,
        (None, Some(_)) => 0.0,
        (None, None) => DEFAULT_FLOW_OFFSET,
    };

    CalibrationSettings {
        bed_width: r.number_or("bedWidth", DEFAULT_BED_WIDTH),
        bed_length: r.number_or("bedLength", DEFAULT_BED_LENGTH),
        bed_margin: Some(r.number_or("bedMargin", DEFAULT_BED_MARGIN)),
        bed_margin_x: r.number("bedMarginX"),
        bed_margin_y: r.number("bedMarginY"),
        filament_diameter: r.number_or("filamentDiameter", DEFAULT_FILAMENT_DIAMETER),
        movement_speed: r.number_or("movementSpeed", DEFAULT_MOVEMENT_SPEED),
        stabilization_time: r.number_or("stabilizationTime", DEFAULT_STABILIZATION_TIME),
        bed_temp: r.number_or("bedTemp", DEFAULT_BED_TEMP),
        start_temp: r.number_or("startTemp", DEFAULT_START_TEMP),
        temp_offset: r.number_or("tempOffset", DEFAULT_TEMP_OFFSET),
        temp_steps: r.count_or("tempSteps", DEFAULT_TEMP_STEPS),
        fan_speed: r.number_or("fanSpeed", DEFAULT_FAN_SPEED),
        prime_length: r.number_or("primeLength", DEFAULT_PRIME_LENGTH),
        prime_amount: r.number_or("primeAmount", DEFAULT_PRIME_AMOUNT),
        prime_speed: r.number_or("primeSpeed", DEFAULT_PRIME_SPEED),
        wipe_length: r.number_or("wipeLength", DEFAULT_WIPE_LENGTH),
        retraction_distance: r.number_or("retractionDistance", DEFAULT_RETRACTION_DISTANCE),
        retraction_speed: r.number_or("retractionSpeed", DEFAULT_RETRACTION_SPEED),
        blob_height: r.number_or("blobHeight", DEFAULT_BLOB_HEIGHT),
        extrusion_amount: r.number_or("extrusionAmount", DEFAULT_EXTRUSION_AMOUNT),
        x_spacing: r.number_or("xSpacing", DEFAULT_X_SPACING),
        y_spacing: r.number_or("ySpacing", DEFAULT_Y_SPACING),
        direction: r.direction(),
        start_flow,
        flow_offset,
        flow_steps,
        end_flow,
        sweep_mode: r.sweep_mode(),
    }
}

impl From<&RawSettings> for CalibrationSettings {
    fn from(raw: &RawSettings) -> Self {
        resolve(raw)
    }
}
