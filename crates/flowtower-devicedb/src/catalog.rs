//! Printer catalog
//!
//! An ordered, read-only list of normalized profiles. The built-in catalog is
//! built once on first use and shared.

use crate::error::{DeviceError, DeviceResult};
use crate::loader::normalize_profile;
use crate::model::{BuildVolume, ExcludedArea, PrinterProfile};
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrinterCatalog {
    profiles: Vec<PrinterProfile>,
}

fn builtin_profiles() -> Vec<PrinterProfile> {
    vec![
        PrinterProfile::new("A1 Mini", BuildVolume::new(180.0, 180.0, 180.0))
            .with_margins(10.0, 10.0)
            .with_spacing(13.0, 20.0),
        PrinterProfile::new("A1", BuildVolume::new(256.0, 256.0, 256.0))
            .with_margins(10.0, 10.0)
            .with_spacing(25.0, 25.0),
        PrinterProfile::new("X1/P1", BuildVolume::new(256.0, 256.0, 256.0))
            .with_margins(10.0, 10.0)
            .with_spacing(25.0, 25.0)
            .with_excluded_area(ExcludedArea::new(0.0, 0.0, 18.0, 28.0)),
        PrinterProfile::new("H2D", BuildVolume::new(350.0, 320.0, 325.0))
            .with_margins(30.0, 10.0)
            .with_spacing(25.0, 25.0),
        PrinterProfile::new("H2S", BuildVolume::new(340.0, 320.0, 340.0))
            .with_margins(10.0, 10.0)
            .with_spacing(25.0, 25.0),
    ]
}

impl PrinterCatalog {
    pub fn new(profiles: Vec<PrinterProfile>) -> Self {
        Self { profiles }
    }

    /// The catalog shipped with the tool.
    pub fn builtin() -> &'static PrinterCatalog {
        static CATALOG: OnceLock<PrinterCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| PrinterCatalog::new(builtin_profiles()))
    }

    pub fn get(&self, index: usize) -> Option<&PrinterProfile> {
        self.profiles.get(index)
    }

    /// Profile at `index`, or the empty profile when out of range.
    pub fn profile_or_unknown(&self, index: usize) -> &PrinterProfile {
        static UNKNOWN: OnceLock<PrinterProfile> = OnceLock::new();
        self.get(index).unwrap_or_else(|| {
            warn!(
                "Printer index {} outside catalog of {}, using empty profile",
                index,
                self.len()
            );
            UNKNOWN.get_or_init(PrinterProfile::unknown)
        })
    }

    /// Case-insensitive lookup by model name.
    pub fn find_by_model(&self, model: &str) -> Option<(usize, &PrinterProfile)> {
        let model = model.trim();
        self.profiles
            .iter()
            .enumerate()
            .find(|(_, profile)| profile.model.eq_ignore_ascii_case(model))
    }

    /// Resolve a printer selector: a catalog index or a model name.
    ///
    /// Numeric selectors are not range-checked; see [`Self::profile_or_unknown`].
    pub fn select(&self, selector: &str) -> DeviceResult<usize> {
        if let Ok(index) = selector.trim().parse::<usize>() {
            return Ok(index);
        }
        self.find_by_model(selector)
            .map(|(index, _)| index)
            .ok_or_else(|| DeviceError::ProfileNotFound(selector.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrinterProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Parse a JSON array of raw profiles.
    pub fn from_json_str(content: &str) -> DeviceResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        let entries = value.as_array().ok_or_else(|| {
            DeviceError::LoadError("expected a JSON array of profiles".to_string())
        })?;

        let profiles = entries
            .iter()
            .map(normalize_profile)
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Normalized {} printer profiles", profiles.len());
        Ok(Self::new(profiles))
    }

    /// Load a catalog file (JSON array of raw profiles).
    pub fn load_from_file(path: &Path) -> DeviceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
