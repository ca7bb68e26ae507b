//! # FlowTower
//!
//! Calibration toolkit for FFF printers:
//! - Flow/temperature tower G-code generation with bed layout and plate splitting
//! - G-code replay and 2D SVG preview rendering
//! - Printer profile catalog and layered settings resolution
//!
//! ## Architecture
//!
//! FlowTower is organized as a workspace with multiple crates:
//!
//! 1. **flowtower-core** - Number formatting, geometry, program text writer
//! 2. **flowtower-settings** - Raw settings, resolution, persistence
//! 3. **flowtower-devicedb** - Printer profiles and the built-in catalog
//! 4. **flowtower-camtools** - Tower layout, program generation, archives
//! 5. **flowtower-visualizer** - Program interpreter and SVG renderer
//! 6. **flowtower** - Command line binary that ties them together

pub use flowtower_camtools as camtools;
pub use flowtower_devicedb as devicedb;
pub use flowtower_settings as settings;
pub use flowtower_visualizer as visualizer;

pub use flowtower_camtools::{
    archive_file_name, plate_file_name, CamToolError, FlowTowerGenerator, Plate, PlateBundle,
};
pub use flowtower_core::format_number;
pub use flowtower_devicedb::{DeviceError, PrinterCatalog, PrinterProfile};
pub use flowtower_settings::{
    resolve, CalibrationSettings, Direction, RawSettings, SettingsError, SweepMode,
};
pub use flowtower_visualizer::{render, GcodeRenderer, StrokeStyle, ViewOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

const PREVIEW_GRID_STEP: f64 = 20.0;
const PREVIEW_TRAVEL_COLOR: &str = "#ffff0050";
const PREVIEW_EXTRUSION_COLOR: &str = "#0b79d0";

/// Initialize logging.
///
/// Output goes to stderr so generated programs and SVG written to stdout stay
/// clean. `RUST_LOG` is honored unless `verbose` forces debug level.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Resolve settings for a printer: the profile's overlay first, then each
/// layer in order, later layers winning.
pub fn layered_settings<'a>(
    profile: &PrinterProfile,
    layers: impl IntoIterator<Item = &'a RawSettings>,
) -> CalibrationSettings {
    let mut raw = profile.settings_overlay();
    for layer in layers {
        raw.merge(layer);
    }
    resolve(&raw)
}

/// View options matching a calibration run: the run's bed, margins and
/// filament, with site blobs drawn in the extrusion color.
pub fn preview_options_for(settings: &CalibrationSettings) -> ViewOptions {
    let defaults = ViewOptions::default();
    ViewOptions {
        bed_width: settings.bed_width,
        bed_length: settings.bed_length,
        margin: settings.margin_x().max(settings.margin_y()),
        grid_step: PREVIEW_GRID_STEP,
        filament_diameter: settings.filament_diameter,
        blob_min_e: 20.0,
        blob_max_xy: 0.1,
        blob_scale: 0.06,
        travel: StrokeStyle::new(PREVIEW_TRAVEL_COLOR, defaults.travel.width),
        extrusion: StrokeStyle::new(PREVIEW_EXTRUSION_COLOR, defaults.extrusion.width),
        blob: StrokeStyle::new(PREVIEW_EXTRUSION_COLOR, defaults.blob.width),
        ..defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_options_follow_settings() {
        let settings = CalibrationSettings {
            bed_width: 256.0,
            bed_length: 240.0,
            bed_margin_x: Some(12.0),
            bed_margin_y: Some(18.0),
            filament_diameter: 2.85,
            ..CalibrationSettings::default()
        };
        let options = preview_options_for(&settings);

        assert_eq!(options.bed_width, 256.0);
        assert_eq!(options.bed_length, 240.0);
        assert_eq!(options.margin, 18.0);
        assert_eq!(options.filament_diameter, 2.85);
        assert_eq!(options.travel.color, "#ffff0050");
        assert_eq!(options.blob.color, "#0b79d0");
        assert_eq!(options.blob.width, 3.0);
        assert_eq!(options.font_size, 4.0);
    }

    #[test]
    fn test_layered_settings_precedence() {
        let profile = PrinterCatalog::builtin()
            .find_by_model("A1")
            .map(|(_, profile)| profile.clone())
            .unwrap();

        let mut file = RawSettings::new();
        file.insert("bedLength", 200.0);
        file.insert("startFlow", 6.0);
        let mut overrides = RawSettings::new();
        overrides.set_from_pair("startFlow=9").unwrap();

        let settings = layered_settings(&profile, [&file, &overrides]);
        assert_eq!(settings.bed_width, 256.0);
        assert_eq!(settings.bed_length, 200.0);
        assert_eq!(settings.start_flow, 9.0);
    }

    #[test]
    fn test_layered_settings_unknown_profile_uses_defaults() {
        let settings =
            layered_settings(&PrinterProfile::unknown(), std::iter::empty::<&RawSettings>());
        assert_eq!(settings, resolve(&RawSettings::new()));
    }

    #[test]
    fn test_build_metadata() {
        assert!(!VERSION.is_empty());
        assert!(!BUILD_DATE.is_empty());
    }
}
