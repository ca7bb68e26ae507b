//! Settings through generation to preview, the way the CLI chains them

use flowtower_camtools::{archive_file_name, plate_file_name, FlowTowerGenerator, PlateBundle};
use flowtower_devicedb::{PrinterCatalog, PrinterProfile};
use flowtower_settings::{load_raw_settings, resolve, CalibrationSettings, RawSettings};
use flowtower_visualizer::{render, StrokeStyle, ViewOptions};
use std::io::{Cursor, Read};
use tempfile::TempDir;

fn a1_mini() -> PrinterProfile {
    let catalog = PrinterCatalog::builtin();
    let index = catalog.select("a1 mini").unwrap();
    catalog.profile_or_unknown(index).clone()
}

fn settings_for(profile: &PrinterProfile, layers: &[&RawSettings]) -> CalibrationSettings {
    let mut raw = profile.settings_overlay();
    for layer in layers {
        raw.merge(layer);
    }
    resolve(&raw)
}

fn view_for(settings: &CalibrationSettings) -> ViewOptions {
    ViewOptions {
        bed_width: settings.bed_width,
        bed_length: settings.bed_length,
        margin: settings.margin_x().max(settings.margin_y()),
        filament_diameter: settings.filament_diameter,
        travel: StrokeStyle::new("#ffff0050", 0.6),
        ..ViewOptions::default()
    }
}

#[test]
fn test_generated_plate_previews_every_site() {
    let profile = a1_mini();
    let settings = settings_for(&profile, &[]);
    assert_eq!(settings.bed_width, 180.0);

    let generator = FlowTowerGenerator::new(settings, profile);
    let plates = generator.generate();
    assert_eq!(plates.len(), 1);
    assert_eq!(plates[0].steps, 10);

    let svg = render(&plates[0].gcode, &view_for(generator.settings()));

    assert!(svg.contains("viewBox=\"0 0 200 200\""));
    assert_eq!(svg.matches("<circle").count(), 10);
    assert_eq!(svg.matches("<text").count(), 10);
    assert!(svg.contains(">F 2 - FR "));
    assert!(svg.contains("stroke=\"#ffff0050\""));
}

#[test]
fn test_overrides_split_into_plates_and_archive() {
    let profile = a1_mini();
    let mut overrides = RawSettings::new();
    overrides.set_from_pair("flowSteps=40").unwrap();
    overrides.set_from_pair("startFlow=8").unwrap();
    let settings = settings_for(&profile, &[&overrides]);

    let generator = FlowTowerGenerator::new(settings, profile);
    let layout = generator.layout();
    let plates = generator.generate();
    assert_eq!(plates.len(), 40usize.div_ceil(layout.sites_per_plate));
    assert_eq!(plates.iter().map(|p| p.steps).sum::<usize>(), 40);

    let model = generator.profile().model.as_str();
    let bytes = PlateBundle::from_plates(model, &plates)
        .to_zip_bytes()
        .unwrap();
    assert_eq!(archive_file_name(model), "flow-test-A1-Mini.zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), plates.len());
    let mut first = String::new();
    archive
        .by_name(&plate_file_name(model, 1, plates.len()))
        .unwrap()
        .read_to_string(&mut first)
        .unwrap();
    assert_eq!(first, plates[0].gcode);
}

#[test]
fn test_settings_file_sits_between_profile_and_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "bedWidth = 150\nstartFlow = 4\nfanSpeed = 50\n").unwrap();

    let file = load_raw_settings(&path).unwrap();
    let mut overrides = RawSettings::new();
    overrides.set_from_pair("startFlow=6,5").unwrap();

    let settings = settings_for(&a1_mini(), &[&file, &overrides]);
    assert_eq!(settings.bed_width, 150.0);
    assert_eq!(settings.bed_length, 180.0);
    assert_eq!(settings.fan_speed, 50.0);
    assert_eq!(settings.start_flow, 6.5);
}
