use flowtower_camtools::{FlowTowerGenerator, PlateBundle, NO_SLOTS_COMMENT};
use flowtower_devicedb::{BuildVolume, ExcludedArea, PrinterCatalog, PrinterProfile};
use flowtower_settings::{resolve, CalibrationSettings, RawSettings};
use proptest::prelude::*;
use serde_json::json;

fn bed_180() -> PrinterProfile {
    PrinterProfile::new("Bench 180", BuildVolume::new(180.0, 180.0, 180.0))
}

fn e2e_settings() -> CalibrationSettings {
    let raw = RawSettings::from_json_value(json!({
        "bedWidth": 180,
        "bedLength": 180,
        "bedMarginX": 10,
        "bedMarginY": 10,
        "startFlow": 8,
        "offset": 2,
        "steps": 20,
        "xSpacing": 20,
        "ySpacing": 20,
        "primeLength": 25,
        "wipeLength": 15,
    }))
    .unwrap();
    resolve(&raw)
}

#[test]
fn test_small_bed_sweep_spans_plates() {
    let generator = FlowTowerGenerator::new(e2e_settings(), bed_180());
    let layout = generator.layout();
    let plates = generator.generate();

    assert_eq!(plates.len(), 20usize.div_ceil(layout.sites_per_plate));
    assert_eq!(plates.iter().map(|p| p.steps).sum::<usize>(), 20);
    assert_eq!(
        plates.iter().map(|p| p.index).collect::<Vec<_>>(),
        (1..=plates.len()).collect::<Vec<_>>()
    );

    let first_flow = plates[0]
        .gcode
        .lines()
        .find_map(|line| line.strip_prefix(";####### ")?.strip_suffix("mm3/s"))
        .unwrap();
    assert_eq!(first_flow, "8");
}

#[test]
fn test_fully_excluded_bed() {
    let profile = bed_180().with_excluded_area(ExcludedArea::new(0.0, 0.0, 180.0, 180.0));
    let plates = FlowTowerGenerator::new(e2e_settings(), profile).generate();

    assert_eq!(plates.len(), 1);
    assert_eq!(plates[0].steps, 0);
    assert!(plates[0].gcode.contains(NO_SLOTS_COMMENT));
    assert!(!plates[0].gcode.contains("M117"));
    assert!(!plates[0].gcode.contains(";####### End G-Code"));
    assert!(plates[0].gcode.contains("M106 S0 ; Fan"));
}

#[test]
fn test_moving_excluded_area_only_touches_covered_cells() {
    let area_a = ExcludedArea::new(0.0, 150.0, 20.0, 30.0);
    let area_b = ExcludedArea::new(60.0, 0.0, 20.0, 30.0);
    let layout_a =
        FlowTowerGenerator::new(e2e_settings(), bed_180().with_excluded_area(area_a)).layout();
    let layout_b =
        FlowTowerGenerator::new(e2e_settings(), bed_180().with_excluded_area(area_b)).layout();

    let outside = |x: f64, y: f64| !area_a.contains(x, y) && !area_b.contains(x, y);
    let keep_a: Vec<_> = layout_a.candidates.iter().filter(|c| outside(c.x, c.y)).collect();
    let keep_b: Vec<_> = layout_b.candidates.iter().filter(|c| outside(c.x, c.y)).collect();
    assert_eq!(keep_a, keep_b);
    assert!(layout_a.candidates.iter().all(|c| !area_a.contains(c.x, c.y)));
    assert!(layout_b.candidates.iter().all(|c| !area_b.contains(c.x, c.y)));
}

#[test]
fn test_builtin_x1_skips_corner() {
    let catalog = PrinterCatalog::builtin();
    let (_, profile) = catalog.find_by_model("X1/P1").unwrap();

    let mut raw = profile.settings_overlay();
    raw.insert("direction", 1);
    let settings = resolve(&raw);

    let layout = FlowTowerGenerator::new(settings, profile.clone()).layout();
    assert!(layout.candidates.iter().all(|c| !profile.is_excluded(c.x, c.y)));
    assert_eq!(layout.sites_per_plate, layout.max_columns * layout.max_rows - 1);
}

#[test]
fn test_every_line_uses_dot_decimals() {
    let mut settings = e2e_settings();
    settings.filament_diameter = 2.85;
    settings.flow_offset = 0.1;
    let plates = FlowTowerGenerator::new(settings, bed_180()).generate();
    for plate in &plates {
        assert!(!plate.gcode.contains(','));
        assert!(!plate.gcode.contains("NaN"));
        assert!(!plate.gcode.contains("inf"));
    }
}

#[test]
fn test_bundle_names_follow_plates() {
    let plates = FlowTowerGenerator::new(e2e_settings(), bed_180()).generate();
    let bundle = PlateBundle::from_plates("Bench 180", &plates);
    let names: Vec<_> = bundle.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "flow-test-Bench-180-plate-1.gcode",
            "flow-test-Bench-180-plate-2.gcode"
        ]
    );
    assert!(!bundle.to_zip_bytes().unwrap().is_empty());
}

fn arb_settings() -> impl Strategy<Value = CalibrationSettings> {
    (
        50.0..400.0f64,
        50.0..400.0f64,
        0.0..30.0f64,
        5.0..60.0f64,
        0usize..60,
        0usize..4,
        prop_oneof![Just(0.0), -10.0..10.0f64],
    )
        .prop_map(|(width, length, margin, spacing, flow_steps, temp_steps, temp_offset)| {
            CalibrationSettings {
                bed_width: width,
                bed_length: length,
                bed_margin: Some(margin),
                y_spacing: spacing,
                flow_steps,
                temp_steps,
                temp_offset,
                ..CalibrationSettings::default()
            }
        })
}

proptest! {
    #[test]
    fn prop_steps_are_fully_accounted(settings in arb_settings()) {
        let generator = FlowTowerGenerator::new(settings.clone(), bed_180());
        let layout = generator.layout();
        let plates = generator.generate();

        prop_assert!(!plates.is_empty());
        prop_assert!(layout.max_columns >= 1 && layout.max_rows >= 1);
        let placed: usize = plates.iter().map(|p| p.steps).sum();
        let capacity = layout.sites_per_plate * layout.plate_count;
        prop_assert_eq!(placed, settings.total_steps().min(capacity));
        prop_assert!(plates.iter().all(|p| p.steps <= layout.sites_per_plate));
    }

    #[test]
    fn prop_generation_is_deterministic(settings in arb_settings()) {
        let first = FlowTowerGenerator::new(settings.clone(), bed_180()).generate();
        let second = FlowTowerGenerator::new(settings, bed_180()).generate();
        prop_assert_eq!(first, second);
    }
}
