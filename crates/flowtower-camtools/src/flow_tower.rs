//! Flow Tower Generator
//!
//! Lays a grid of calibration sites on the bed and writes one G-code program
//! per plate. Each site primes, wipes, then extrudes a single blob at a target
//! volumetric flow. The sweep of flow (and optionally temperature) values
//! continues across plates until every step has a site.

use flowtower_core::constants::{
    BLOB_BASE_Z_MM, FAN_PWM_MAX, HOME_LIFT_Z_MM, MAX_GRID_CELLS_PER_AXIS, MIN_BLOB_FEED_RATE,
    PRIME_Z_MM, SAFE_LIFT_MM, SECONDS_PER_MINUTE,
};
use flowtower_core::{format_number, round_to, GcodeWriter};
use flowtower_devicedb::{PrinterCatalog, PrinterProfile};
use flowtower_settings::{CalibrationSettings, Direction, SweepMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Comment written on the single plate produced when no site is usable.
pub const NO_SLOTS_COMMENT: &str =
    "; No available placement slots on this printer - check excluded areas";

const BANNER: &str = "; *** FlowTower flow pattern generator";

/// A usable grid cell on a plate. Column and row are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidatePosition {
    pub column: usize,
    pub row: usize,
    pub x: f64,
    pub y: f64,
}

/// Grid dimensions and plate accounting for one generator run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateLayout {
    pub max_columns: usize,
    pub max_rows: usize,
    pub candidates: Vec<CandidatePosition>,
    pub sites_per_plate: usize,
    pub plate_count: usize,
    pub total_steps: usize,
}

/// One generated build plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    /// 1-based plate number
    pub index: usize,
    pub gcode: String,
    /// Calibration sites placed on this plate
    pub steps: usize,
}

/// Flow and temperature of one position in the sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepEntry {
    pub global_index: usize,
    /// 1-based temperature column
    pub column: usize,
    /// 1-based row within the temperature column
    pub row: usize,
    pub temperature: f64,
    pub flow: f64,
}

/// Number of grid cells along an axis, at least one and at most
/// [`MAX_GRID_CELLS_PER_AXIS`].
fn grid_cells(span: f64, pitch: f64) -> usize {
    let cells = (span / pitch).floor();
    if pitch <= 0.0 || !cells.is_finite() || cells < 1.0 {
        return 1;
    }
    (cells as usize).min(MAX_GRID_CELLS_PER_AXIS)
}

pub struct FlowTowerGenerator {
    settings: CalibrationSettings,
    profile: PrinterProfile,
}

impl FlowTowerGenerator {
    pub fn new(settings: CalibrationSettings, profile: PrinterProfile) -> Self {
        Self { settings, profile }
    }

    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    pub fn profile(&self) -> &PrinterProfile {
        &self.profile
    }

    /// Compute grid size, usable sites and plate count.
    pub fn layout(&self) -> PlateLayout {
        let s = &self.settings;
        let margin_x = s.margin_x().abs();
        let margin_y = s.margin_y().abs();
        let pitch = s.column_pitch();

        let max_columns = grid_cells(s.bed_width - 2.0 * margin_x, pitch);
        let max_rows = grid_cells(s.bed_length - 2.0 * margin_y, s.y_spacing);

        // Mirrored rows reflect the back-to-front layout about y = 0.
        let (length, margin, spacing) = match s.direction {
            Direction::BackToFront => (s.bed_length, s.margin_y(), s.y_spacing),
            Direction::Mirrored => (0.0, -s.margin_y(), -s.y_spacing),
        };

        let mut candidates = Vec::new();
        for column in 1..=max_columns {
            let x = margin_x + (column - 1) as f64 * pitch;
            for row in 1..=max_rows {
                let y = length - margin - (row - 1) as f64 * spacing;
                if self.profile.is_excluded(x, y) {
                    trace!("Cell {},{} at ({}, {}) is excluded", column, row, x, y);
                    continue;
                }
                candidates.push(CandidatePosition { column, row, x, y });
            }
        }

        let sites_per_plate = candidates.len();
        let total_steps = s.total_steps();
        let plate_count = if sites_per_plate == 0 {
            1
        } else {
            total_steps.div_ceil(sites_per_plate).max(1)
        };

        debug!(
            "Layout for {}: {}x{} grid, {} sites per plate, {} steps on {} plate(s)",
            self.profile.model, max_columns, max_rows, sites_per_plate, total_steps, plate_count
        );

        PlateLayout {
            max_columns,
            max_rows,
            candidates,
            sites_per_plate,
            plate_count,
            total_steps,
        }
    }

    /// Flow and temperature for a global sweep index.
    pub fn sweep_entry(&self, global_index: usize) -> SweepEntry {
        let s = &self.settings;
        let flow_steps = s.flow_steps.max(1);
        let column = global_index / flow_steps + 1;
        let row = global_index % flow_steps + 1;
        let temperature = s.start_temp + (column - 1) as f64 * s.temp_offset;
        let flow = match s.sweep_mode() {
            SweepMode::Fill => s.start_flow + global_index as f64 * s.flow_offset,
            SweepMode::Matrix => s.start_flow + (row - 1) as f64 * s.flow_offset,
        };
        SweepEntry {
            global_index,
            column,
            row,
            temperature,
            flow,
        }
    }

    /// Blob extrusion feed rate (mm/min) for a flow, rounded to 2 decimals.
    pub fn blob_feed_rate(&self, flow: f64) -> f64 {
        let s = &self.settings;
        let extrusion_rate = flow / s.filament_area();
        let feed = s.blob_height * extrusion_rate / s.extrusion_amount * SECONDS_PER_MINUTE;
        let rounded = round_to(feed, 2);
        if rounded.is_finite() {
            rounded.max(MIN_BLOB_FEED_RATE)
        } else {
            MIN_BLOB_FEED_RATE
        }
    }

    /// Generate every plate of the sweep.
    pub fn generate(&self) -> Vec<Plate> {
        let layout = self.layout();

        if layout.sites_per_plate == 0 {
            warn!(
                "No placement slots left on {} after excluded areas",
                self.profile.model
            );
            let mut writer = self.header(1, 1);
            writer.blank();
            writer.line(NO_SLOTS_COMMENT);
            return vec![Plate {
                index: 1,
                gcode: writer.finish(),
                steps: 0,
            }];
        }

        (0..layout.plate_count)
            .map(|plate| self.plate(plate, &layout))
            .collect()
    }

    fn plate(&self, plate: usize, layout: &PlateLayout) -> Plate {
        let flow_steps = self.settings.flow_steps.max(1);
        let mut writer = self.header(plate + 1, layout.plate_count);
        let mut steps = 0;

        for (local, site) in layout.candidates.iter().enumerate() {
            let global = plate * layout.sites_per_plate + local;
            if global >= layout.total_steps {
                break;
            }
            let entry = self.sweep_entry(global);
            // A plate may be printed on its own, so its first site reheats even
            // when it continues the previous plate's column.
            if local == 0 || global % flow_steps == 0 {
                self.write_temperature_block(&mut writer, entry.temperature);
            }
            trace!(
                "Plate {} site {}: {}mm3/s at {}C ({}, {})",
                plate + 1,
                local,
                entry.flow,
                entry.temperature,
                site.x,
                site.y
            );
            self.write_site(&mut writer, site, &entry);
            steps += 1;
        }

        self.write_footer(&mut writer);
        Plate {
            index: plate + 1,
            gcode: writer.finish(),
            steps,
        }
    }

    fn header(&self, plate: usize, plate_count: usize) -> GcodeWriter {
        let s = &self.settings;
        let mut w = GcodeWriter::new();
        w.line(BANNER);
        w.comment(format!("Profile: {}", self.profile.model));
        w.comment(format!("Plate {} of {}", plate, plate_count));
        w.line(";####### Settings");
        for (key, value) in s.echo_entries() {
            w.comment(format!("{} = {}", key, value));
        }
        w.blank();

        let bed = format_number(s.bed_temp);
        let fan = (s.fan_speed * FAN_PWM_MAX / 100.0).round();
        w.line(format!(
            "M104 S{} ; Set Nozzle Temperature",
            format_number(s.start_temp)
        ));
        w.line(format!("M140 S{} ; Set Bed Temperature", bed));
        w.line("G90");
        w.line("G28 ; Home all axes");
        w.line(format!("G0 Z{} ; Lift nozzle", format_number(HOME_LIFT_Z_MM)));
        w.line("G21 ; Units in mm");
        w.line("G92 E0 ; Reset extruder");
        w.line("M83 ; Relative extrusion");
        w.line(format!("M190 S{} ; Wait for bed", bed));
        w.line(format!("M106 S{} ; Fan", format_number(fan)));
        w
    }

    fn write_temperature_block(&self, w: &mut GcodeWriter, temperature: f64) {
        let t = format_number(temperature);
        w.blank();
        w.line(format!(";####### {}C", t));
        w.line("G4 S0 ; Dwell");
        w.line(format!("M109 R{}", t));
    }

    fn write_site(&self, w: &mut GcodeWriter, site: &CandidatePosition, entry: &SweepEntry) {
        let s = &self.settings;
        let feed = format_number(self.blob_feed_rate(entry.flow));
        let flow = format_number(entry.flow);
        let travel = format_number(s.movement_speed * SECONDS_PER_MINUTE);
        let retract_feed = format_number(s.retraction_speed * SECONDS_PER_MINUTE);
        let blob_top = BLOB_BASE_Z_MM + s.blob_height;
        let safe_z = format_number(blob_top + SAFE_LIFT_MM);
        let x = format_number(site.x);
        let y = format_number(site.y);

        w.blank();
        w.line(format!(";####### {}mm3/s", flow));
        w.line(format!(
            "M117 {}°C // {}mm3/s; F{}mm/min",
            format_number(entry.temperature),
            flow,
            feed
        ));
        w.line(format!("G0 X{} Y{} Z{} F{}", x, y, safe_z, travel));
        w.line(format!(
            "G4 S{} ; Stabilize",
            format_number(s.stabilization_time)
        ));
        w.line(format!("G0 Z{}", format_number(PRIME_Z_MM)));
        w.line(format!(
            "G1 X{} E{} F{} ; Prime",
            format_number(site.x + s.prime_length),
            format_number(s.prime_amount),
            format_number(s.prime_speed * SECONDS_PER_MINUTE)
        ));
        w.line(format!(
            "G1 E{} F{} ; Retract",
            format_number(-s.retraction_distance),
            retract_feed
        ));
        w.line(format!(
            "G0 X{} F{} ; Wipe",
            format_number(site.x + s.prime_length + s.wipe_length),
            travel
        ));
        w.line(format!("G0 Z{}", format_number(BLOB_BASE_Z_MM)));
        w.line(format!(
            "G1 E{} F{} ; De-Retract",
            format_number(s.retraction_distance),
            retract_feed
        ));
        w.line(format!(
            "G1 Z{} E{} F{} ; Extrude F{}mm/min",
            format_number(blob_top),
            format_number(s.extrusion_amount),
            feed,
            feed
        ));
        w.line(format!(
            "G1 E{} F{} ; Retract",
            format_number(-s.retraction_distance),
            retract_feed
        ));
        w.line(format!("G0 Z{} ; Lift", safe_z));
        w.line(format!("G0 X{} Y{} F{}", x, y, travel));
        w.line("G92 E0");
    }

    fn write_footer(&self, w: &mut GcodeWriter) {
        let s = &self.settings;
        w.blank();
        w.line(";####### End G-Code");
        w.line(format!(
            "G0 X{} Y{}",
            format_number(s.bed_width - s.margin_x().abs()),
            format_number(s.bed_length - s.margin_y().abs())
        ));
        w.line("M104 S0 T0");
        w.line("M140 S0");
        w.line("M84");
    }
}

/// Generate plates for a printer of the built-in catalog.
///
/// An index outside the catalog uses the empty profile. The settings are used
/// as given; apply [`PrinterProfile::settings_overlay`] beforehand to pick up
/// the printer's bed size and margins.
pub fn generate(printer_index: usize, settings: &CalibrationSettings) -> Vec<Plate> {
    let profile = PrinterCatalog::builtin()
        .profile_or_unknown(printer_index)
        .clone();
    FlowTowerGenerator::new(settings.clone(), profile).generate()
}
