//! Motion classification for drawing.

use super::ViewOptions;
use crate::gcode::Motion;
use flowtower_core::constants::MOTION_EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentClass {
    Travel,
    Extrusion,
}

/// How a motion is drawn. A motion can draw a segment, a blob, both or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionClass {
    pub segment: Option<SegmentClass>,
    pub blob: bool,
}

pub fn classify(motion: &Motion, options: &ViewOptions) -> MotionClass {
    let segment = (motion.xy_distance > MOTION_EPSILON).then(|| {
        if motion.de > MOTION_EPSILON {
            SegmentClass::Extrusion
        } else {
            SegmentClass::Travel
        }
    });
    // Both bounds inclusive.
    let blob = motion.de >= options.blob_min_e && motion.xy_distance <= options.blob_max_xy;

    MotionClass { segment, blob }
}

/// Blob radius for an extruder delta: square root of the filament volume, scaled.
pub fn blob_radius(de: f64, options: &ViewOptions) -> f64 {
    (options.filament_area() * de).max(0.0).sqrt() * options.blob_scale
}
