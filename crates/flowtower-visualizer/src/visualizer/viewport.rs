//! Scene extents and the program-to-scene transform.

use super::ViewOptions;
use crate::gcode::{MachineState, Motion, ReplaySink};
use flowtower_core::constants::MOTION_EPSILON;
use flowtower_core::Point2D;

/// Bounding box accumulator over visited XY positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for Extents {
    fn default() -> Self {
        Self::new()
    }
}

impl Extents {
    /// Extents holding the machine origin, where every replay starts.
    pub fn new() -> Self {
        let mut extents = Self::empty();
        extents.mark(Point2D::new(0.0, 0.0));
        extents
    }

    /// Extents holding no point at all.
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn mark(&mut self, point: Point2D) {
        if !point.x.is_finite() || !point.y.is_finite() {
            return;
        }
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl ReplaySink for Extents {
    fn on_motion(&mut self, motion: &Motion) {
        if motion.xy_distance > MOTION_EPSILON {
            self.mark(motion.start);
            self.mark(motion.end);
        }
    }

    fn on_position_set(&mut self, state: &MachineState) {
        self.mark(state.position());
    }
}

/// Scene size and the transform from program coordinates into it.
///
/// Y is flipped so program Y grows upward in the preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub min_x: f64,
    pub max_y: f64,
}

impl SceneFrame {
    /// Size the scene to hold both the bed and the program extents.
    ///
    /// Empty extents fall back to the bed rectangle.
    pub fn new(extents: &Extents, options: &ViewOptions) -> Self {
        let bounds = if extents.is_empty() {
            let mut bed = Extents::empty();
            bed.mark(Point2D::new(0.0, 0.0));
            bed.mark(Point2D::new(options.bed_width, options.bed_length));
            bed
        } else {
            *extents
        };

        let width = options.bed_width.max(bounds.width()) + 2.0 * options.margin;
        let height = options.bed_length.max(bounds.height()) + 2.0 * options.margin;

        Self {
            width,
            height,
            margin: options.margin,
            min_x: bounds.min_x,
            max_y: bounds.max_y,
        }
    }

    pub fn to_scene_x(&self, x: f64) -> f64 {
        self.margin - self.min_x + x
    }

    pub fn to_scene_y(&self, y: f64) -> f64 {
        self.margin + (self.max_y - y)
    }

    pub fn to_scene(&self, point: Point2D) -> Point2D {
        Point2D::new(self.to_scene_x(point.x), self.to_scene_y(point.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::replay;

    #[test]
    fn test_origin_always_included() {
        let mut extents = Extents::new();
        replay("G0 X50 Y60\nG0 X70 Y80", &mut extents);
        assert_eq!(extents.min_x, 0.0);
        assert_eq!(extents.min_y, 0.0);
        assert_eq!(extents.max_x, 70.0);
        assert_eq!(extents.max_y, 80.0);
    }

    #[test]
    fn test_z_only_motion_not_marked() {
        let mut extents = Extents::new();
        replay("G92 X10 Y10\nG1 Z50 E30", &mut extents);
        assert_eq!(extents.max_x, 10.0);
        assert_eq!(extents.max_y, 10.0);

        let mut extents = Extents::new();
        replay("G1 Z5", &mut extents);
        assert_eq!(extents.width(), 0.0);
    }

    #[test]
    fn test_empty_extents_use_bed() {
        let options = ViewOptions::default();
        let frame = SceneFrame::new(&Extents::empty(), &options);
        assert_eq!(frame.width, 230.0);
        assert_eq!(frame.height, 230.0);
        assert_eq!(frame.max_y, 220.0);
    }

    #[test]
    fn test_frame_transform() {
        let options = ViewOptions::default();
        let mut extents = Extents::new();
        extents.mark(Point2D::new(-10.0, 300.0));
        let frame = SceneFrame::new(&extents, &options);

        assert_eq!(frame.width, 230.0);
        assert_eq!(frame.height, 310.0);
        assert_eq!(frame.to_scene_x(-10.0), 5.0);
        assert_eq!(frame.to_scene_y(300.0), 5.0);
        assert_eq!(frame.to_scene(Point2D::new(0.0, 0.0)), Point2D::new(15.0, 305.0));
    }
}
