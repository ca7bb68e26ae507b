use flowtower_core::Point2D;
use serde::{Deserialize, Serialize};

/// Interpreter state: position, extruder position and the two distance modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Cumulative extruder position
    pub e: f64,
    /// G90 when true, G91 when false (X/Y/Z)
    pub absolute_positioning: bool,
    /// M82 when true, M83 when false (E)
    pub absolute_extrusion: bool,
}

impl Default for MachineState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            e: 0.0,
            absolute_positioning: true,
            absolute_extrusion: true,
        }
    }
}

impl MachineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Target for a positioning axis given a word value.
    pub fn axis_target(&self, current: f64, value: f64) -> f64 {
        if self.absolute_positioning {
            value
        } else {
            current + value
        }
    }

    /// Target extruder position given an `E` word value.
    pub fn extruder_target(&self, value: f64) -> f64 {
        if self.absolute_extrusion {
            value
        } else {
            self.e + value
        }
    }
}
