//! # FlowTower Core
//!
//! Shared building blocks for the FlowTower crates:
//! - Generator and renderer constants
//! - Locale-safe G-code number formatting
//! - Lenient number parsing used for settings and program text
//! - Minimal 2D geometry (points and closed rectangles)

pub mod constants;
pub mod gcode_format;
pub mod geometry;
pub mod number;

pub use gcode_format::{format_number, round_to, GcodeWriter};
pub use geometry::{Point2D, Rect};
pub use number::{parse_lenient, parse_number_prefix};
