//! # FlowTower Visualizer
//!
//! Replays a G-code program through a small machine state model and renders
//! a schematic top-down SVG preview of it. The renderer knows nothing about
//! how the program was produced; any program using G0/G1, G90/G91, M82/M83,
//! G92 and M117 can be previewed.

pub mod gcode;
pub mod visualizer;

pub use gcode::{
    parse_line, replay, strip_comment, Command, MachineState, Motion, ParsedLine, ReplaySink,
    Word,
};
pub use visualizer::{
    classify, Extents, GcodeRenderer, MotionClass, SceneBuilder, SceneFrame, SegmentClass,
    StrokeStyle, ViewOptions,
};

/// Render a program to SVG markup.
pub fn render(program: &str, options: &ViewOptions) -> String {
    GcodeRenderer::new(options.clone()).render(program)
}
