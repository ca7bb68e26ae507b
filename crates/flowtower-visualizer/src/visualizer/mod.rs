//! 2D preview rendering
//!
//! Two replays of the same program: the first collects [`Extents`], the
//! second draws into a [`SceneBuilder`] laid out by the resulting
//! [`SceneFrame`].

pub mod classify;
pub mod options;
pub mod scene;
pub mod viewport;

pub use classify::{blob_radius, classify, MotionClass, SegmentClass};
pub use options::{StrokeStyle, ViewOptions};
pub use scene::{label_from_message, xml_escape, SceneBuilder};
pub use viewport::{Extents, SceneFrame};

use crate::gcode::replay;
use tracing::debug;

/// Renders programs with a fixed set of view options.
#[derive(Debug, Clone, Default)]
pub struct GcodeRenderer {
    options: ViewOptions,
}

impl GcodeRenderer {
    pub fn new(options: ViewOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Render a program to SVG markup. Never fails.
    pub fn render(&self, program: &str) -> String {
        let mut extents = Extents::new();
        replay(program, &mut extents);
        let frame = SceneFrame::new(&extents, &self.options);
        debug!("Scene frame {} x {}", frame.width, frame.height);

        let mut scene = SceneBuilder::new(&self.options, frame);
        replay(program, &mut scene);
        scene.finish()
    }
}
