//! SVG scene assembly
//!
//! Layers are emitted bottom to top: bed, grid, travel moves, extrusion
//! moves, blobs, labels.

use super::classify::{blob_radius, classify, SegmentClass};
use super::{SceneFrame, ViewOptions};
use crate::gcode::{Motion, ReplaySink};
use flowtower_core::constants::MAX_GRID_CELLS_PER_AXIS;
use flowtower_core::{format_number, Point2D};
use regex::Regex;
use std::sync::OnceLock;

const BED_FILL: &str = "#3f3f46";
const GRID_STROKE: &str = "#4b4b53";
const GRID_STROKE_WIDTH: f64 = 0.3;
const LABEL_FILL: &str = "#FFF";
const LABEL_OFFSET_X: f64 = 2.0;
const LABEL_OFFSET_Y: f64 = 10.0;

/// Escape text for use in SVG content or attribute values.
pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Build a site label from a status message.
///
/// Picks up a flow (`8mm3/s`) and a feed rate (`F24.95mm/min`) and renders
/// them as `F 8 - FR 24.95`. Messages carrying neither give `None`.
pub fn label_from_message(message: &str) -> Option<String> {
    static FLOW_REGEX: OnceLock<Regex> = OnceLock::new();
    static FEED_REGEX: OnceLock<Regex> = OnceLock::new();
    let flow = FLOW_REGEX.get_or_init(|| {
        Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*mm3/s").expect("invalid regex pattern")
    });
    let feed = FEED_REGEX.get_or_init(|| {
        Regex::new(r"(?i)F\s*([0-9]+(?:\.[0-9]+)?)\s*mm/min").expect("invalid regex pattern")
    });

    let mut parts = Vec::new();
    if let Some(caps) = flow.captures(message) {
        parts.push(format!("F {}", &caps[1]));
    }
    if let Some(caps) = feed.captures(message) {
        parts.push(format!("FR {}", &caps[1]));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" - "))
    }
}

/// Replay sink that draws the preview.
pub struct SceneBuilder<'a> {
    options: &'a ViewOptions,
    frame: SceneFrame,
    travel: Vec<String>,
    extrusion: Vec<String>,
    blobs: Vec<String>,
    labels: Vec<String>,
    pending_label: Option<String>,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(options: &'a ViewOptions, frame: SceneFrame) -> Self {
        Self {
            options,
            frame,
            travel: Vec::new(),
            extrusion: Vec::new(),
            blobs: Vec::new(),
            labels: Vec::new(),
            pending_label: None,
        }
    }

    pub fn frame(&self) -> &SceneFrame {
        &self.frame
    }

    fn segment(&mut self, motion: &Motion, class: SegmentClass) {
        let (style, layer) = match class {
            SegmentClass::Travel => (&self.options.travel, &mut self.travel),
            SegmentClass::Extrusion => (&self.options.extrusion, &mut self.extrusion),
        };
        let from = self.frame.to_scene(motion.start);
        let to = self.frame.to_scene(motion.end);
        layer.push(format!(
            r#"<line stroke-dasharray="2 1" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="round"/>"#,
            format_number(from.x),
            format_number(from.y),
            format_number(to.x),
            format_number(to.y),
            xml_escape(&style.color),
            format_number(style.width)
        ));
    }

    fn blob(&mut self, at: Point2D, de: f64) {
        let center = self.frame.to_scene(at);
        let style = &self.options.blob;
        self.blobs.push(format!(
            r#"<circle cx="{}" cy="{}" r="{:.3}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            format_number(center.x),
            format_number(center.y),
            blob_radius(de, self.options),
            xml_escape(&style.color),
            format_number(style.width)
        ));
    }

    fn label(&mut self, at: Point2D, text: &str) {
        let anchor = self.frame.to_scene(at);
        self.labels.push(format!(
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" fill="{}">{}</text>"#,
            format_number(anchor.x + LABEL_OFFSET_X),
            format_number(anchor.y + LABEL_OFFSET_Y),
            xml_escape(&self.options.font_family),
            format_number(self.options.font_size),
            LABEL_FILL,
            xml_escape(text)
        ));
    }

    fn bed_and_grid(&self) -> Vec<String> {
        let o = self.options;
        let m = o.margin;
        let mut elements = vec![
            format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                format_number(m),
                format_number(m),
                format_number(o.bed_width),
                format_number(o.bed_length),
                BED_FILL
            ),
            format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                format_number(m),
                format_number(m + o.bed_length),
                format_number(o.bed_width / 2.0),
                format_number(o.bed_length / 25.0),
                BED_FILL
            ),
        ];

        if o.grid_step > 0.0 {
            let line = |x1: f64, y1: f64, x2: f64, y2: f64| {
                format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
                    format_number(x1),
                    format_number(y1),
                    format_number(x2),
                    format_number(y2),
                    GRID_STROKE,
                    format_number(GRID_STROKE_WIDTH)
                )
            };
            for x in grid_positions(m, o.bed_width, o.grid_step) {
                elements.push(line(x, m, x, m + o.bed_length));
            }
            for y in grid_positions(m, o.bed_length, o.grid_step) {
                elements.push(line(m, y, m + o.bed_width, y));
            }
        }
        elements
    }

    /// Assemble the SVG document.
    pub fn finish(self) -> String {
        let mut elements = self.bed_and_grid();
        elements.extend(self.travel);
        elements.extend(self.extrusion);
        elements.extend(self.blobs);
        elements.extend(self.labels);

        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"600px\" viewBox=\"0 0 {} {}\">\n{}\n</svg>",
            format_number(self.frame.width),
            format_number(self.frame.height),
            elements.join("\n")
        )
    }
}

/// Grid line positions from `start` across `span`, one per `step`.
fn grid_positions(start: f64, span: f64, step: f64) -> impl Iterator<Item = f64> {
    let end = start + span + 0.001;
    (0..=MAX_GRID_CELLS_PER_AXIS)
        .map(move |i| start + i as f64 * step)
        .take_while(move |position| *position <= end)
}

impl ReplaySink for SceneBuilder<'_> {
    fn on_motion(&mut self, motion: &Motion) {
        let class = classify(motion, self.options);
        if let Some(segment) = class.segment {
            self.segment(motion, segment);
            if let Some(text) = self.pending_label.take() {
                self.label(motion.end, &text);
            }
        }
        if class.blob {
            self.blob(motion.start, motion.de);
        }
    }

    fn on_status_message(&mut self, message: &str) {
        if let Some(label) = label_from_message(message) {
            self.pending_label = Some(label);
        }
    }
}
