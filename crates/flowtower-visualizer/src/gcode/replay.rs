//! Program replay
//!
//! [`replay`] walks a program once, updates a [`MachineState`] and reports
//! what happened to a [`ReplaySink`]. Bounding-box collection and scene
//! drawing are both sinks over the same transition logic.

use super::{parse_line, Command, MachineState, ParsedLine};
use flowtower_core::Point2D;
use tracing::{debug, trace};

/// One G0/G1 move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// XY position before the move
    pub start: Point2D,
    /// XY position after the move
    pub end: Point2D,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    /// Extruder delta (positive extrudes)
    pub de: f64,
    pub xy_distance: f64,
    pub rapid: bool,
}

/// Observer of a replay. All methods default to doing nothing.
pub trait ReplaySink {
    fn on_motion(&mut self, _motion: &Motion) {}

    /// Called after G92 has applied, with the updated state.
    fn on_position_set(&mut self, _state: &MachineState) {}

    fn on_status_message(&mut self, _message: &str) {}
}

impl ReplaySink for () {}

/// Keep the current value when a target would leave the finite range.
fn finite_or(target: f64, current: f64) -> f64 {
    if target.is_finite() {
        target
    } else {
        current
    }
}

fn set_position(state: &mut MachineState, line: &ParsedLine) {
    for word in &line.words {
        match word.letter {
            'X' => state.x = word.value,
            'Y' => state.y = word.value,
            'Z' => state.z = word.value,
            'E' => state.e = word.value,
            _ => {}
        }
    }
}

fn linear_move(state: &mut MachineState, line: &ParsedLine, rapid: bool) -> Motion {
    let mut target = *state;
    for word in &line.words {
        match word.letter {
            'X' => target.x = finite_or(state.axis_target(state.x, word.value), state.x),
            'Y' => target.y = finite_or(state.axis_target(state.y, word.value), state.y),
            'Z' => target.z = finite_or(state.axis_target(state.z, word.value), state.z),
            'E' => target.e = finite_or(state.extruder_target(word.value), state.e),
            _ => {}
        }
    }

    let dx = target.x - state.x;
    let dy = target.y - state.y;
    let motion = Motion {
        start: state.position(),
        end: target.position(),
        dx,
        dy,
        dz: target.z - state.z,
        de: target.e - state.e,
        xy_distance: dx.hypot(dy),
        rapid,
    };
    *state = target;
    motion
}

/// Replay `program` into `sink` and return the final machine state.
///
/// Never fails: comments are stripped, blank lines skipped and unknown
/// commands ignored.
pub fn replay<S: ReplaySink + ?Sized>(program: &str, sink: &mut S) -> MachineState {
    let mut state = MachineState::new();
    let mut motions = 0usize;

    for raw in program.lines() {
        let Some(line) = parse_line(raw) else {
            continue;
        };

        match &line.command {
            Command::AbsolutePositioning => state.absolute_positioning = true,
            Command::RelativePositioning => state.absolute_positioning = false,
            Command::AbsoluteExtrusion => state.absolute_extrusion = true,
            Command::RelativeExtrusion => state.absolute_extrusion = false,
            Command::SetPosition => {
                set_position(&mut state, &line);
                sink.on_position_set(&state);
            }
            Command::LinearMove { rapid } => {
                let motion = linear_move(&mut state, &line, *rapid);
                sink.on_motion(&motion);
                motions += 1;
            }
            Command::StatusMessage => {
                if let Some(message) = &line.message {
                    sink.on_status_message(message);
                }
            }
            Command::Other(mnemonic) => trace!("Ignoring {}", mnemonic),
        }
    }

    debug!("Replayed {} motions", motions);
    state
}
