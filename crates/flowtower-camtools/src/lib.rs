//! # FlowTower CAM Tools
//!
//! Calibration program generation:
//! - Flow/temperature tower layout and G-code ([`flow_tower`])
//! - Packaging of generated plates into a single archive ([`plate_bundle`])

pub mod error;
pub mod flow_tower;
pub mod plate_bundle;

pub use error::{CamToolError, CamToolResult};
pub use flow_tower::{
    generate, CandidatePosition, FlowTowerGenerator, Plate, PlateLayout, SweepEntry,
    NO_SLOTS_COMMENT,
};
pub use plate_bundle::{archive_file_name, model_slug, plate_file_name, BundleEntry, PlateBundle};
