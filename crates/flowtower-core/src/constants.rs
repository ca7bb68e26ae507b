//! Constants shared between the generator and the renderer.

/// Height (mm) the nozzle returns to between calibration sites, above the blob top.
pub const SAFE_LIFT_MM: f64 = 5.0;

/// Base Z (mm) of every blob, and the height the nozzle drops to after the wipe.
pub const BLOB_BASE_Z_MM: f64 = 0.5;

/// Z (mm) used while priming.
pub const PRIME_Z_MM: f64 = 0.3;

/// Z (mm) the nozzle lifts to after homing.
pub const HOME_LIFT_Z_MM: f64 = 10.0;

/// Lowest feed rate (mm/min) ever written for a blob extrusion.
pub const MIN_BLOB_FEED_RATE: f64 = 1.0;

/// Upper bound on grid cells along one axis of a plate.
pub const MAX_GRID_CELLS_PER_AXIS: usize = 1000;

/// Motion below this XY distance (mm) or extrusion delta draws nothing.
pub const MOTION_EPSILON: f64 = 1e-6;

/// Seconds per minute, for mm/s to mm/min conversions.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Full-scale value of the part cooling fan PWM.
pub const FAN_PWM_MAX: f64 = 255.0;

/// Upper bound on flow or temperature steps accepted from settings.
pub const MAX_SWEEP_STEPS: usize = 100_000;
