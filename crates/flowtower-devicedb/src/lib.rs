//! Printer profiles: the built-in catalog, the raw-profile loader, and the
//! overlay a selected printer applies to calibration settings.

pub mod catalog;
pub mod error;
pub mod loader;
pub mod model;

pub use catalog::PrinterCatalog;
pub use error::{DeviceError, DeviceResult, ProfileError, ProfileResult};
pub use loader::normalize_profile;
pub use model::{BuildVolume, ExcludedArea, PrinterProfile};
