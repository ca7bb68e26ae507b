//! Error types for the printer database crate.
//!
//! This module provides structured error types for catalog loading and
//! profile normalization.

use std::io;
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The requested profile was not found.
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Failed to load profiles from storage.
    #[error("Failed to load profiles: {0}")]
    LoadError(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A profile validation error occurred.
    #[error("Validation error: {0}")]
    Validation(#[from] ProfileError),
}

/// Errors related to the shape of a raw printer profile.
#[derive(Error, Debug, PartialEq)]
pub enum ProfileError {
    /// A required field is missing or empty.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// The build volume has no usable dimensions.
    #[error("Invalid build volume: {0}")]
    InvalidBuildVolume(String),

    /// An excluded area entry is malformed.
    #[error("Invalid excluded area #{index}: {reason}")]
    InvalidExcludedArea { index: usize, reason: String },
}

/// Result type alias for catalog operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Result type alias for profile validation operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_display() {
        let err = DeviceError::ProfileNotFound("Ender 3".to_string());
        assert_eq!(err.to_string(), "Profile not found: Ender 3");

        let err = DeviceError::LoadError("expected an array".to_string());
        assert_eq!(err.to_string(), "Failed to load profiles: expected an array");
    }

    #[test]
    fn test_profile_error_display() {
        let err = ProfileError::MissingField("model".to_string());
        assert_eq!(err.to_string(), "Missing required field: model");

        let err = ProfileError::InvalidExcludedArea {
            index: 2,
            reason: "missing width".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid excluded area #2: missing width");
    }

    #[test]
    fn test_error_conversion() {
        let profile_err = ProfileError::InvalidBuildVolume("negative width".to_string());
        let device_err: DeviceError = profile_err.into();
        assert!(matches!(device_err, DeviceError::Validation(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let device_err: DeviceError = io_err.into();
        assert!(matches!(device_err, DeviceError::IoError(_)));
    }
}
