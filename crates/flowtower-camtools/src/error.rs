//! Error types for the CAM tools crate.
//!
//! Generation itself is infallible; these errors come from packaging plates.

use std::io;
use thiserror::Error;

/// Errors that can occur during CAM tool operations.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// Writing the plate archive failed.
    #[error("Archive error: {0}")]
    ArchiveError(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;
