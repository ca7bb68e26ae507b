//! Plate archive packaging
//!
//! Generated plates are written either as individual `.gcode` files or as a
//! single ZIP archive. Archive entries are stored uncompressed with a fixed
//! timestamp, so the same plates always produce the same bytes.

use crate::error::{CamToolError, CamToolResult};
use crate::flow_tower::Plate;
use regex::Regex;
use std::io::{Cursor, Write};
use std::sync::OnceLock;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// File-name-safe form of a printer model.
///
/// Runs of characters outside `[A-Za-z0-9_-]` become a single `-`; leading and
/// trailing dashes are dropped. An empty result becomes `printer`.
pub fn model_slug(model: &str) -> String {
    static UNSAFE_RUN: OnceLock<Regex> = OnceLock::new();
    let unsafe_run = UNSAFE_RUN
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("invalid regex pattern"));

    let replaced = unsafe_run.replace_all(model, "-");
    let slug = replaced.trim_matches('-');
    if slug.is_empty() {
        "printer".to_string()
    } else {
        slug.to_string()
    }
}

/// Name of one plate file. Single-plate runs carry no plate suffix.
pub fn plate_file_name(model: &str, plate: usize, plate_count: usize) -> String {
    let slug = model_slug(model);
    if plate_count <= 1 {
        format!("flow-test-{}.gcode", slug)
    } else {
        format!("flow-test-{}-plate-{}.gcode", slug, plate)
    }
}

/// Name of the archive holding every plate.
pub fn archive_file_name(model: &str) -> String {
    format!("flow-test-{}.zip", model_slug(model))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BundleEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Ordered set of named files to package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlateBundle {
    pub entries: Vec<BundleEntry>,
}

impl PlateBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per plate, named with [`plate_file_name`].
    pub fn from_plates(model: &str, plates: &[Plate]) -> Self {
        let mut bundle = Self::new();
        for plate in plates {
            bundle.push(
                plate_file_name(model, plate.index, plates.len()),
                plate.gcode.as_bytes().to_vec(),
            );
        }
        bundle
    }

    pub fn push(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.entries.push(BundleEntry {
            name: name.into(),
            bytes,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write all entries into an in-memory ZIP archive.
    pub fn to_zip_bytes(&self) -> CamToolResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default());

        for entry in &self.entries {
            zip.start_file(entry.name.as_str(), options)
                .map_err(|e| CamToolError::ArchiveError(e.to_string()))?;
            zip.write_all(&entry.bytes)?;
        }
        zip.finish()
            .map_err(|e| CamToolError::ArchiveError(e.to_string()))?;

        let bytes = buffer.into_inner();
        debug!("Packed {} entries into {} bytes", self.entries.len(), bytes.len());
        Ok(bytes)
    }
}
