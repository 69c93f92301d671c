//! Per-file metadata: pixel dimensions and size on disk

use image::ImageReader;
use std::fs;
use std::path::Path;

use crate::error::ScanError;

/// Read the image dimensions from the file header.
///
/// Only the header is decoded. Unreadable or corrupt files report `(0, 0)`
/// and never fail the scan.
pub fn read_dimensions(path: &Path) -> (u32, u32) {
    match read_header(path) {
        Ok(dimensions) => dimensions,
        Err(e) => {
            tracing::debug!("Could not read dimensions of {}: {}", path.display(), e);
            (0, 0)
        }
    }
}

fn read_header(path: &Path) -> image::ImageResult<(u32, u32)> {
    // Sniff the content so a mislabeled extension still reads correctly
    ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()
}

/// Size of the file in bytes. The file was already seen in the listing, so a
/// failure here aborts the scan.
pub fn file_size(path: &Path) -> Result<u64, ScanError> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|e| ScanError::io(path, e))
}
