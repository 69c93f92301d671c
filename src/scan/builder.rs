//! Group builder
//!
//! Turns the classifier's subject map into the ordered comparison document:
//! one group per subject, origin image first, variants sorted by label.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::classify::{scan_directory, ClassifiedFile};
use super::metadata::{file_size, read_dimensions};
use crate::config::ScanOptions;
use crate::error::ScanError;

/// Substring of a file reference that marks the source image
const ORIGIN_FILE_MARKER: &str = "_origin.";

/// One image in the comparison document
///
/// Serialized as one object of `data.json`; keys keep the field order
/// below and `elapsedTime` is left out entirely when absent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    /// Display name shown by the viewer
    /// - `"<subject> (<marker>)"` for the origin image
    /// - the workflow name verbatim for every variant
    pub label: String,

    /// Route-relative reference, e.g. `/images/1_origin.jpg`
    /// - Not a filesystem path; the preview server resolves it
    pub file: String,

    /// Width in pixels (0 when the header could not be read)
    pub width: u32,

    /// Height in pixels (0 when the header could not be read)
    pub height: u32,

    /// File size on disk at scan time
    pub bytes: u64,

    /// Processing time in seconds
    /// - Present only when the name carried both a workflow and an elapsed token
    /// - `name_origin_5.0.jpg` keeps its 5.0 even though it is labeled as origin
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub elapsed_time: Option<f64>,
}

/// All images of one subject, origin first
pub type Group = Vec<ImageEntry>;

/// Scan `dir` and build the ordered groups.
pub fn build_groups(dir: &Path, options: &ScanOptions) -> Result<Vec<Group>, ScanError> {
    let subjects = scan_directory(dir)?;
    let mut groups = Vec::with_capacity(subjects.len());

    // BTreeMap iteration gives ascending subject order
    for (subject_id, files) in &subjects {
        let mut ranked = Vec::with_capacity(files.len());

        for file in files {
            let path = dir.join(&file.file_name);
            let (width, height) = read_dimensions(&path);
            let bytes = file_size(&path)?;
            ranked.push(build_entry(subject_id, file, width, height, bytes, options));
        }

        ranked.sort_by(|(rank_a, a), (rank_b, b)| {
            rank_a.cmp(rank_b).then_with(|| a.label.cmp(&b.label))
        });

        groups.push(ranked.into_iter().map(|(_, entry)| entry).collect());
    }

    Ok(groups)
}

/// Build one entry together with its sort rank (0 for the origin image).
fn build_entry(
    subject_id: &str,
    file: &ClassifiedFile,
    width: u32,
    height: u32,
    bytes: u64,
    options: &ScanOptions,
) -> (u8, ImageEntry) {
    let label = if file.is_origin() {
        format!("{} ({})", subject_id, options.origin_marker)
    } else {
        file.workflow.clone().unwrap_or_default()
    };

    let file_ref = format!(
        "{}/{}",
        options.route_prefix.trim_end_matches('/'),
        file.file_name
    );

    // Any present workflow carries the elapsed time, `origin` included
    let elapsed_time = match (&file.workflow, file.elapsed) {
        (Some(_), Some(elapsed)) => Some(elapsed),
        _ => None,
    };

    let rank = if file.is_origin() || file_ref.contains(ORIGIN_FILE_MARKER) {
        0
    } else {
        1
    };

    (
        rank,
        ImageEntry {
            label,
            file: file_ref,
            width,
            height,
            bytes,
            elapsed_time,
        },
    )
}
