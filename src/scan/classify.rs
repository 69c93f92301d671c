//! Filename classification
//!
//! Every image in a comparison directory is named
//! `<subject>_<workflow>_<elapsed>.<ext>`, e.g. `1_origin.jpg` or
//! `1_workflow1_10.2.jpg`. This module lists a directory, parses each name
//! and groups the accepted files by subject.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

use crate::error::ScanError;

/// Workflow token that marks the unmodified source image
pub const ORIGIN_WORKFLOW: &str = "origin";

/// Subject and workflow are matched lazily, so the subject is the shortest
/// prefix that still lets the rest of the name match. Names without any
/// underscore fall through to the `bare` branch and carry no workflow.
static FILE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<name>.+?)_(?P<workflow>.+?)?_?(?P<elapsed>[0-9]+(?:\.[0-9]*)?|\.[0-9]+)?|(?P<bare>[^_]+?))\.(?:jpg|jpeg|png|webp)$",
    )
    .expect("file name pattern is valid")
});

/// A file whose name matched the naming grammar
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFile {
    /// Grouping key shared by an original and its variants (never empty)
    pub subject_id: String,
    /// Transformation that produced this variant
    pub workflow: Option<String>,
    /// Processing time in seconds
    pub elapsed: Option<f64>,
    /// Base name inside the scanned directory
    pub file_name: String,
}

impl ClassifiedFile {
    /// True when the workflow is absent or literally `origin`
    pub fn is_origin(&self) -> bool {
        match self.workflow.as_deref() {
            None => true,
            Some(workflow) => workflow == ORIGIN_WORKFLOW,
        }
    }
}

/// Subject id -> files in discovery order. Iterates in ascending subject order.
pub type SubjectMap = BTreeMap<String, Vec<ClassifiedFile>>;

/// Parse a single base name. Returns `None` when it does not match.
pub fn classify_name(file_name: &str) -> Option<ClassifiedFile> {
    let caps = FILE_NAME_PATTERN.captures(file_name)?;

    let subject_id = caps
        .name("name")
        .or_else(|| caps.name("bare"))?
        .as_str()
        .to_string();

    let elapsed = match caps.name("elapsed") {
        Some(token) => Some(token.as_str().parse::<f64>().ok()?),
        None => None,
    };

    Some(ClassifiedFile {
        subject_id,
        workflow: caps.name("workflow").map(|m| m.as_str().to_string()),
        elapsed,
        file_name: file_name.to_string(),
    })
}

/// List `dir` (non-recursive) and group every matching regular file by subject.
///
/// Entries are visited in file name order so that the discovery order inside
/// each subject is stable between runs. Non-matching files are logged and
/// skipped. Directories and other non-file entries are ignored silently.
pub fn scan_directory(dir: &Path) -> Result<SubjectMap, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut subjects = SubjectMap::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;

        // Follows symlinks; dangling links and directories fall out here
        if !entry.path().is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            tracing::warn!("Skip {}.", entry.file_name().to_string_lossy());
            continue;
        };

        match classify_name(file_name) {
            Some(file) => subjects
                .entry(file.subject_id.clone())
                .or_default()
                .push(file),
            None => tracing::warn!("Skip {file_name}."),
        }
    }

    Ok(subjects)
}
