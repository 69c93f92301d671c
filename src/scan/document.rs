//! Writing the comparison document to disk

use std::fs;
use std::path::{Path, PathBuf};

use super::builder::{build_groups, Group};
use crate::config::ScanOptions;
use crate::error::ScanError;

/// Render the groups as pretty JSON
///
/// - Outer array: one element per subject, ascending subject id
/// - Inner array: origin first, then variants by label
/// - 2-space indent; non-ASCII labels such as `原图` are written as is
pub fn render_document(groups: &[Group]) -> Result<String, ScanError> {
    Ok(serde_json::to_string_pretty(groups)?)
}

/// Write the document into `dir` and return its path.
///
/// The file name comes from `options.output_file` (`data.json` by default),
/// which puts it under `/images` on the preview server as well. An existing
/// document is overwritten.
pub fn write_document(
    dir: &Path,
    groups: &[Group],
    options: &ScanOptions,
) -> Result<PathBuf, ScanError> {
    let json_path = dir.join(&options.output_file);
    let json = render_document(groups)?;
    fs::write(&json_path, json).map_err(|e| ScanError::io(&json_path, e))?;
    Ok(json_path)
}

/// Scan `dir` and write its document.
///
/// Returns `Ok(None)` when no file matched; nothing is written in that case.
pub fn scan_and_write(dir: &Path, options: &ScanOptions) -> Result<Option<PathBuf>, ScanError> {
    let groups = build_groups(dir, options)?;
    if groups.is_empty() {
        return Ok(None);
    }
    write_document(dir, &groups, options).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::builder::ImageEntry;
    use image::RgbImage;
    use tempfile::tempdir;

    #[test]
    fn test_document_layout() {
        let groups = vec![vec![
            ImageEntry {
                label: "1 (原图)".to_string(),
                file: "/images/1_origin.jpg".to_string(),
                width: 4032,
                height: 3024,
                bytes: 155224,
                elapsed_time: None,
            },
            ImageEntry {
                label: "workflow1".to_string(),
                file: "/images/1_workflow1_10.2.jpg".to_string(),
                width: 4032,
                height: 3024,
                bytes: 5245214,
                elapsed_time: Some(10.2),
            },
        ]];

        let expected = r#"[
  [
    {
      "label": "1 (原图)",
      "file": "/images/1_origin.jpg",
      "width": 4032,
      "height": 3024,
      "bytes": 155224
    },
    {
      "label": "workflow1",
      "file": "/images/1_workflow1_10.2.jpg",
      "width": 4032,
      "height": 3024,
      "bytes": 5245214,
      "elapsedTime": 10.2
    }
  ]
]"#;
        assert_eq!(render_document(&groups).unwrap(), expected);
    }

    #[test]
    fn test_scan_and_write_creates_data_json() {
        let dir = tempdir().unwrap();
        RgbImage::new(4, 3)
            .save(dir.path().join("1_origin.png"))
            .unwrap();
        RgbImage::new(4, 3)
            .save(dir.path().join("1_fast_0.5.png"))
            .unwrap();

        let path = scan_and_write(dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("data.json"));

        let parsed: Vec<Group> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0][0].file, "/images/1_origin.png");
        assert_eq!(parsed[0][1].elapsed_time, Some(0.5));
    }

    #[test]
    fn test_rescan_is_byte_identical() {
        let dir = tempdir().unwrap();
        for name in ["2_origin.png", "2_b_1.png", "1_origin.png", "1_a_2.png"] {
            RgbImage::new(5, 5).save(dir.path().join(name)).unwrap();
        }
        let options = ScanOptions::default();

        let first = fs::read(scan_and_write(dir.path(), &options).unwrap().unwrap()).unwrap();
        // data.json itself is now in the directory; it does not match the grammar
        let second = fs::read(scan_and_write(dir.path(), &options).unwrap().unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_directory_writes_nothing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hi").unwrap();

        assert_eq!(scan_and_write(dir.path(), &ScanOptions::default()).unwrap(), None);
        assert!(!dir.path().join("data.json").exists());
    }
}
