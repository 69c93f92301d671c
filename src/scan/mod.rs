/// Directory scanning
///
/// This module handles:
/// - Parsing image file names into subject / workflow / elapsed (classify.rs)
/// - Reading dimensions and byte sizes (metadata.rs)
/// - Grouping and ordering entries (builder.rs)
/// - Writing data.json (document.rs)

pub mod classify;
pub mod metadata;
pub mod builder;
pub mod document;

pub use document::scan_and_write;
