//! Static file lookup beneath a set of route prefixes

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// File served when a request names a directory (or a mount root)
pub const INDEX_FILE: &str = "index.html";

/// A directory exposed under a route prefix, e.g. `/images` -> `./shots`
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMount {
    pub route: String,
    pub root: PathBuf,
}

impl StaticMount {
    pub fn new(route: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            route: route.into(),
            root: root.into(),
        }
    }

    /// Route without a trailing slash; `/` becomes the empty string.
    fn prefix(&self) -> &str {
        self.route.trim_end_matches('/')
    }

    /// Remainder of `request_path` below this mount, if the mount covers it.
    /// Prefixes only match on whole segments, so `/images` does not cover
    /// `/imagesets`.
    fn strip<'a>(&self, request_path: &'a str) -> Option<&'a str> {
        let rest = request_path.strip_prefix(self.prefix())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    /// Map a request path onto a file below `root`.
    ///
    /// `None` means the mount does not cover the path. `Some(None)` means it
    /// does, but the remainder is not a safe relative path.
    pub fn resolve(&self, request_path: &str) -> Option<Option<PathBuf>> {
        let rest = self.strip(request_path)?;
        Some(safe_join(&self.root, rest))
    }
}

/// Percent-decode `rest` and join it onto `root`, refusing anything that
/// could climb out of it.
fn safe_join(root: &Path, rest: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(rest).decode_utf8().ok()?;
    let mut relative = decoded.trim_start_matches('/').to_string();
    if relative.is_empty() || relative.ends_with('/') {
        relative.push_str(INDEX_FILE);
    }

    let relative = Path::new(&relative);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    Some(root.join(relative))
}

/// Mount table shared with the handler, longest prefix first
#[derive(Debug, Clone)]
pub struct Mounts(Arc<Vec<StaticMount>>);

impl Mounts {
    pub fn new(mut mounts: Vec<StaticMount>) -> Self {
        mounts.sort_by(|a, b| b.prefix().len().cmp(&a.prefix().len()));
        Self(Arc::new(mounts))
    }

    /// The most specific mount decides; a miss there is a 404 even if a
    /// shorter mount would have the file.
    pub fn lookup(&self, request_path: &str) -> Option<PathBuf> {
        self.0
            .iter()
            .find_map(|mount| mount.resolve(request_path))
            .flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StaticMount> {
        self.0.iter()
    }
}

pub async fn serve_static(State(mounts): State<Mounts>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let Some(path) = mounts.lookup(uri.path()) else {
        tracing::debug!("No file for {}", uri.path());
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => {
            tracing::debug!("Not found: {}", path.display());
            return StatusCode::NOT_FOUND.into_response();
        }
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
