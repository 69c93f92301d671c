//! Command line surface and runtime configuration

use clap::{ArgAction, Parser};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use crate::error::ServeError;
use crate::server::StaticMount;

/// Route prefix under which the scanned images are served
pub const IMAGES_ROUTE: &str = "/images";

/// Route prefix under which the viewer template is served
pub const TEMPLATE_ROUTE: &str = "/";

/// Name of the document written into the scanned directory
pub const DATA_FILE_NAME: &str = "data.json";

/// Text appended to the subject id in the origin image's label
pub const DEFAULT_ORIGIN_MARKER: &str = "原图";

/// Directory name looked up next to the executable when `-t` is omitted
const TEMPLATE_DIR_NAME: &str = "templet";

/// Image Compare Slider JSON Builder & Preview Server
///
/// `-h` is the host, so help is only available as `--help`.
#[derive(Parser, Debug, Clone)]
#[command(name = "image-compare-slider", version, disable_help_flag = true)]
pub struct Cli {
    /// Image directory to scan and serve
    #[arg(short = 'd', long)]
    pub directory: PathBuf,

    /// Template directory, must contain index.html
    #[arg(short = 't', long)]
    pub template: Option<PathBuf>,

    /// Preview server host
    #[arg(short = 'h', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Preview server port
    #[arg(short = 'p', long, default_value_t = 8000)]
    pub port: u16,

    /// Scan the image directory and write the JSON document the viewer needs
    #[arg(long)]
    pub scan: bool,

    /// Run the preview HTTP server so the result can be opened in a browser
    #[arg(long)]
    pub view: bool,

    /// Label suffix for origin images, e.g. "1 (原图)"
    #[arg(long, default_value = DEFAULT_ORIGIN_MARKER)]
    pub origin_marker: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            origin_marker: self.origin_marker.clone(),
            ..ScanOptions::default()
        }
    }
}

/// Knobs for building the comparison document
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Prefix joined with each file name to form the `file` reference
    pub route_prefix: String,
    /// Suffix used in the origin label: `"<subject> (<marker>)"`
    pub origin_marker: String,
    /// Document file name inside the scanned directory
    pub output_file: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            route_prefix: IMAGES_ROUTE.to_string(),
            origin_marker: DEFAULT_ORIGIN_MARKER.to_string(),
            output_file: DATA_FILE_NAME.to_string(),
        }
    }
}

/// Everything the preview server needs to start
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub mounts: Vec<StaticMount>,
}

impl ServeConfig {
    /// Build the server config, resolving the template directory.
    pub fn from_cli(cli: &Cli) -> Result<Self, ServeError> {
        let template =
            resolve_template_dir(cli.template.as_deref(), &default_template_candidates())?;

        Ok(Self {
            host: cli.host.clone(),
            port: cli.port,
            mounts: vec![
                StaticMount::new(TEMPLATE_ROUTE, absolute(&template)),
                StaticMount::new(IMAGES_ROUTE, absolute(&cli.directory)),
            ],
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve `host:port` to the first socket address. Accepts IP literals
    /// and host names such as `localhost`.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServeError> {
        let invalid = |reason: String| ServeError::InvalidAddress {
            addr: self.bind_addr(),
            reason,
        };

        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host resolved to no address".to_string()))
    }
}

/// Template directories tried, in order, when none is given explicitly:
/// - `templet/` next to the executable
/// - `<data dir>/image-compare-slider/templet` (e.g. ~/.local/share on Linux)
pub fn default_template_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(TEMPLATE_DIR_NAME));
    }

    if let Some(mut data_dir) = dirs::data_dir() {
        data_dir.push("image-compare-slider");
        data_dir.push(TEMPLATE_DIR_NAME);
        candidates.push(data_dir);
    }

    candidates
}

/// An explicit template path wins as given; otherwise the first existing
/// candidate directory is used.
pub fn resolve_template_dir(
    explicit: Option<&Path>,
    candidates: &[PathBuf],
) -> Result<PathBuf, ServeError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    candidates
        .iter()
        .find(|candidate| candidate.is_dir())
        .cloned()
        .ok_or(ServeError::TemplateMissing)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
