//! Capture requests and the preparation step
//!
//! A [`CaptureRequest`] is what a surface collects from the user. Before any
//! browser work happens it is turned into a [`PreparedCapture`]: the URL gains
//! a scheme and must have a host, the quality is clamped, and an output path is
//! synthesized from the host and a timestamp when none was given.

use crate::browser::CaptureFormat;
use crate::error::{NavigationError, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use url::Url;

/// Default JPEG quality
pub const DEFAULT_QUALITY: u8 = 90;

/// Default viewport width in CSS pixels
pub const DEFAULT_WIDTH: u32 = 1920;

/// Timestamp layout used in generated file names
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A capture as requested by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    /// URL to capture, with or without a scheme
    pub url: String,
    /// Output format
    pub format: CaptureFormat,
    /// Destination file; `None` writes to the desktop
    pub output: Option<PathBuf>,
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Viewport width
    pub width: u32,
    /// Viewport height; `None` (or 0) measures the full page
    pub height: Option<u32>,
}

impl CaptureRequest {
    /// Create a PNG request for `url` with default settings
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            format: CaptureFormat::Png,
            output: None,
            quality: DEFAULT_QUALITY,
            width: DEFAULT_WIDTH,
            height: None,
        }
    }

    /// Set the output format
    pub fn format(mut self, format: CaptureFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the destination file
    pub fn output<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.output = path.map(Into::into);
        self
    }

    /// Set the JPEG quality
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Set the viewport size
    pub fn viewport(mut self, width: u32, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Prepare the request, placing generated files on the desktop
    pub fn prepare(&self, now: DateTime<Local>) -> Result<PreparedCapture> {
        self.prepare_in(now, &default_output_dir())
    }

    /// Prepare the request, placing generated files in `default_dir`
    pub fn prepare_in(&self, now: DateTime<Local>, default_dir: &Path) -> Result<PreparedCapture> {
        let url = parse_target(&self.url)?;
        // parse_target guarantees a non-empty host
        let host = url.host_str().unwrap_or_default();

        let output = match &self.output {
            Some(path) => path.clone(),
            None => default_dir.join(default_file_name(host, self.format, now)),
        };

        Ok(PreparedCapture {
            url,
            format: self.format,
            output: absolutize(output)?,
            quality: self.quality.clamp(1, 100),
            width: self.width.max(1),
            height: self.height.filter(|h| *h > 0),
        })
    }
}

/// A request that passed validation and is ready to hand to the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCapture {
    /// Navigation target
    pub url: Url,
    /// Effective output format
    pub format: CaptureFormat,
    /// Absolute destination path
    pub output: PathBuf,
    /// JPEG quality, within 1-100
    pub quality: u8,
    /// Viewport width
    pub width: u32,
    /// Fixed viewport height, or `None` for full page
    pub height: Option<u32>,
}

/// Prepend `https://` unless the input already names http or https
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Normalize and parse a URL, requiring a non-empty host
pub fn parse_target(input: &str) -> Result<Url> {
    let normalized = normalize_url(input);
    let url = Url::parse(&normalized)
        .map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", normalized, e)))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(NavigationError::InvalidUrl(format!("{}: missing host", normalized)).into()),
    }
}

/// Host used in generated file names, without a leading `www.`
pub fn file_stem_for_host(host: &str) -> String {
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<host>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_file_name(host: &str, format: CaptureFormat, now: DateTime<Local>) -> String {
    format!(
        "{}_{}.{}",
        file_stem_for_host(host),
        now.format(TIMESTAMP_FORMAT),
        format.extension()
    )
}

/// The user's desktop, then `~/Desktop`, then the working directory
pub fn default_output_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Viewport height to use for a capture.
///
/// A fixed height wins; otherwise the measured document height is rounded up,
/// never below one pixel.
pub fn resolve_viewport_height(requested: Option<u32>, measured: f64) -> u32 {
    if let Some(height) = requested.filter(|h| *h > 0) {
        return height;
    }
    if measured.is_finite() && measured > 0.0 {
        measured.ceil().min(u32::MAX as f64) as u32
    } else {
        1
    }
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
