//! Error types for webcap
//!
//! Library code returns these through [`Result`]. The capture session turns
//! navigation and export failures into log lines and a `None` result; only
//! browser startup failures reach the entry surfaces as errors.

use thiserror::Error;

/// The main error type for webcap operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Capture errors (screenshot, PDF)
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors from script evaluation results
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding/encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Capture errors (screenshots, PDFs)
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screenshot failed
    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    /// PDF generation failed
    #[error("PDF generation failed: {0}")]
    PdfFailed(String),

    /// Output format not recognized
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The browser returned a payload that is not valid base64
    #[error("Invalid capture payload: {0}")]
    InvalidPayload(String),

    /// Re-encoding the captured image failed
    #[error("Image encoding failed: {0}")]
    EncodeFailed(String),

    /// Writing the output file failed
    #[error("Failed to write {path}: {message}")]
    WriteFailed {
        /// Destination path
        path: String,
        /// Underlying error message
        message: String,
    },
}

/// Result type alias for webcap operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Whether this error happened before a browser was available
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            Error::Browser(BrowserError::LaunchFailed(_) | BrowserError::ConfigError(_))
        )
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        CaptureError::InvalidPayload(err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_navigation_error() {
        let err = NavigationError::Timeout(30000);
        assert_eq!(err.to_string(), "Navigation timed out after 30000ms");
    }

    #[test]
    fn test_write_failed_names_path() {
        let err = CaptureError::WriteFailed {
            path: "/tmp/out.png".to_string(),
            message: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("/tmp/out.png"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_startup_failure_classification() {
        assert!(Error::from(BrowserError::LaunchFailed("x".into())).is_startup_failure());
        assert!(Error::from(BrowserError::ConfigError("x".into())).is_startup_failure());
        assert!(!Error::from(BrowserError::PageCreationFailed("x".into())).is_startup_failure());
        assert!(!Error::from(NavigationError::Timeout(1)).is_startup_failure());
    }

    #[test]
    fn test_base64_error_maps_to_invalid_payload() {
        use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
        let err: Error = BASE64.decode("not base64!!").unwrap_err().into();
        assert!(matches!(
            err,
            Error::Capture(CaptureError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_generic_error() {
        let err = Error::generic("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }
}
