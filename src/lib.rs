//! webcap - Web Page Capture
//!
//! Renders a URL in headless Chromium and saves it as a PNG, JPG, or PDF.
//! The crate is a thin layer over the Chrome DevTools Protocol: it launches a
//! browser, navigates, waits for the document to finish loading, sizes the
//! viewport (measuring the full page height when no height is given), and
//! calls either `Page.captureScreenshot` or `Page.printToPDF`.
//!
//! # Architecture
//!
//! ```text
//! CLI / interactive prompt
//!          │
//!          ▼
//!   Capture worker ──▶ CaptureSession ──▶ BrowserController (CDP)
//!                           │                     │
//!                           ▼                     ▼
//!                    CaptureRequest        PageNavigator / PageCapture
//!                  (URL, path, format)     (readiness, viewport, export)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use webcap::{CaptureFormat, CaptureRequest, CaptureSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = CaptureSession::new(true, Duration::from_secs(30), true).await?;
//!
//!     let request = CaptureRequest::new("example.com").format(CaptureFormat::Pdf);
//!     if let Some(path) = session.capture(&request).await {
//!         println!("Saved to {}", path.display());
//!     }
//!
//!     session.close().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod cli;
pub mod error;
pub mod interactive;
pub mod request;
pub mod session;
pub mod worker;

// Re-exports for convenience
pub use browser::{BrowserConfig, BrowserController, CaptureFormat};
pub use error::{Error, Result};
pub use request::{CaptureRequest, PreparedCapture};
pub use session::CaptureSession;
pub use worker::{spawn_capture, CaptureJob, CaptureStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
