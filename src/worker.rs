//! Background capture worker
//!
//! Runs a whole session lifecycle (launch, capture, close) on a spawned task
//! and reports progress over a channel, so a front end can keep drawing or
//! printing while the browser works.

use crate::browser::BrowserConfig;
use crate::error::Result;
use crate::request::{normalize_url, CaptureRequest};
use crate::session::CaptureSession;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Progress of a background capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureStatus {
    /// The browser is being launched
    Starting,
    /// Navigation to the given URL has begun
    Loading(String),
    /// The file was written
    Saved(PathBuf),
    /// The capture did not produce a file
    Failed(String),
}

impl CaptureStatus {
    /// Whether no further updates follow this one
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaptureStatus::Saved(_) | CaptureStatus::Failed(_))
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureStatus::Starting => write!(f, "Starting Chrome..."),
            CaptureStatus::Loading(url) => write!(f, "Loading {}...", url),
            CaptureStatus::Saved(path) => write!(f, "Saved to: {}", path.display()),
            CaptureStatus::Failed(reason) => write!(f, "Error: {}", reason),
        }
    }
}

/// A capture running in the background
pub struct CaptureJob {
    /// Status updates, ending with `Saved` or `Failed`
    pub status: mpsc::UnboundedReceiver<CaptureStatus>,
    /// Resolves to the written path, `None` if the capture failed, or the
    /// startup error if the browser never launched
    pub handle: JoinHandle<Result<Option<PathBuf>>>,
}

impl CaptureJob {
    /// Drain status updates into `on_status`, then wait for the result
    pub async fn run_to_completion<F>(mut self, mut on_status: F) -> Result<Option<PathBuf>>
    where
        F: FnMut(&CaptureStatus),
    {
        while let Some(status) = self.status.recv().await {
            on_status(&status);
        }

        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(crate::error::Error::generic(format!(
                "capture worker stopped unexpectedly: {}",
                e
            ))),
        }
    }
}

/// Spawn a capture with its own browser session
pub fn spawn_capture(config: BrowserConfig, request: CaptureRequest) -> CaptureJob {
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        // A dropped receiver only means nobody is watching progress.
        let notify = |status: CaptureStatus| {
            if tx.send(status).is_err() {
                debug!("Capture status receiver dropped");
            }
        };

        notify(CaptureStatus::Starting);
        let mut session = match CaptureSession::with_config(config).await {
            Ok(session) => session,
            Err(e) => {
                notify(CaptureStatus::Failed(e.to_string()));
                return Err(e);
            }
        };

        notify(CaptureStatus::Loading(normalize_url(&request.url)));
        let result = session.capture(&request).await;
        session.close().await;

        match &result {
            Some(path) => notify(CaptureStatus::Saved(path.clone())),
            None => notify(CaptureStatus::Failed(
                "Failed to capture webpage".to_string(),
            )),
        }
        Ok(result)
    });

    CaptureJob { status: rx, handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_display() {
        assert_eq!(CaptureStatus::Starting.to_string(), "Starting Chrome...");
        assert_eq!(
            CaptureStatus::Loading("https://example.com".into()).to_string(),
            "Loading https://example.com..."
        );
        assert_eq!(
            CaptureStatus::Saved(PathBuf::from("/tmp/a.png")).to_string(),
            "Saved to: /tmp/a.png"
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!CaptureStatus::Starting.is_terminal());
        assert!(!CaptureStatus::Loading(String::new()).is_terminal());
        assert!(CaptureStatus::Saved(PathBuf::new()).is_terminal());
        assert!(CaptureStatus::Failed(String::new()).is_terminal());
    }

    #[tokio::test]
    async fn test_startup_failure_is_reported_and_returned() {
        let config = BrowserConfig::builder()
            .chrome_path("/nonexistent/webcap-test/chrome")
            .build();
        let job = spawn_capture(config, CaptureRequest::new("example.com"));

        let mut seen = Vec::new();
        let result = job.run_to_completion(|s| seen.push(s.clone())).await;

        assert!(matches!(result, Err(e) if e.is_startup_failure()));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], CaptureStatus::Starting);
        assert!(matches!(seen[1], CaptureStatus::Failed(_)));
    }
}
