//! Capture session
//!
//! A [`CaptureSession`] owns one browser process for its lifetime and turns
//! [`CaptureRequest`]s into files. Starting the browser is the only failure
//! that escapes as an error; everything after that is logged and reported as
//! `None` so interactive callers can keep going.

use crate::browser::{
    BrowserConfig, BrowserController, NavigationOptions, PageCapture, PageHandle, PageNavigator,
};
use crate::error::Result;
use crate::request::{resolve_viewport_height, CaptureRequest, PreparedCapture};
use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Pause between sizing the viewport and capturing, so layout can settle
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// One browser process and the captures made with it
pub struct CaptureSession {
    controller: Option<BrowserController>,
    navigation: NavigationOptions,
}

impl CaptureSession {
    /// Launch a session with the default browser configuration
    pub async fn new(headless: bool, timeout: Duration, wait_for_network: bool) -> Result<Self> {
        let config = BrowserConfig::builder()
            .headless(headless)
            .timeout(timeout)
            .wait_for_network(wait_for_network)
            .build();
        Self::with_config(config).await
    }

    /// Launch a session from a full browser configuration
    pub async fn with_config(config: BrowserConfig) -> Result<Self> {
        let navigation = NavigationOptions::new(config.timeout_ms, config.wait_for_network);
        let controller = BrowserController::with_config(config).await.map_err(|e| {
            error!("Error initializing browser: {}", e);
            e
        })?;

        Ok(Self {
            controller: Some(controller),
            navigation,
        })
    }

    /// Whether the browser is still running
    pub fn is_open(&self) -> bool {
        self.controller.is_some()
    }

    /// Capture a page, returning the absolute path of the written file.
    ///
    /// Returns `None` when the URL is invalid, the browser is closed, or
    /// navigation/export fails; the reason is logged.
    #[instrument(skip(self, request), fields(url = %request.url, format = %request.format))]
    pub async fn capture(&mut self, request: &CaptureRequest) -> Option<PathBuf> {
        let Some(controller) = self.controller.as_ref() else {
            error!("Browser not initialized");
            return None;
        };

        let prepared = match request.prepare(Local::now()) {
            Ok(prepared) => prepared,
            Err(e) => {
                error!("Invalid URL: {}", e);
                return None;
            }
        };

        let page = match controller.new_page().await {
            Ok(page) => page,
            Err(e) => {
                error!("{}", e);
                return None;
            }
        };

        let outcome = self.capture_on_page(&page, &prepared).await;
        page.close().await;

        match outcome {
            Ok(()) => {
                info!("Saved to: {}", prepared.output.display());
                Some(prepared.output)
            }
            Err(e) => {
                error!("Capture of {} failed: {}", prepared.url, e);
                None
            }
        }
    }

    async fn capture_on_page(&self, page: &PageHandle, prepared: &PreparedCapture) -> Result<()> {
        PageNavigator::goto(page, prepared.url.as_str(), &self.navigation).await?;

        let height = match prepared.height {
            Some(height) => height,
            None => {
                let measured = PageNavigator::measure_document_height(page).await?;
                resolve_viewport_height(None, measured)
            }
        };
        PageNavigator::set_viewport(page, prepared.width, height).await?;

        tokio::time::sleep(SETTLE_DELAY).await;

        PageCapture::capture_to_file(page, prepared.format, prepared.quality, &prepared.output)
            .await
    }

    /// Shut the browser down. Safe to call more than once; never fails.
    pub async fn close(&mut self) {
        let Some(controller) = self.controller.take() else {
            debug!("Session already closed");
            return;
        };

        if let Err(e) = controller.close().await {
            warn!("Error while closing browser: {}", e);
        }
    }
}

#[cfg(test)]
impl CaptureSession {
    /// A session whose browser has already gone away
    pub(crate) fn detached() -> Self {
        Self {
            controller: None,
            navigation: NavigationOptions::default(),
        }
    }
}
