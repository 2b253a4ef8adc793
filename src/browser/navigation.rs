//! Page navigation functionality
//!
//! This module handles URL navigation with a timeout, polling for
//! `document.readyState`, and viewport sizing before a capture.

use crate::browser::PageHandle;
use crate::error::{Error, NavigationError, Result};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Largest of the body/documentElement scroll, offset, and client heights
pub const FULL_HEIGHT_SCRIPT: &str = "Math.max(\
document.body.scrollHeight, \
document.documentElement.scrollHeight, \
document.body.offsetHeight, \
document.documentElement.offsetHeight, \
document.body.clientHeight, \
document.documentElement.clientHeight)";

const READY_STATE_SCRIPT: &str = "document.readyState";

/// Options for page navigation
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Timeout in milliseconds for both navigation and readiness (default: 30000)
    pub timeout_ms: u64,
    /// Poll `document.readyState` after navigation (default: true)
    pub wait_for_network: bool,
    /// Delay between readiness polls in ms (default: 500)
    pub poll_interval_ms: u64,
    /// Extra wait after the document is complete, for late requests (default: 2000)
    pub network_buffer_ms: u64,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            wait_for_network: true,
            poll_interval_ms: 500,
            network_buffer_ms: 2000,
        }
    }
}

impl NavigationOptions {
    /// Default options with the given timeout and readiness flag
    pub fn new(timeout_ms: u64, wait_for_network: bool) -> Self {
        Self {
            timeout_ms,
            wait_for_network,
            ..Default::default()
        }
    }
}

/// Page navigator
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate to a URL and, if requested, wait for the page to settle.
    ///
    /// Returns whether the document reported `complete`. A navigation that
    /// does not finish within the timeout is an error. A document that never
    /// reaches `complete` is not: the capture proceeds with whatever has
    /// rendered.
    #[instrument(skip(page, options))]
    pub async fn goto(page: &PageHandle, url: &str, options: &NavigationOptions) -> Result<bool> {
        let start = Instant::now();
        info!("Loading {}...", url);

        let timeout = Duration::from_millis(options.timeout_ms);
        tokio::time::timeout(timeout, page.page.goto(url))
            .await
            .map_err(|_| NavigationError::Timeout(options.timeout_ms))?
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

        let ready = settle(|| Self::ready_state(page), options).await;

        debug!(
            "Navigation to {} finished in {}ms (ready: {})",
            url,
            start.elapsed().as_millis(),
            ready
        );
        Ok(ready)
    }

    /// Current `document.readyState`; evaluation errors read as `None`
    async fn ready_state(page: &PageHandle) -> Option<String> {
        page.page
            .evaluate(READY_STATE_SCRIPT)
            .await
            .ok()
            .and_then(|v| v.into_value::<String>().ok())
    }

    /// Measure the full document height in CSS pixels
    #[instrument(skip(page))]
    pub async fn measure_document_height(page: &PageHandle) -> Result<f64> {
        let height: f64 = page
            .page
            .evaluate(FULL_HEIGHT_SCRIPT)
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .into_value()?;

        debug!("Measured document height: {}", height);
        Ok(height)
    }

    /// Resize the rendering viewport
    #[instrument(skip(page))]
    pub async fn set_viewport(page: &PageHandle, width: u32, height: u32) -> Result<()> {
        let params = SetDeviceMetricsOverrideParams::new(width as i64, height as i64, 1.0, false);
        page.page
            .execute(params)
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        debug!("Viewport set to {}x{}", width, height);
        Ok(())
    }
}

/// Post-navigation wait: poll readiness, then the network buffer.
///
/// Does nothing when `wait_for_network` is off. A readiness timeout is logged
/// and the buffer still applies.
pub(crate) async fn settle<F, Fut>(probe: F, options: &NavigationOptions) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<String>>,
{
    if !options.wait_for_network {
        return false;
    }

    let ready = poll_ready_state(
        probe,
        Duration::from_millis(options.timeout_ms),
        Duration::from_millis(options.poll_interval_ms.max(1)),
    )
    .await;
    if !ready {
        warn!("Timeout waiting for page to load completely");
    }
    tokio::time::sleep(Duration::from_millis(options.network_buffer_ms)).await;
    ready
}

/// Poll `probe` until it reports `complete` or `timeout` passes.
///
/// `None` from the probe counts as "not ready yet"; evaluation fails often
/// while a navigation is still swapping documents.
pub(crate) async fn poll_ready_state<F, Fut>(
    mut probe: F,
    timeout: Duration,
    interval: Duration,
) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        let state = probe().await;
        if is_ready_state_complete(state.as_deref()) {
            return true;
        }
        if Instant::now() + interval > deadline {
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Whether an evaluated `document.readyState` means the load finished
pub fn is_ready_state_complete(state: Option<&str>) -> bool {
    state == Some("complete")
}
