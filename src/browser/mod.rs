//! Browser automation module
//!
//! This module provides browser control through ChromiumOxide: lifecycle
//! management, navigation with readiness polling, and the two export
//! operations (full-page screenshot, print-to-PDF).

pub mod capture;
pub mod controller;
pub mod navigation;

pub use capture::{encode_image, write_output, CaptureFormat, PageCapture};
pub use controller::{BrowserConfig, BrowserConfigBuilder, BrowserController, PageHandle};
pub use navigation::{NavigationOptions, PageNavigator};
