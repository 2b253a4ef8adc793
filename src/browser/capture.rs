//! Page capture functionality
//!
//! This module handles full-page screenshots and print-to-PDF, plus the
//! re-encoding of raster captures into the requested image format.

use crate::browser::PageHandle;
use crate::error::{CaptureError, Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, EnableParams, PrintToPdfParams,
};
use chromiumoxide::page::ScreenshotParams;
use image::codecs::jpeg::JpegEncoder;
use image::ImageOutputFormat;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

/// Output format for captures
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    /// PNG screenshot
    #[default]
    Png,
    /// JPEG screenshot
    Jpg,
    /// PDF document
    Pdf,
}

impl CaptureFormat {
    /// Parse user input, falling back to PNG for anything unrecognized
    pub fn parse_or_png(input: &str) -> Self {
        match input.parse() {
            Ok(format) => format,
            Err(_) => {
                warn!("Invalid format: {}. Using png instead.", input.trim());
                CaptureFormat::Png
            }
        }
    }

    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            CaptureFormat::Png => "png",
            CaptureFormat::Jpg => "jpg",
            CaptureFormat::Pdf => "pdf",
        }
    }

}

impl FromStr for CaptureFormat {
    type Err = CaptureError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(CaptureFormat::Png),
            "jpg" => Ok(CaptureFormat::Jpg),
            "pdf" => Ok(CaptureFormat::Pdf),
            other => Err(CaptureError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Page capture functionality
pub struct PageCapture;

impl PageCapture {
    /// Capture the page as `format` and write it to `path`
    #[instrument(skip(page))]
    pub async fn capture_to_file(
        page: &PageHandle,
        format: CaptureFormat,
        quality: u8,
        path: &Path,
    ) -> Result<()> {
        let data = match format {
            CaptureFormat::Pdf => Self::pdf(page).await?,
            CaptureFormat::Png | CaptureFormat::Jpg => {
                Self::screenshot(page, format, quality).await?
            }
        };
        write_output(path, &data).await
    }

    /// Full-page screenshot encoded as `format`.
    ///
    /// Falls back once to a plain viewport screenshot when the full-page
    /// capture or its decoding fails.
    #[instrument(skip(page))]
    pub async fn screenshot(
        page: &PageHandle,
        format: CaptureFormat,
        quality: u8,
    ) -> Result<Vec<u8>> {
        info!("Capturing screenshot");

        with_fallback(Self::full_page_image(page, format, quality), || {
            Self::viewport_image(page, format, quality)
        })
        .await
    }

    async fn full_page_image(
        page: &PageHandle,
        format: CaptureFormat,
        quality: u8,
    ) -> Result<Vec<u8>> {
        let png = Self::full_page_png(page).await?;
        encode_image(&png, format, quality)
    }

    async fn viewport_image(
        page: &PageHandle,
        format: CaptureFormat,
        quality: u8,
    ) -> Result<Vec<u8>> {
        let png = Self::viewport_png(page).await?;
        encode_image(&png, format, quality)
    }

    /// Raw `Page.captureScreenshot` beyond the viewport, base64-decoded
    async fn full_page_png(page: &PageHandle) -> Result<Vec<u8>> {
        page.page
            .execute(EnableParams::default())
            .await
            .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()))?;

        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .capture_beyond_viewport(true)
            .from_surface(true)
            .build();

        let response = page
            .page
            .execute(params)
            .await
            .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()))?;

        let encoded: &str = response.result.data.as_ref();
        let data = BASE64.decode(encoded)?;
        debug!("Screenshot captured: {} bytes", data.len());
        Ok(data)
    }

    /// The driver's own viewport screenshot
    async fn viewport_png(page: &PageHandle) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let data = page
            .page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()))?;

        debug!("Viewport screenshot captured: {} bytes", data.len());
        Ok(data)
    }

    /// Print the page to PDF with zero margins and backgrounds
    #[instrument(skip(page))]
    pub async fn pdf(page: &PageHandle) -> Result<Vec<u8>> {
        info!("Generating PDF");

        let params = PrintToPdfParams::builder()
            .print_background(true)
            .prefer_css_page_size(true)
            .margin_top(0.0)
            .margin_bottom(0.0)
            .margin_left(0.0)
            .margin_right(0.0)
            .scale(1.0)
            .build();

        let response = page
            .page
            .execute(params)
            .await
            .map_err(|e| CaptureError::PdfFailed(e.to_string()))?;

        let encoded: &str = response.result.data.as_ref();
        let data = BASE64.decode(encoded)?;
        debug!("PDF generated: {} bytes", data.len());
        Ok(data)
    }
}

/// Run `primary`; if it fails, log and run `fallback` exactly once
pub(crate) async fn with_fallback<T, P, F, Fut>(primary: P, fallback: F) -> Result<T>
where
    P: Future<Output = Result<T>>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match primary.await {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("Error in CDP screenshot, falling back to default: {}", e);
            fallback().await
        }
    }
}

/// Decode a captured raster and encode it as `format`.
///
/// JPEG output is converted to RGB first since JPEG has no alpha channel.
pub fn encode_image(raw: &[u8], format: CaptureFormat, quality: u8) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(raw)?;
    let mut out = Vec::new();

    match format {
        CaptureFormat::Jpg => {
            let rgb = decoded.to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
            encoder.encode_image(&rgb)?;
        }
        CaptureFormat::Png => {
            decoded.write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)?;
        }
        CaptureFormat::Pdf => {
            return Err(CaptureError::EncodeFailed(
                "PDF is not a raster format".to_string(),
            )
            .into());
        }
    }

    Ok(out)
}

/// Write capture bytes, creating missing parent directories
pub async fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    let write_failed = |e: std::io::Error| -> Error {
        CaptureError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }
    tokio::fs::write(path, data).await.map_err(write_failed)?;

    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn sample_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(16, 8, |x, y| Rgba([(x * 16) as u8, (y * 32) as u8, 128, 200]));
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_capture_format_default() {
        assert_eq!(CaptureFormat::default(), CaptureFormat::Png);
    }

    #[test]
    fn test_capture_format_from_str() {
        assert_eq!("PNG".parse::<CaptureFormat>().unwrap(), CaptureFormat::Png);
        assert_eq!(" jpg ".parse::<CaptureFormat>().unwrap(), CaptureFormat::Jpg);
        assert_eq!("pdf".parse::<CaptureFormat>().unwrap(), CaptureFormat::Pdf);
        assert!("gif".parse::<CaptureFormat>().is_err());
    }

    #[test]
    fn test_parse_or_png_falls_back() {
        assert_eq!(CaptureFormat::parse_or_png("webp"), CaptureFormat::Png);
        assert_eq!(CaptureFormat::parse_or_png(""), CaptureFormat::Png);
        assert_eq!(CaptureFormat::parse_or_png("jpg"), CaptureFormat::Jpg);
    }

    #[test]
    fn test_capture_format_extension() {
        assert_eq!(CaptureFormat::Jpg.extension(), "jpg");
        assert_eq!(CaptureFormat::Png.extension(), "png");
        assert_eq!(CaptureFormat::Pdf.to_string(), "pdf");
    }

    #[tokio::test]
    async fn test_fallback_not_used_when_primary_succeeds() {
        let mut fallback_calls = 0;
        let out = with_fallback(async { encode_image(&sample_png(), CaptureFormat::Png, 90) }, || {
            fallback_calls += 1;
            async { Ok::<_, Error>(Vec::new()) }
        })
        .await
        .unwrap();

        assert!(!out.is_empty());
        assert_eq!(fallback_calls, 0);
    }

    #[tokio::test]
    async fn test_fallback_after_capture_failure() {
        let mut fallback_calls = 0;
        let out = with_fallback(
            async { Err(Error::from(CaptureError::ScreenshotFailed("beyond viewport".into()))) },
            || {
                fallback_calls += 1;
                async { encode_image(&sample_png(), CaptureFormat::Jpg, 80) }
            },
        )
        .await
        .unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        assert_eq!(fallback_calls, 1);
    }

    #[tokio::test]
    async fn test_fallback_after_decode_failure() {
        let mut fallback_calls = 0;
        let out = with_fallback(async { encode_image(b"truncated", CaptureFormat::Png, 90) }, || {
            fallback_calls += 1;
            async { encode_image(&sample_png(), CaptureFormat::Png, 90) }
        })
        .await
        .unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
        assert_eq!(fallback_calls, 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_returned() {
        let mut fallback_calls = 0;
        let result: Result<Vec<u8>> = with_fallback(
            async { Err(Error::from(CaptureError::ScreenshotFailed("primary".into()))) },
            || {
                fallback_calls += 1;
                async { Err(Error::from(CaptureError::ScreenshotFailed("viewport".into()))) }
            },
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("viewport"));
        assert_eq!(fallback_calls, 1);
    }

    #[test]
    fn test_encode_png_roundtrips_dimensions() {
        let out = encode_image(&sample_png(), CaptureFormat::Png, 90).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let out = encode_image(&sample_png(), CaptureFormat::Jpg, 90).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_encode_rejects_pdf_and_garbage() {
        assert!(encode_image(&sample_png(), CaptureFormat::Pdf, 90).is_err());
        assert!(encode_image(b"not an image", CaptureFormat::Png, 90).is_err());
    }

    #[tokio::test]
    async fn test_write_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.pdf");
        write_output(&path, b"%PDF-1.4").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }
}
