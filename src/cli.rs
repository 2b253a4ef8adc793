//! Command line surface
//!
//! Flag parsing and mode dispatch. With no arguments the tool drops into the
//! interactive prompt; with a URL it performs one capture in the background
//! worker and reports progress.

use crate::browser::{BrowserConfig, CaptureFormat};
use crate::interactive::{interactive_config, run_interactive};
use crate::request::{CaptureRequest, DEFAULT_QUALITY, DEFAULT_WIDTH};
use crate::worker::{spawn_capture, CaptureStatus};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

/// Default page load timeout for single captures, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Capture a web page as PNG, JPG, or PDF
#[derive(Parser, Debug)]
#[command(name = "webcap")]
#[command(version)]
#[command(about = "Web Page Capture Tool - Take screenshots of webpages and save as PNG, JPG, or PDF")]
pub struct Args {
    /// URL of the webpage to capture
    pub url: Option<String>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<CaptureFormat>,

    /// Custom output path
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Viewport width
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height (defaults to full page)
    #[arg(long)]
    pub height: Option<u32>,

    /// Page load timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Launch the graphical user interface
    #[arg(long)]
    pub gui: bool,

    /// Show a browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    pub chrome_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the parsed arguments ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Prompt for captures until the user exits
    Interactive,
    /// Desktop GUI (not available in this build)
    Gui,
    /// One capture from flags
    Single(CaptureRequest),
    /// Options without a URL: print help and fail
    Usage,
}

impl Args {
    /// Choose a mode from the flags
    pub fn mode(&self) -> Mode {
        if self.gui {
            return Mode::Gui;
        }
        if let Some(url) = &self.url {
            return Mode::Single(self.request(url));
        }
        if self.is_bare() {
            Mode::Interactive
        } else {
            Mode::Usage
        }
    }

    /// No capture-related flags at all (`--verbose` and browser flags aside)
    fn is_bare(&self) -> bool {
        self.format.is_none()
            && self.output.is_none()
            && self.quality.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.timeout.is_none()
    }

    fn request(&self, url: &str) -> CaptureRequest {
        CaptureRequest::new(url)
            .format(self.format.unwrap_or_default())
            .output(self.output.clone())
            .quality(self.quality.unwrap_or(DEFAULT_QUALITY))
            .viewport(self.width.unwrap_or(DEFAULT_WIDTH), self.height)
    }

    /// Browser configuration for a single capture
    pub fn browser_config(&self) -> BrowserConfig {
        self.apply_browser_flags(
            BrowserConfig::builder()
                .timeout_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
                .wait_for_network(true)
                .build(),
        )
    }

    fn apply_browser_flags(&self, mut config: BrowserConfig) -> BrowserConfig {
        config.headless = !self.headed;
        if let Some(path) = &self.chrome_path {
            config.chrome_path = Some(path.clone());
        }
        config
    }

    /// Log filter derived from `--verbose`
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Parse process arguments
pub fn parse() -> Args {
    Args::parse()
}

/// Run the selected mode and map the outcome to an exit code
pub async fn run(args: Args) -> ExitCode {
    ExitCode::from(dispatch(args).await)
}

async fn dispatch(args: Args) -> u8 {
    match args.mode() {
        Mode::Gui => {
            eprintln!("Error: GUI mode is not available in this build.");
            1
        }
        Mode::Usage => {
            // Printing help only fails if stdout is gone.
            let _ = Args::command().print_help();
            1
        }
        Mode::Interactive => {
            println!("Starting in interactive mode. Use --help for command line options.");
            let config = args.apply_browser_flags(interactive_config());
            if let Err(e) = run_interactive(config).await {
                eprintln!("Error: {}", e);
            }
            0
        }
        Mode::Single(request) => run_single(args.browser_config(), request).await,
    }
}

async fn run_single(config: BrowserConfig, request: CaptureRequest) -> u8 {
    let job = spawn_capture(config, request);
    let result = job
        .run_to_completion(|status| match status {
            CaptureStatus::Failed(_) => eprintln!("{}", status),
            _ => println!("{}", status),
        })
        .await;

    match result {
        Ok(Some(_)) => 0,
        Ok(None) | Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_from(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("webcap").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_no_arguments_is_interactive() {
        assert_eq!(parse_from(&[]).mode(), Mode::Interactive);
        assert_eq!(parse_from(&["--verbose"]).mode(), Mode::Interactive);
    }

    #[test]
    fn test_options_without_url_is_usage() {
        assert_eq!(parse_from(&["--format", "pdf"]).mode(), Mode::Usage);
        assert_eq!(parse_from(&["--timeout", "10"]).mode(), Mode::Usage);
    }

    #[test]
    fn test_gui_takes_precedence() {
        assert_eq!(parse_from(&["--gui", "example.com"]).mode(), Mode::Gui);
    }

    #[test]
    fn test_single_capture_defaults() {
        let Mode::Single(request) = parse_from(&["example.com"]).mode() else {
            panic!("expected a single capture");
        };
        assert_eq!(request, CaptureRequest::new("example.com"));
        assert_eq!(request.width, 1920);
        assert_eq!(request.quality, 90);
        assert_eq!(request.height, None);
    }

    #[test]
    fn test_single_capture_flags() {
        let args = parse_from(&[
            "example.com",
            "--format",
            "jpg",
            "--output",
            "out.jpg",
            "--quality",
            "55",
            "--width",
            "1280",
            "--height",
            "800",
        ]);
        let Mode::Single(request) = args.mode() else {
            panic!("expected a single capture");
        };
        assert_eq!(request.format, CaptureFormat::Jpg);
        assert_eq!(request.output, Some(PathBuf::from("out.jpg")));
        assert_eq!(request.quality, 55);
        assert_eq!((request.width, request.height), (1280, Some(800)));
    }

    #[test]
    fn test_rejects_unknown_format_and_bad_quality() {
        let parse = |args: &[&str]| {
            Args::try_parse_from(std::iter::once("webcap").chain(args.iter().copied()))
        };
        assert!(parse(&["example.com", "--format", "gif"]).is_err());
        assert!(parse(&["example.com", "--quality", "0"]).is_err());
        assert!(parse(&["example.com", "--quality", "101"]).is_err());
    }

    #[test]
    fn test_browser_config_from_flags() {
        let config = parse_from(&[
            "example.com",
            "--timeout",
            "12",
            "--headed",
            "--chrome-path",
            "/opt/chrome",
        ])
        .browser_config();
        assert_eq!(config.timeout_ms, 12000);
        assert!(!config.headless);
        assert_eq!(config.chrome_path.as_deref(), Some("/opt/chrome"));

        let default = parse_from(&["example.com"]).browser_config();
        assert_eq!(default.timeout_ms, 30000);
        assert!(default.headless);
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(parse_from(&[]).log_filter(), "info");
        assert_eq!(parse_from(&["-v"]).log_filter(), "debug");
    }

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[tokio::test]
    async fn test_gui_and_usage_exit_with_failure() {
        assert_eq!(dispatch(parse_from(&["--gui"])).await, 1);
        assert_eq!(dispatch(parse_from(&["--width", "800"])).await, 1);
    }
}
