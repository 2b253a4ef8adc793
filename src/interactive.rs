//! Interactive mode
//!
//! Asks for a URL, a format, an optional JPEG quality, and an output path, one
//! line at a time, and captures with a single long-lived session until the
//! user types `exit`.

use crate::browser::{BrowserConfig, CaptureFormat};
use crate::request::{CaptureRequest, DEFAULT_QUALITY, DEFAULT_WIDTH};
use crate::session::CaptureSession;
use nu_ansi_term::{Color, Style};
use reedline::{Prompt, PromptEditMode, PromptHistorySearch, Reedline, Signal};
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::info;

/// Timeout used by the interactive session, in seconds
pub const INTERACTIVE_TIMEOUT_SECS: u64 = 45;

const URL_QUESTION: &str = "Please enter the URL of the webpage (or 'exit' to quit): ";
const FORMAT_QUESTION: &str = "Choose output format (png, jpg, pdf) [default: png]: ";
const QUALITY_QUESTION: &str = "JPEG quality (1-100) [default: 90]: ";
const PATH_QUESTION: &str = "Custom output path (or press Enter for desktop): ";

/// Source of answers to prompts
pub trait Prompter {
    /// Ask a question; `None` means the user cancelled (Ctrl-C/Ctrl-D or EOF)
    fn ask(&mut self, question: &str) -> Option<String>;
}

/// Line-editor backed prompter for a terminal
pub struct TerminalPrompter {
    editor: Reedline,
}

impl TerminalPrompter {
    /// Create a prompter reading from the terminal
    pub fn new() -> Self {
        Self {
            editor: Reedline::create(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> Option<String> {
        let prompt = QuestionPrompt::new(question);
        match self.editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => Some(line),
            Ok(_) => None,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                None
            }
        }
    }
}

/// Prompt that shows one question on the left
struct QuestionPrompt {
    question: String,
    style: Style,
}

impl QuestionPrompt {
    fn new(question: &str) -> Self {
        Self {
            question: question.to_string(),
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for QuestionPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.style.paint(self.question.as_str()).to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// What one round of questions produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted {
    /// Capture this
    Capture(CaptureRequest),
    /// The user typed an exit word
    Exit,
    /// The user pressed Ctrl-C/Ctrl-D
    Cancelled,
}

/// Whether a URL answer asks to leave the loop
pub fn is_exit_word(input: &str) -> bool {
    matches!(
        input.trim().to_ascii_lowercase().as_str(),
        "exit" | "quit" | "q"
    )
}

/// Format answer: empty means png, unknown values fall back to png
pub fn parse_format_answer(input: &str) -> CaptureFormat {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        CaptureFormat::Png
    } else {
        CaptureFormat::parse_or_png(trimmed)
    }
}

/// Quality answer: anything other than an integer in 1-100 means 90
pub fn parse_quality_answer(input: &str) -> u8 {
    match input.trim().parse::<i64>() {
        Ok(q) if (1..=100).contains(&q) => q as u8,
        _ => DEFAULT_QUALITY,
    }
}

/// Path answer: empty means "generate one on the desktop"
pub fn parse_path_answer(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Ask one round of questions
pub fn read_request<P: Prompter>(prompter: &mut P) -> Prompted {
    let url = loop {
        let Some(answer) = prompter.ask(URL_QUESTION) else {
            return Prompted::Cancelled;
        };
        if is_exit_word(&answer) {
            return Prompted::Exit;
        }
        if !answer.trim().is_empty() {
            break answer.trim().to_string();
        }
    };

    let Some(format_answer) = prompter.ask(FORMAT_QUESTION) else {
        return Prompted::Cancelled;
    };
    let format = parse_format_answer(&format_answer);

    let quality = if format == CaptureFormat::Jpg {
        let Some(answer) = prompter.ask(QUALITY_QUESTION) else {
            return Prompted::Cancelled;
        };
        parse_quality_answer(&answer)
    } else {
        DEFAULT_QUALITY
    };

    let Some(path_answer) = prompter.ask(PATH_QUESTION) else {
        return Prompted::Cancelled;
    };

    Prompted::Capture(
        CaptureRequest::new(url)
            .format(format)
            .quality(quality)
            .output(parse_path_answer(&path_answer))
            .viewport(DEFAULT_WIDTH, None),
    )
}

/// Run the prompt loop on an already-launched session.
///
/// Prompting blocks the current worker thread, so this needs the
/// multi-threaded runtime.
pub async fn run_loop<P: Prompter>(session: &mut CaptureSession, prompter: &mut P) {
    loop {
        let prompted = tokio::task::block_in_place(|| read_request(prompter));
        match prompted {
            Prompted::Capture(request) => {
                if let Some(path) = session.capture(&request).await {
                    println!("Saved to: {}", path.display());
                } else {
                    println!("Failed to capture {}", request.url);
                }
            }
            Prompted::Exit => break,
            Prompted::Cancelled => {
                println!("\nOperation cancelled by user");
                break;
            }
        }
    }
}

/// Launch a session and run the interactive loop on the terminal
pub async fn run_interactive(config: BrowserConfig) -> anyhow::Result<()> {
    info!("Starting interactive mode");
    let mut session = CaptureSession::with_config(config).await?;
    let mut prompter = TerminalPrompter::new();

    run_loop(&mut session, &mut prompter).await;

    session.close().await;
    Ok(())
}

/// Browser configuration used by interactive mode
pub fn interactive_config() -> BrowserConfig {
    BrowserConfig::builder()
        .headless(true)
        .timeout_secs(INTERACTIVE_TIMEOUT_SECS)
        .wait_for_network(true)
        .build()
}
