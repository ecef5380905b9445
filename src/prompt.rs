//! Questions the core asks the user before destructive or free-text steps.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Prompter {
    fn confirm(&mut self, message: &str) -> bool;
    /// `None` means the user cancelled.
    fn prompt_text(&mut self, message: &str, default: &str) -> Option<String>;
}

/// Accepts every confirmation and every default. Used by `--yes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }

    fn prompt_text(&mut self, _message: &str, default: &str) -> Option<String> {
        Some(default.to_string())
    }
}

/// Line-based prompts on stdin/stderr for the non-TUI subcommands.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    fn read_line(&mut self, label: &str) -> Option<String> {
        let mut err = io::stderr();
        write!(err, "{label}").ok()?;
        err.flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl Prompter for StdinPrompter {
    fn confirm(&mut self, message: &str) -> bool {
        self.read_line(&format!("{message} [y/N] "))
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn prompt_text(&mut self, message: &str, default: &str) -> Option<String> {
        let line = self.read_line(&format!("{message} [{default}] "))?;
        if line.is_empty() {
            Some(default.to_string())
        } else {
            Some(line)
        }
    }
}

/// Replays canned answers in order; runs out into "no" / cancel.
#[derive(Debug, Default, Clone)]
pub struct Scripted {
    confirms: VecDeque<bool>,
    texts: VecDeque<Option<String>>,
    pub asked: Vec<String>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirm_with(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    pub fn answer(mut self, text: Option<&str>) -> Self {
        self.texts.push_back(text.map(str::to_string));
        self
    }
}

impl Prompter for Scripted {
    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        self.confirms.pop_front().unwrap_or(false)
    }

    fn prompt_text(&mut self, message: &str, _default: &str) -> Option<String> {
        self.asked.push(message.to_string());
        self.texts.pop_front().flatten()
    }
}
