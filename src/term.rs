// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Console interaction.
//!
//! All user facing output and every blocking prompt go through the
//! [`Terminal`] trait. The real terminal prints to stdout/stderr and prompts
//! through inquire. The [`ReplayTerminal`] answers prompts from a fixed list
//! and records everything printed, so tests can drive interactive flows.
//!
//! # Cancellation
//!
//! Interrupting a prompt (Ctrl-C, Escape, or end of input) never exits the
//! process from here. It surfaces as [`TermError::Cancelled`] and travels up
//! to the binary, which decides how to terminate.

use inquire::{InquireError, Text};
use std::{
    cell::RefCell,
    collections::VecDeque,
    fmt::{Display, Formatter, Result as FmtResult},
    io::{stdin, stdout, BufRead, Write},
    rc::Rc,
};
use tracing::debug;

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Plain,
    Info,
    Warning,
    Error,
    Debug,
}

impl Severity {
    /// Glyph printed in front of the message.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Plain => "::",
            Self::Info => "[+]",
            Self::Warning | Self::Error => "[!]",
            Self::Debug => "..",
        }
    }

    /// Whether the message belongs on the diagnostic stream.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Warning | Self::Error | Self::Debug)
    }
}

impl Display for Severity {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.glyph())
    }
}

/// Format a report line.
///
/// Lines are prefixed with the patch name in brackets when one is given,
/// followed by the severity glyph.
pub fn format_line(patch: Option<&str>, severity: Severity, message: &str) -> String {
    match patch {
        Some(name) if !name.is_empty() => format!("[{name}] {severity} {message}"),
        _ => format!("{severity} {message}"),
    }
}

/// User facing console.
pub trait Terminal {
    /// Print one finished report line.
    fn print(&mut self, severity: Severity, line: &str);

    /// Block until user answers prompt.
    ///
    /// # Errors
    ///
    /// - Return [`TermError::Cancelled`] if user interrupts the prompt.
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// Terminal backed by standard streams.
///
/// Prompts use inquire when attached to a TTY, and fall back to plain line
/// reads from stdin otherwise.
#[derive(Debug, Default)]
pub struct StdTerminal;

impl StdTerminal {
    /// Construct new standard terminal.
    pub fn new() -> Self {
        Self
    }

    fn ask_plain(&self, prompt: &str) -> Result<String> {
        print!("{prompt}");
        stdout().flush()?;

        let mut line = String::new();
        if stdin().lock().read_line(&mut line)? == 0 {
            return Err(TermError::Cancelled);
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Terminal for StdTerminal {
    fn print(&mut self, severity: Severity, line: &str) {
        if severity.is_diagnostic() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        match Text::new(prompt).prompt() {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationInterrupted | InquireError::OperationCanceled) => {
                Err(TermError::Cancelled)
            }
            Err(InquireError::NotTTY) => {
                debug!("stdin is not a terminal, reading plain line");
                self.ask_plain(prompt)
            }
            Err(InquireError::IO(err)) => Err(TermError::Io(err)),
            Err(err) => Err(TermError::Prompt(err.to_string())),
        }
    }
}

/// Single entry recorded by [`ReplayTerminal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    /// Printed line with its severity.
    Line(Severity, String),

    /// Prompt shown to the user.
    Prompt(String),
}

#[derive(Debug, Default)]
struct Replay {
    answers: VecDeque<Option<String>>,
    transcript: Vec<Transcript>,
}

/// Terminal that replays canned answers.
///
/// Each prompt consumes the next answer. A `None` answer, or running out of
/// answers, acts like the user interrupting the prompt. Clones share the
/// same answer queue and transcript.
#[derive(Debug, Clone, Default)]
pub struct ReplayTerminal {
    inner: Rc<RefCell<Replay>>,
}

impl ReplayTerminal {
    /// Construct replay terminal from answers given in prompt order.
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let answers = answers.into_iter().map(|answer| Some(answer.into()));
        Self::with_answers(answers)
    }

    /// Construct replay terminal where `None` answers cancel the prompt.
    pub fn with_answers(answers: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Replay {
                answers: answers.into_iter().collect(),
                transcript: Vec::new(),
            })),
        }
    }

    /// Everything printed and prompted so far.
    pub fn transcript(&self) -> Vec<Transcript> {
        self.inner.borrow().transcript.clone()
    }

    /// Printed lines only, without severities.
    pub fn lines(&self) -> Vec<String> {
        self.inner
            .borrow()
            .transcript
            .iter()
            .filter_map(|entry| match entry {
                Transcript::Line(_, line) => Some(line.clone()),
                Transcript::Prompt(_) => None,
            })
            .collect()
    }

    /// Prompts shown so far.
    pub fn prompts(&self) -> Vec<String> {
        self.inner
            .borrow()
            .transcript
            .iter()
            .filter_map(|entry| match entry {
                Transcript::Prompt(prompt) => Some(prompt.clone()),
                Transcript::Line(..) => None,
            })
            .collect()
    }

    /// Number of answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.inner.borrow().answers.len()
    }
}

impl Terminal for ReplayTerminal {
    fn print(&mut self, severity: Severity, line: &str) {
        self.inner
            .borrow_mut()
            .transcript
            .push(Transcript::Line(severity, line.to_string()));
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        let mut inner = self.inner.borrow_mut();
        inner.transcript.push(Transcript::Prompt(prompt.to_string()));
        inner
            .answers
            .pop_front()
            .flatten()
            .ok_or(TermError::Cancelled)
    }
}

/// Console interaction error types.
#[derive(Debug, thiserror::Error)]
pub enum TermError {
    /// User interrupted a prompt.
    #[error("operation cancelled by user")]
    Cancelled,

    /// Prompt could not be displayed.
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// Standard streams failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = TermError> = std::result::Result<T, E>;
