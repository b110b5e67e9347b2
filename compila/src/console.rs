//! Console panel model: what a front end shows for the current run.
//!
//! The [`Controller`](crate::Controller) writes into a [`Console`]; front ends only read it. Program
//! output is *replaced* on every response because each round trip replays the program from the
//! start, so the latest response always carries the complete output so far.

use serde::Serialize;

use crate::protocol::{Image, RunSuccess, Token};
use crate::session::RunId;

/// Status line of the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleStatus {
    Running,
    AwaitingInput,
    Succeeded,
    Failed,
}

/// Which stage reported a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Lexical,
    Syntactic,
    Runtime,
    Transport,
}

impl ErrorKind {
    pub fn header(self) -> &'static str {
        match self {
            Self::Lexical => "Lexical error",
            Self::Syntactic => "Syntactic error",
            Self::Runtime => "Runtime error",
            Self::Transport => "Connection error",
        }
    }
}

/// Error block: kind, optional message, then every diagnostic in the order received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub kind: ErrorKind,
    pub message: Option<String>,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Console {
    pub run: Option<RunId>,
    pub status: Option<ConsoleStatus>,
    pub output: Vec<String>,
    pub prompt: Option<String>,
    pub echoed_inputs: Vec<String>,
    pub diagnostics: Option<Diagnostics>,
    pub actions: Vec<String>,
    pub tokens: Vec<Token>,
    pub image: Option<Image>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties every panel (console and token display).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub(crate) fn begin_run(&mut self, run: RunId) {
        self.clear();
        self.run = Some(run);
        self.status = Some(ConsoleStatus::Running);
    }

    pub(crate) fn show_prompt(&mut self, output_before: &[String], prompt: &str) {
        self.status = Some(ConsoleStatus::AwaitingInput);
        self.output = output_before.to_vec();
        self.prompt = Some(prompt.to_string());
    }

    pub(crate) fn echo_input(&mut self, value: &str) {
        self.status = Some(ConsoleStatus::Running);
        self.prompt = None;
        self.echoed_inputs.push(value.to_string());
    }

    pub(crate) fn show_success(&mut self, ok: &RunSuccess, with_tokens: bool) {
        self.status = Some(ConsoleStatus::Succeeded);
        self.prompt = None;
        self.output = ok.output.clone();
        self.actions = ok.actions.iter().map(|a| a.summary()).collect();
        self.image = ok.image.clone();
        if with_tokens {
            self.tokens = ok.tokens.clone();
        }
    }

    pub(crate) fn show_failure(
        &mut self,
        kind: ErrorKind,
        message: Option<String>,
        lines: Vec<String>,
        tokens: Vec<Token>,
    ) {
        self.status = Some(ConsoleStatus::Failed);
        self.prompt = None;
        self.diagnostics = Some(Diagnostics {
            kind,
            message: message.filter(|m| !m.trim().is_empty()),
            lines,
        });
        if !tokens.is_empty() {
            self.tokens = tokens;
        }
    }
}
