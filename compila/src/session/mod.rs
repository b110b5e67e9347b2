//! One run of a program against the stateless compile service.
//!
//! A [`RunSession`] is created per explicit compile action and discarded on the next compile or
//! clear. It owns the source (immutable for the run), the ordered inputs answered so far, and the
//! output shown before the current prompt. It is driven by the [`Controller`].

mod controller;

pub use controller::{Controller, Event, Outbound};

use std::fmt;

use serde::Serialize;

use crate::protocol::CompileRequest;

/// Monotonic identifier of a run within one [`Controller`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Identifies one round trip: the run it belongs to and its position in that run (0 = initial compile).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RequestTag {
    pub run: RunId,
    pub round: u32,
}

/// Observable state of the front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Requesting,
    AwaitingInput,
    Succeeded,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Bookkeeping for one run.
#[derive(Clone, Debug)]
pub struct RunSession {
    id: RunId,
    source: String,
    inputs: Vec<String>,
    state: SessionState,
    round: u32,
    prompt: Option<String>,
    output_before_prompt: Vec<String>,
}

impl RunSession {
    pub(crate) fn new(id: RunId, source: String) -> Self {
        Self {
            id,
            source,
            inputs: Vec::new(),
            state: SessionState::Requesting,
            round: 0,
            prompt: None,
            output_before_prompt: Vec::new(),
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Inputs answered so far, in the order they were requested.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn awaiting_input(&self) -> bool {
        self.state == SessionState::AwaitingInput
    }

    /// Round of the outstanding (or last) request.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn output_before_prompt(&self) -> &[String] {
        &self.output_before_prompt
    }

    pub(crate) fn tag(&self) -> RequestTag {
        RequestTag {
            run: self.id,
            round: self.round,
        }
    }

    /// The request for the current round: original source plus every input so far.
    pub(crate) fn request(&self) -> CompileRequest {
        CompileRequest::new(self.source.clone(), self.inputs.clone())
    }

    /// Whether a response tagged `tag` answers the request this session is waiting on.
    pub(crate) fn expects(&self, tag: RequestTag) -> bool {
        self.state == SessionState::Requesting && tag == self.tag()
    }

    pub(crate) fn pause(&mut self, prompt: String, output_before: Vec<String>) {
        self.state = SessionState::AwaitingInput;
        self.prompt = Some(prompt);
        self.output_before_prompt = output_before;
    }

    /// Appends an answer and moves on to the next round.
    pub(crate) fn resume(&mut self, value: String) {
        self.inputs.push(value);
        self.prompt = None;
        self.round += 1;
        self.state = SessionState::Requesting;
    }

    pub(crate) fn finish(&mut self, state: SessionState) {
        debug_assert!(state.is_terminal());
        self.state = state;
        self.prompt = None;
    }
}
