//! Dispatcher for the run state machine.
//!
//! Front ends translate user actions and network completions into [`Event`]s and call
//! [`Controller::dispatch`]. When a transition needs a round trip, `dispatch` returns an
//! [`Outbound`] request; the caller performs it and feeds the result back as
//! [`Event::Response`] with the same tag. The controller never performs I/O itself.
//!
//! ```text
//! Idle --Compile--> Requesting --needs_input--> AwaitingInput --SubmitInput--> Requesting
//!                        |                                                       |
//!                        +--success--> Succeeded        error/transport--> Failed
//! ```

use tracing::{debug, info, warn};

use crate::console::{Console, ErrorKind};
use crate::error::{SessionError, TransportError};
use crate::protocol::{CompileRequest, CompileResponse};
use crate::session::{RequestTag, RunId, RunSession, SessionState};

/// Input to the state machine.
#[derive(Debug)]
pub enum Event {
    /// Explicit compile action; starts a fresh run.
    Compile { source: String },
    /// Answer to the pending prompt.
    SubmitInput { value: String },
    /// Completion of the round trip identified by `tag`.
    Response {
        tag: RequestTag,
        result: Result<CompileResponse, TransportError>,
    },
    /// Explicit clear action; discards the run and empties the console.
    Clear,
}

/// A request the caller must send, tagged so its response can be matched to this round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outbound {
    pub tag: RequestTag,
    pub request: CompileRequest,
}

/// Owns the live [`RunSession`] (if any) and the [`Console`] it renders to.
#[derive(Debug, Default)]
pub struct Controller {
    next_run: u64,
    session: Option<RunSession>,
    console: Console,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(RunSession::state)
            .unwrap_or(SessionState::Idle)
    }

    pub fn session(&self) -> Option<&RunSession> {
        self.session.as_ref()
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// False while a request is in flight; front ends disable their compile action on it.
    pub fn compile_enabled(&self) -> bool {
        self.state() != SessionState::Requesting
    }

    /// Applies one event. Returns the request to send, if the transition needs one.
    ///
    /// Errors are local validation failures only; they leave the controller untouched.
    pub fn dispatch(&mut self, event: Event) -> Result<Option<Outbound>, SessionError> {
        match event {
            Event::Compile { source } => self.start_run(source).map(Some),
            Event::SubmitInput { value } => self.submit_input(value).map(Some),
            Event::Response { tag, result } => {
                self.apply_response(tag, result);
                Ok(None)
            }
            Event::Clear => {
                self.clear();
                Ok(None)
            }
        }
    }

    fn start_run(&mut self, source: String) -> Result<Outbound, SessionError> {
        if source.trim().is_empty() {
            return Err(SessionError::EmptySource);
        }
        if let Some(old) = &self.session {
            if old.state() == SessionState::Requesting {
                debug!(run = %old.id(), "superseding run with a request in flight");
            }
        }
        self.next_run += 1;
        let session = RunSession::new(RunId(self.next_run), source);
        info!(run = %session.id(), bytes = session.source().len(), "compile run started");
        self.console.begin_run(session.id());
        let out = Outbound {
            tag: session.tag(),
            request: session.request(),
        };
        self.session = Some(session);
        Ok(out)
    }

    fn submit_input(&mut self, value: String) -> Result<Outbound, SessionError> {
        let session = match self.session.as_mut() {
            Some(s) if s.awaiting_input() => s,
            _ => return Err(SessionError::NotAwaitingInput),
        };
        if value.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.console.echo_input(&value);
        session.resume(value);
        debug!(
            run = %session.id(),
            round = session.round(),
            inputs = session.inputs().len(),
            "resuming with input"
        );
        Ok(Outbound {
            tag: session.tag(),
            request: session.request(),
        })
    }

    fn apply_response(&mut self, tag: RequestTag, result: Result<CompileResponse, TransportError>) {
        let Some(session) = self.session.as_mut() else {
            debug!(run = %tag.run, round = tag.round, "dropping response: no live run");
            return;
        };
        if !session.expects(tag) {
            debug!(
                run = %tag.run,
                round = tag.round,
                live_run = %session.id(),
                state = ?session.state(),
                "dropping stale response"
            );
            return;
        }

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(run = %tag.run, round = tag.round, error = %e, "round trip failed");
                session.finish(SessionState::Failed);
                self.console
                    .show_failure(ErrorKind::Transport, Some(e.to_string()), vec![], vec![]);
                return;
            }
        };

        debug!(run = %tag.run, round = tag.round, status = response.status().as_str(), "response");
        match response {
            CompileResponse::Success(ok) => {
                session.finish(SessionState::Succeeded);
                self.console.show_success(&ok, tag.round == 0);
            }
            CompileResponse::NeedsInput(pending) => {
                let Some(first) = pending.into_iter().next() else {
                    session.finish(SessionState::Failed);
                    self.console.show_failure(
                        ErrorKind::Transport,
                        Some(TransportError::from(crate::ProtocolError::NoPendingInput).to_string()),
                        vec![],
                        vec![],
                    );
                    return;
                };
                self.console.show_prompt(&first.output_before, &first.prompt);
                session.pause(first.prompt, first.output_before);
            }
            CompileResponse::LexicalError {
                diagnostics,
                tokens,
            } => {
                session.finish(SessionState::Failed);
                self.console
                    .show_failure(ErrorKind::Lexical, None, diagnostics, tokens);
            }
            CompileResponse::SyntacticError {
                diagnostics,
                tokens,
            } => {
                session.finish(SessionState::Failed);
                self.console
                    .show_failure(ErrorKind::Syntactic, None, diagnostics, tokens);
            }
            CompileResponse::GenericError {
                message,
                diagnostics,
            } => {
                session.finish(SessionState::Failed);
                self.console
                    .show_failure(ErrorKind::Runtime, Some(message), diagnostics, vec![]);
            }
        }
    }

    fn clear(&mut self) {
        if let Some(s) = self.session.take() {
            debug!(run = %s.id(), state = ?s.state(), "run cleared");
        }
        self.console.clear();
    }
}
