//! Run driver: takes one program from compile to a terminal state.
//!
//! Feeds the [`Controller`] events, performs every [`Outbound`](compila::Outbound) round trip on the
//! backend, asks the [`InputSource`] whenever the program waits for input, and re-renders the
//! console after each step.

use std::io;

use compila::{Controller, Event, SessionError, SessionState};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, info_span, Instrument};

use crate::backend::CompileBackend;
use crate::display::ConsoleView;
use crate::input::InputSource;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded,
    Failed,
    /// Input ran out while the program was waiting for it.
    Abandoned,
}

impl RunOutcome {
    pub fn is_success(self) -> bool {
        self == Self::Succeeded
    }
}

/// Compiles `source` and drives the run until it succeeds, fails or input runs out.
///
/// A blank source is rejected with [`SessionError::EmptySource`] before any request. Blank answers
/// are ignored and the prompt is shown again.
pub async fn run_program(
    backend: &dyn CompileBackend,
    controller: &mut Controller,
    source: String,
    input: &mut dyn InputSource,
    view: &mut dyn ConsoleView,
) -> Result<RunOutcome, RunError> {
    let first = controller.dispatch(Event::Compile { source })?;
    let span = info_span!(
        "compile_run",
        run = %controller.console().run.map(|r| r.to_string()).unwrap_or_default()
    );
    drive(backend, controller, first, input, view)
        .instrument(span)
        .await
}

async fn drive(
    backend: &dyn CompileBackend,
    controller: &mut Controller,
    mut next: Option<compila::Outbound>,
    input: &mut dyn InputSource,
    view: &mut dyn ConsoleView,
) -> Result<RunOutcome, RunError> {
    view.render(controller.console())?;
    while let Some(out) = next.take() {
        view.request_sent(&out)?;
        let result = backend
            .compile(&out.request)
            .instrument(info_span!("round", round = out.tag.round))
            .await;
        controller.dispatch(Event::Response {
            tag: out.tag,
            result,
        })?;
        view.render(controller.console())?;

        match controller.state() {
            SessionState::Succeeded => return Ok(RunOutcome::Succeeded),
            SessionState::Failed => return Ok(RunOutcome::Failed),
            SessionState::AwaitingInput => {
                let prompt = controller
                    .session()
                    .and_then(|s| s.prompt())
                    .unwrap_or_default()
                    .to_string();
                loop {
                    let Some(value) = input.next_input(&prompt).await? else {
                        info!(prompt = %prompt, "input closed while awaiting input");
                        return Ok(RunOutcome::Abandoned);
                    };
                    match controller.dispatch(Event::SubmitInput { value }) {
                        Ok(o) => {
                            next = o;
                            break;
                        }
                        Err(SessionError::EmptyInput) => view.render(controller.console())?,
                        Err(e) => return Err(e.into()),
                    }
                }
                view.render(controller.console())?;
            }
            SessionState::Idle | SessionState::Requesting => {}
        }
    }
    Ok(if controller.state() == SessionState::Succeeded {
        RunOutcome::Succeeded
    } else {
        RunOutcome::Failed
    })
}
