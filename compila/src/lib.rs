//! # Compila
//!
//! Client-side core for the `/compilar` compile-and-run service: a toy-language program is posted
//! to the service, which answers with output, tokens, diagnostics, an optional plot, or a request
//! for one more input value.
//!
//! Interactive programs are handled by replay. The service keeps no session, so each time the
//! program asks for a value the run pauses, the user answers, and the *same* source is posted again
//! with the full ordered list of answers. The program re-executes deterministically up to the next
//! prompt (or to the end).
//!
//! ## Main modules
//!
//! - [`protocol`]: [`CompileRequest`], [`CompileResponse`], [`Token`], [`Action`], [`Image`].
//! - [`session`]: [`RunSession`] bookkeeping and the [`Controller`] state machine
//!   (Idle → Requesting → AwaitingInput → … → Succeeded / Failed).
//! - [`console`]: [`Console`], the front-end-independent view of the current run.
//! - [`error`]: [`SessionError`], [`TransportError`], [`ProtocolError`].
//!
//! The crate does no I/O: front ends perform the [`Outbound`] requests returned by
//! [`Controller::dispatch`] and feed the results back as [`Event::Response`].

pub mod console;
pub mod error;
pub mod protocol;
pub mod session;

pub use console::{Console, ConsoleStatus, Diagnostics, ErrorKind};
pub use error::{ProtocolError, SessionError, TransportError};
pub use protocol::{
    decode_image, Action, CompileRequest, CompileResponse, Image, ImageKind, PendingInput,
    RunSuccess, Status, Token,
};
pub use session::{Controller, Event, Outbound, RequestTag, RunId, RunSession, SessionState};
