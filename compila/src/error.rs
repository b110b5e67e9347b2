//! Error types for the run session and its transport.
//!
//! - [`SessionError`]: local validation, rejected before any request is built.
//! - [`TransportError`]: network failure, unexpected HTTP status or a malformed response;
//!   always moves the live run to a terminal error.
//! - [`ProtocolError`]: why a response body could not be turned into a [`CompileResponse`](crate::CompileResponse).

use thiserror::Error;

/// Rejected user action. Carries no side effects: the session is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("source is empty: write some code before compiling")]
    EmptySource,
    #[error("input is empty: type a value and press enter")]
    EmptyInput,
    #[error("no input is being requested")]
    NotAwaitingInput,
}

/// Wire-level conversion failure for a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("invalid json: {0}")]
    Json(String),
    #[error("missing field `estado`")]
    MissingStatus,
    #[error("unknown estado: {0}")]
    UnknownStatus(String),
    #[error("needs_input response without pending input requests")]
    NoPendingInput,
    #[error("imagen is not valid base64: {0}")]
    InvalidImage(String),
}

/// Failure to obtain a usable response for one round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("unexpected http status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(#[from] ProtocolError),
}
