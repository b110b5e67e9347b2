//! Backend abstraction used by the `compila` CLI.
//!
//! A backend performs exactly one round trip: it posts a [`CompileRequest`] and returns the decoded
//! [`CompileResponse`]. It keeps no state between calls; replay of collected inputs is the run
//! driver's job ([`crate::run_program`]). Callers depend only on [`CompileBackend`], so tests can
//! substitute a scripted backend.

mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use compila::{CompileRequest, CompileResponse, TransportError};

#[async_trait]
pub trait CompileBackend: Send + Sync {
    /// Performs one round trip.
    ///
    /// Network failures, unexpected HTTP statuses without a usable body, and bodies that do not
    /// decode are all reported as [`TransportError`]; callers do not retry.
    async fn compile(&self, request: &CompileRequest) -> Result<CompileResponse, TransportError>;
}
