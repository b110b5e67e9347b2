//! HttpBackend: one POST to the `/compilar` endpoint per round trip.

use std::time::Duration;

use async_trait::async_trait;
use compila::{CompileRequest, CompileResponse, ProtocolError, TransportError};
use config::{Encoding, Settings};
use reqwest::header::ACCEPT;

use super::CompileBackend;

/// Longest response body quoted back in a status error.
const ERROR_BODY_MAX: usize = 200;

pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
    encoding: Encoding,
}

impl HttpBackend {
    /// `timeout`: whole-request limit; None leaves it to the transport.
    pub fn new(
        endpoint: impl Into<String>,
        encoding: Encoding,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            encoding,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, TransportError> {
        Self::new(settings.endpoint.clone(), settings.encoding, settings.timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Turns a status code and body into a response.
    ///
    /// The service reports its own failures as JSON (sometimes with a 4xx status), so the body is
    /// decoded first regardless of status. Only a body that is not JSON at all falls back to a
    /// status error when the status is not a success.
    fn decode(status: u16, body: &str) -> Result<CompileResponse, TransportError> {
        match CompileResponse::from_json(body) {
            Ok(resp) => Ok(resp),
            Err(ProtocolError::Json(_)) if !(200..300).contains(&status) => {
                Err(TransportError::Status {
                    status,
                    body: crate::display::truncate_display(body.trim(), ERROR_BODY_MAX),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CompileBackend for HttpBackend {
    async fn compile(&self, request: &CompileRequest) -> Result<CompileResponse, TransportError> {
        let builder = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json");
        let builder = match self.encoding {
            Encoding::Form => builder.form(&request.form_fields()),
            Encoding::Json => builder.json(request),
        };
        let res = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Network(format!("timed out: {}", e))
            } else {
                TransportError::Network(e.to_string())
            }
        })?;
        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        tracing::debug!(status, bytes = body.len(), endpoint = %self.endpoint, "compile response");
        Self::decode(status, &body)
    }
}
