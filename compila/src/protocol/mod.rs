//! # Protocol module
//!
//! Request/response shapes of the `/compilar` endpoint.
//!
//! - **Request** ([`CompileRequest`]): the full source (`codigo`) plus every input collected so far
//!   (`inputs`). The service is stateless, so each round trip replays the program from the start.
//! - **Response** ([`CompileResponse`]): discriminated by the `estado` field. Both the Spanish tags
//!   used by the service (`correcto`, `error_lexico`, ...) and English aliases are accepted.

pub mod image;

pub use image::{decode_image, Image, ImageKind};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

// -----------------------------------------------------------------------------
// Request (client → service)
// -----------------------------------------------------------------------------

/// One round trip's payload: original source plus the complete ordered input list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    #[serde(rename = "codigo")]
    pub source: String,
    #[serde(default)]
    pub inputs: Vec<String>,
}

impl CompileRequest {
    pub fn new(source: impl Into<String>, inputs: Vec<String>) -> Self {
        Self {
            source: source.into(),
            inputs,
        }
    }

    /// Fields for an `application/x-www-form-urlencoded` body: `codigo` and `inputs`
    /// (the input list JSON-encoded, since form fields are flat strings).
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let inputs = serde_json::to_string(&self.inputs).unwrap_or_else(|_| "[]".to_string());
        vec![("codigo", self.source.clone()), ("inputs", inputs)]
    }
}

// -----------------------------------------------------------------------------
// Response (service → client)
// -----------------------------------------------------------------------------

/// Closed set of response tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    NeedsInput,
    LexicalError,
    SyntacticError,
    GenericError,
}

impl Status {
    /// Maps an `estado` value (Spanish or English) to a status.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "correcto" | "success" => Some(Self::Success),
            "esperando_input" | "needs_input" => Some(Self::NeedsInput),
            "error_lexico" | "lexical_error" => Some(Self::LexicalError),
            "error_sintactico" | "syntactic_error" => Some(Self::SyntacticError),
            "error" | "generic_error" => Some(Self::GenericError),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NeedsInput => "needs_input",
            Self::LexicalError => "lexical_error",
            Self::SyntacticError => "syntactic_error",
            Self::GenericError => "generic_error",
        }
    }
}

/// Lexeme and category as produced by the service lexer, e.g. `("int", "TIPO_ENTERO")`.
///
/// On the wire a token is a two-element array: `["int", "TIPO_ENTERO"]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Token {
    pub lexeme: String,
    pub category: String,
}

impl From<(String, String)> for Token {
    fn from((lexeme, category): (String, String)) -> Self {
        Self { lexeme, category }
    }
}

impl From<Token> for (String, String) {
    fn from(t: Token) -> Self {
        (t.lexeme, t.category)
    }
}

/// High-level action executed by the program (`window`, `draw2d`, `draw3d`, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, Value>,
}

impl Action {
    /// One-line summary: kind followed by `key=value` pairs sorted by key.
    pub fn summary(&self) -> String {
        let mut keys: Vec<&String> = self.params.keys().collect();
        keys.sort();
        let mut out = self.kind.clone();
        for k in keys {
            let v = match &self.params[k] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.push_str(&format!(" {}={}", k, v));
        }
        out
    }
}

/// A value the paused program is waiting for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingInput {
    pub prompt: String,
    /// Output produced before the program paused on this request.
    pub output_before: Vec<String>,
}

/// Payload of a successful run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunSuccess {
    pub output: Vec<String>,
    pub actions: Vec<Action>,
    pub image: Option<Image>,
    pub tokens: Vec<Token>,
}

/// A decoded `/compilar` response.
#[derive(Clone, Debug, PartialEq)]
pub enum CompileResponse {
    Success(RunSuccess),
    /// Never empty; only the first request is acted upon per round trip.
    NeedsInput(Vec<PendingInput>),
    LexicalError {
        diagnostics: Vec<String>,
        tokens: Vec<Token>,
    },
    SyntacticError {
        diagnostics: Vec<String>,
        tokens: Vec<Token>,
    },
    GenericError {
        message: String,
        diagnostics: Vec<String>,
    },
}

impl CompileResponse {
    pub fn status(&self) -> Status {
        match self {
            Self::Success(_) => Status::Success,
            Self::NeedsInput(_) => Status::NeedsInput,
            Self::LexicalError { .. } => Status::LexicalError,
            Self::SyntacticError { .. } => Status::SyntacticError,
            Self::GenericError { .. } => Status::GenericError,
        }
    }

    /// Parses a response body.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::Json(e.to_string()))?;
        Self::from_value(value)
    }

    /// Converts an already-parsed JSON body.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let wire: WireResponse =
            serde_json::from_value(value).map_err(|e| ProtocolError::Json(e.to_string()))?;
        wire.try_into()
    }
}

/// Program output as sent by the service: one string with newlines, or a list of lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireOutput {
    Text(String),
    Lines(Vec<String>),
}

impl WireOutput {
    fn into_lines(self) -> Vec<String> {
        match self {
            Self::Text(s) => s.lines().map(str::to_string).collect(),
            Self::Lines(v) => v,
        }
    }
}

#[derive(Deserialize)]
struct WirePending {
    #[serde(rename = "mensaje", alias = "prompt")]
    prompt: String,
    #[serde(default, rename = "salida", alias = "output")]
    output: Option<WireOutput>,
}

#[derive(Deserialize)]
struct WireResponse {
    estado: Option<String>,
    #[serde(default)]
    texto: Option<WireOutput>,
    #[serde(default)]
    acciones: Option<Vec<Action>>,
    #[serde(default)]
    imagen: Option<String>,
    #[serde(default)]
    tipo_imagen: Option<String>,
    #[serde(default)]
    tokens: Option<Vec<Token>>,
    #[serde(default)]
    errores: Option<Vec<String>>,
    #[serde(default)]
    mensaje: Option<String>,
    #[serde(default)]
    inputs_pendientes: Option<Vec<WirePending>>,
}

impl TryFrom<WireResponse> for CompileResponse {
    type Error = ProtocolError;

    fn try_from(w: WireResponse) -> Result<Self, Self::Error> {
        let tag = w.estado.ok_or(ProtocolError::MissingStatus)?;
        let status = Status::from_tag(&tag).ok_or(ProtocolError::UnknownStatus(tag))?;
        let tokens = w.tokens.unwrap_or_default();
        let diagnostics = w.errores.unwrap_or_default();
        Ok(match status {
            Status::Success => {
                let image = match w.imagen.as_deref().filter(|s| !s.trim().is_empty()) {
                    Some(encoded) => Some(decode_image(encoded, w.tipo_imagen.as_deref())?),
                    None => None,
                };
                Self::Success(RunSuccess {
                    output: w.texto.map(WireOutput::into_lines).unwrap_or_default(),
                    actions: w.acciones.unwrap_or_default(),
                    image,
                    tokens,
                })
            }
            Status::NeedsInput => {
                let pending: Vec<PendingInput> = w
                    .inputs_pendientes
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| PendingInput {
                        prompt: p.prompt,
                        output_before: p.output.map(WireOutput::into_lines).unwrap_or_default(),
                    })
                    .collect();
                if pending.is_empty() {
                    return Err(ProtocolError::NoPendingInput);
                }
                Self::NeedsInput(pending)
            }
            Status::LexicalError => Self::LexicalError {
                diagnostics,
                tokens,
            },
            Status::SyntacticError => Self::SyntacticError {
                diagnostics,
                tokens,
            },
            Status::GenericError => Self::GenericError {
                message: w.mensaje.unwrap_or_default(),
                diagnostics,
            },
        })
    }
}
