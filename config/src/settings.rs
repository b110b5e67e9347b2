//! Typed client settings.
//!
//! Resolution per key: explicit override (CLI flag, applied by the caller) > environment
//! (`<APP>_ENDPOINT`, `<APP>_TIMEOUT_SECS`, `<APP>_IMAGE_DIR`, `<APP>_ENCODING`) > XDG `[client]`
//! table > default. The environment already contains `.env` and XDG `[env]` values once
//! [`load_and_apply`](crate::load_and_apply) has run.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::xdg_toml::{self, ClientSection};
use crate::LoadError;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/compilar";

/// Body encoding for compile requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// `application/x-www-form-urlencoded`: `codigo` + JSON-encoded `inputs`.
    #[default]
    Form,
    /// JSON object `{"codigo": ..., "inputs": [...]}`.
    Json,
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "form" => Ok(Self::Form),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown encoding {:?} (expected form or json)", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    /// Whole-request timeout. None leaves it to the transport.
    pub timeout: Option<Duration>,
    /// Where rendered plots are written. None means the system temp dir.
    pub image_dir: Option<PathBuf>,
    pub encoding: Encoding,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
            image_dir: None,
            encoding: Encoding::default(),
        }
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> LoadError {
    LoadError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

impl Settings {
    /// Resolves settings for `app_name` from the process environment and its XDG config file.
    pub fn load(app_name: &str) -> Result<Self, LoadError> {
        let file = xdg_toml::load(app_name)?;
        Self::resolve(app_name, |k| std::env::var(k).ok(), &file.client)
    }

    /// Resolves settings from an environment lookup and a `[client]` table.
    pub fn resolve(
        app_name: &str,
        env: impl Fn(&str) -> Option<String>,
        file: &ClientSection,
    ) -> Result<Self, LoadError> {
        let prefix = app_name.to_ascii_uppercase().replace('-', "_");
        let key = |suffix: &str| format!("{}_{}", prefix, suffix);
        let var = |k: &str| env(k).filter(|v| !v.trim().is_empty());

        let endpoint = var(&key("ENDPOINT"))
            .or_else(|| file.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(invalid("endpoint", &endpoint, "must be an http(s) URL"));
        }

        let timeout_key = key("TIMEOUT_SECS");
        let timeout_secs = match var(&timeout_key) {
            Some(v) => Some(
                v.trim()
                    .parse::<u64>()
                    .map_err(|e| invalid(&timeout_key, &v, e.to_string()))?,
            ),
            None => file.timeout_secs,
        };

        let image_dir = var(&key("IMAGE_DIR"))
            .map(PathBuf::from)
            .or_else(|| file.image_dir.clone());

        let encoding_key = key("ENCODING");
        let encoding = match var(&encoding_key).or_else(|| file.encoding.clone()) {
            Some(v) => v.parse().map_err(|e: String| invalid(&encoding_key, &v, e))?,
            None => Encoding::default(),
        };

        Ok(Self {
            endpoint,
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
            image_dir,
            encoding,
        })
    }
}
