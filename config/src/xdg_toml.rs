//! `$XDG_CONFIG_HOME/<app>/config.toml`: an `[env]` table of environment defaults and a `[client]`
//! table of typed client settings.
//!
//! ```toml
//! [env]
//! RUST_LOG = "compila=debug"
//!
//! [client]
//! endpoint = "http://127.0.0.1:5000/compilar"
//! timeout_secs = 30
//! image_dir = "/tmp/compila"
//! encoding = "form"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LoadError;

/// `[client]` table. Every key is optional; unset keys fall through to defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub image_dir: Option<PathBuf>,
    pub encoding: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct XdgConfig {
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub client: ClientSection,
}

/// `$XDG_CONFIG_HOME` when set, else the platform config dir.
fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir().ok_or_else(|| LoadError::XdgPath("no config directory for this platform".to_string()))
}

pub fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    Ok(config_home()?.join(app_name).join("config.toml"))
}

/// Parses one config file. A missing file is an empty config.
pub fn load_from(path: &Path) -> Result<XdgConfig, LoadError> {
    if !path.exists() {
        return Ok(XdgConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(LoadError::XdgRead)?;
    Ok(toml::from_str(&content)?)
}

/// Loads the app's config file. No config directory at all (e.g. `HOME` unset) counts as no file.
pub fn load(app_name: &str) -> Result<XdgConfig, LoadError> {
    match config_path(app_name) {
        Ok(path) => load_from(&path),
        Err(LoadError::XdgPath(_)) => Ok(XdgConfig::default()),
        Err(e) => Err(e),
    }
}
