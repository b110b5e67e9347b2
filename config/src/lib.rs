//! Configuration for compila.
//!
//! Two layers:
//! - [`load_and_apply`]: fills the process environment from the project `.env` and the XDG
//!   `config.toml` `[env]` table with priority **existing env > .env > XDG**.
//! - [`Settings`]: typed client settings (endpoint, timeout, image dir, encoding) resolved from the
//!   environment and the XDG `[client]` table.

mod dotenv;
mod settings;
mod xdg_toml;

pub use settings::{Encoding, Settings, DEFAULT_ENDPOINT};
pub use xdg_toml::{config_path, ClientSection, XdgConfig};

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
    #[error("invalid {key}={value:?}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Keys to set, in the order they will be applied: only keys missing from `present`, valued from
/// `.env` first and XDG second.
fn merge_missing(
    present: impl Fn(&str) -> bool,
    dotenv: &HashMap<String, String>,
    xdg: &HashMap<String, String>,
) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = dotenv
        .iter()
        .chain(xdg.iter().filter(|(k, _)| !dotenv.contains_key(*k)))
        .filter(|(k, _)| !present(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    out.sort();
    out
}

/// Loads `.env` (from `override_dir` or the current directory) and
/// `$XDG_CONFIG_HOME/<app_name>/config.toml`, then sets every variable not already present in the
/// process environment.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let xdg = xdg_toml::load(app_name)?;
    let dotenv = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;
    for (k, v) in merge_missing(|k| std::env::var_os(k).is_some(), &dotenv, &xdg.env) {
        std::env::set_var(k, v);
    }
    Ok(())
}
