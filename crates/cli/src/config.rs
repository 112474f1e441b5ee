//! Optional TOML configuration for `jlcheck`.
//!
//! # Example
//!
//! ```toml
//! [repl]
//! prompt = ">> "
//! continuation_prompt = ".. "
//! ```
//!
//! Every key has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fragments::Prompts;

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_ENV: &str = "JLCHECK_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub repl: ReplSettings,
}

/// `[repl]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplSettings {
    pub prompt: String,
    pub continuation_prompt: String,
}

impl Default for ReplSettings {
    fn default() -> Self {
        ReplSettings {
            prompt: ">> ".to_owned(),
            continuation_prompt: ".. ".to_owned(),
        }
    }
}

impl ReplSettings {
    pub fn prompts(&self) -> Prompts {
        Prompts {
            primary: self.prompt.clone(),
            continuation: self.continuation_prompt.clone(),
        }
    }
}

pub fn parse_config(content: &str) -> Result<Config, String> {
    toml::from_str(content).map_err(|e| format!("invalid configuration: {}", e))
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    parse_config(&content).map_err(|e| format!("{} ({})", e, path.display()))
}

/// Explicit path first, then `JLCHECK_CONFIG`, then built-in defaults.
pub fn resolve(explicit: Option<&Path>) -> Result<Config, String> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            load_config(&path)
        }
        None => Ok(Config::default()),
    }
}
