//! Connection settings for the CMS.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "CTFEXPORT_CONFIG";

/// Config file name looked up in `$HOME` or the working directory.
pub const CONFIG_FILE_NAME: &str = ".ctfexport.json";

pub const TOKEN_VAR: &str = "CONTENTFUL_MANAGEMENT_TOKEN";
pub const SPACE_VAR: &str = "CONTENTFUL_SPACE_ID";
pub const ENVIRONMENT_VAR: &str = "CONTENTFUL_ENVIRONMENT_ID";

/// Environment used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "master";

/// Stored connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Personal content management token
    #[serde(default)]
    pub cma_token: String,

    /// Space id
    #[serde(default)]
    pub space_id: String,

    /// Environment id (default: master)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub env_id: String,

    /// Locales to export; empty means every locale of the environment
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locales: Vec<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config path: `$CTFEXPORT_CONFIG`, `$HOME/.ctfexport.json`,
    /// or `.ctfexport.json` in the working directory.
    pub fn default_path() -> PathBuf {
        if let Some(path) = env::var_os(CONFIG_PATH_VAR) {
            return PathBuf::from(path);
        }
        match env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(CONFIG_FILE_NAME),
            None => PathBuf::from(CONFIG_FILE_NAME),
        }
    }

    /// Load a config file. A missing file yields the default config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Overlay non-empty environment variables.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|name| env::var(name).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(token) = present(TOKEN_VAR) {
            self.cma_token = token;
        }
        if let Some(space) = present(SPACE_VAR) {
            self.space_id = space;
        }
        if let Some(env_id) = present(ENVIRONMENT_VAR) {
            self.env_id = env_id;
        }
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.cma_token = token.into();
        self
    }

    pub fn with_space(mut self, space_id: impl Into<String>) -> Self {
        self.space_id = space_id.into();
        self
    }

    pub fn with_environment(mut self, env_id: impl Into<String>) -> Self {
        self.env_id = env_id.into();
        self
    }

    pub fn with_locales(mut self, locales: Vec<String>) -> Self {
        self.locales = locales;
        self
    }

    /// Environment id, falling back to `master`.
    pub fn env_id(&self) -> &str {
        if self.env_id.is_empty() {
            DEFAULT_ENVIRONMENT
        } else {
            &self.env_id
        }
    }

    /// Fail unless token and space are set.
    pub fn validate(&self) -> Result<()> {
        if self.cma_token.trim().is_empty() {
            return Err(Error::Config(format!(
                "no management token configured (run `ctfexport configure` or set {})",
                TOKEN_VAR
            )));
        }
        if self.space_id.trim().is_empty() {
            return Err(Error::Config(format!(
                "no space id configured (run `ctfexport configure` or set {})",
                SPACE_VAR
            )));
        }
        Ok(())
    }

    /// Token with the middle hidden, e.g. `CFPA*****wxyz`.
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.cma_token.chars().collect();
        if chars.is_empty() {
            return "(required)".to_string();
        }
        if chars.len() < 9 {
            return "*****".to_string();
        }
        let front: String = chars[..4].iter().collect();
        let back: String = chars[chars.len() - 5..chars.len() - 1].iter().collect();
        format!("{}*****{}", front, back)
    }
}
