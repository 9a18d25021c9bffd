use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::fetch::Method;
use crate::parser::{ParseOptions, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
use crate::pipeline::PanelKind;
use crate::renderer::OutputFormat;

pub const DEFAULT_USER_AGENT: &str = concat!("xmlview/", env!("CARGO_PKG_VERSION"));

/// Settings read from `config.json`; every key is optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL that relative targets are resolved against
    pub base_url: Option<String>,
    pub method: Method,
    pub format: OutputFormat,
    /// Panel opened after a load; `null` keeps every panel collapsed
    pub panel: Option<PanelKind>,
    pub max_depth: usize,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            method: Method::Get,
            format: OutputFormat::Html,
            panel: Some(PanelKind::Xml),
            max_depth: DEFAULT_MAX_DEPTH,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// `<config dir>/xmlview/config.json`, when the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("xmlview").join("config.json"))
    }

    /// Load an explicit config file, or the default one if it exists.
    ///
    /// A missing default file is not an error; a missing explicit one is.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_DEPTH_LIMIT).contains(&self.max_depth) {
            bail!(
                "max_depth must be between 1 and {}, got {}",
                MAX_DEPTH_LIMIT,
                self.max_depth
            );
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Option<Url>> {
        self.base_url
            .as_deref()
            .map(|raw| Url::parse(raw).with_context(|| format!("Invalid base URL: {}", raw)))
            .transpose()
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
        }
    }
}
