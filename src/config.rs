use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::endpoint::{self, DEFAULT_STREAM_PATH};
use crate::model::buffer::DEFAULT_BUFFER_LEN;
use crate::model::symbol::{normalize_symbols, Symbol, DEFAULT_SYMBOLS};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub stream_path: String,
    pub keepalive_secs: u64,
    pub keepalive_payload: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub buffer_len: usize,
    pub default_symbol: String,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            keepalive_secs: 10,
            keepalive_payload: "ping".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
            buffer_len: DEFAULT_BUFFER_LEN,
            default_symbol: DEFAULT_SYMBOLS[0].to_string(),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }
}

impl UiConfig {
    /// Picker entries. The default symbol is always offered, placed first if it was missing.
    pub fn selectable_symbols(&self) -> Vec<Symbol> {
        let mut out = normalize_symbols(&self.symbols);
        let primary = Symbol::new(&self.default_symbol);
        if !primary.is_empty() && !out.contains(&primary) {
            out.insert(0, primary);
        }
        out
    }

    pub fn initial_symbol(&self) -> Option<Symbol> {
        let primary = Symbol::new(&self.default_symbol);
        if !primary.is_empty() {
            return Some(primary);
        }
        self.selectable_symbols().into_iter().next()
    }
}

impl Config {
    /// Load `config/default.toml` (built-in defaults when absent), then apply `API_BASE`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::from_path(path)?;
        config.override_base_url(std::env::var("API_BASE").ok().as_deref());
        config.validate()?;
        Ok(config)
    }

    /// Replace `server.base_url` with a non-blank override.
    pub fn override_base_url(&mut self, base: Option<&str>) {
        if let Some(base) = base.map(str::trim).filter(|b| !b.is_empty()) {
            self.server.base_url = base.to_string();
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&config_str).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.ui.buffer_len == 0 {
            bail!("ui.buffer_len must be > 0");
        }
        if self.server.keepalive_secs == 0 {
            bail!("server.keepalive_secs must be > 0");
        }
        if self.ui.refresh_rate_ms == 0 {
            bail!("ui.refresh_rate_ms must be > 0");
        }
        let symbol = self
            .ui
            .initial_symbol()
            .context("ui.symbols is empty and no ui.default_symbol is set")?;
        endpoint::stream_url(&self.server.base_url, &self.server.stream_path, &symbol)
            .with_context(|| format!("server.base_url '{}' is invalid", self.server.base_url))?;
        Ok(())
    }
}
