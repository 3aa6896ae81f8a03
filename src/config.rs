use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{Cli, Command};
use crate::llm::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};
use crate::pagespeed::{DEFAULT_PAGESPEED_ENDPOINT, DEFAULT_STRATEGY};
use crate::rank::DEFAULT_SERP_ENDPOINT;

pub const PAGESPEED_KEY_VAR: &str = "PAGESPEED_API_KEY";
pub const SERP_KEY_VAR: &str = "SERP_API_KEY";
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL_VAR: &str = "GEMINI_MODEL";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_BIND: &str = "127.0.0.1:7860";

/// Configuration file structure.
/// All fields are optional to allow partial configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// PageSpeed Insights API key
    pub pagespeed_api_key: Option<String>,

    /// SerpAPI key
    pub serp_api_key: Option<String>,

    /// Gemini API key; without one reports use the fixed template
    pub gemini_api_key: Option<String>,

    pub pagespeed_endpoint: Option<String>,
    pub serp_endpoint: Option<String>,
    pub gemini_endpoint: Option<String>,
    pub gemini_model: Option<String>,

    /// PageSpeed strategy: desktop or mobile
    pub strategy: Option<String>,

    /// HTTP request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Directory JSON reports are written to
    pub output_dir: Option<String>,

    /// Address the web interface listens on
    pub bind: Option<String>,
}

/// Configuration file format based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let format = ConfigFormat::from_path(path)
            .with_context(|| format!("Unsupported config file format: {}", path.display()))?;

        let config = match format {
            ConfigFormat::Json => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            ConfigFormat::Toml => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
        };

        Ok(config)
    }

    /// Get the default configuration file paths to check (in order of priority)
    /// Returns paths in order: current directory, user config directory
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
            for ext in format.extensions() {
                paths.push(PathBuf::from(format!("infera.{}", ext)));
            }
        }

        // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        if let Some(config_home) = config_home {
            let infera_config_dir = config_home.join("infera");
            for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
                for ext in format.extensions() {
                    paths.push(infera_config_dir.join(format!("config.{}", ext)));
                }
            }
        }

        paths
    }

    /// Try to load configuration from default paths
    /// Returns the first configuration file found, or None if no config exists
    pub fn from_default_paths() -> Result<Option<Self>> {
        for path in Self::default_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Ok(Some(Self::from_file(&path)?));
            }
        }
        Ok(None)
    }

    /// Loads `--config` if given, else the first default path found.
    pub fn load(cli: &Cli) -> Result<Self> {
        match &cli.config {
            Some(path) => Self::from_file(Path::new(path)),
            None => Ok(Self::from_default_paths()?.unwrap_or_default()),
        }
    }

    /// Environment variables take precedence over file values
    pub fn with_env_overrides(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(key) = var(PAGESPEED_KEY_VAR) {
            self.pagespeed_api_key = Some(key);
        }
        if let Some(key) = var(SERP_KEY_VAR) {
            self.serp_api_key = Some(key);
        }
        if let Some(key) = var(GEMINI_KEY_VAR) {
            self.gemini_api_key = Some(key);
        }
        if let Some(model) = var(GEMINI_MODEL_VAR) {
            self.gemini_model = Some(model);
        }
        self
    }

    /// Resolve into runtime settings.
    /// CLI arguments take precedence over config file values
    pub fn resolve(&self, cli: &Cli) -> Settings {
        let (output_dir, strategy, bind) = match &cli.command {
            Command::Analyze(args) => (args.output_dir.clone(), args.strategy.clone(), None),
            Command::Serve(args) => (args.output_dir.clone(), None, args.bind.clone()),
            Command::Check => (None, None, None),
        };

        Settings {
            pagespeed_api_key: credential(&self.pagespeed_api_key),
            serp_api_key: credential(&self.serp_api_key),
            gemini_api_key: credential(&self.gemini_api_key),
            pagespeed_endpoint: self
                .pagespeed_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_PAGESPEED_ENDPOINT.to_string()),
            serp_endpoint: self
                .serp_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_SERP_ENDPOINT.to_string()),
            gemini_endpoint: self
                .gemini_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string()),
            gemini_model: self
                .gemini_model
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            strategy: strategy
                .or_else(|| self.strategy.clone())
                .unwrap_or_else(|| DEFAULT_STRATEGY.to_string()),
            timeout_secs: cli
                .timeout
                .or(self.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            output_dir: output_dir
                .or_else(|| self.output_dir.clone())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            bind: bind
                .or_else(|| self.bind.clone())
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
        }
    }
}

/// Blank values and `your_..._here` placeholders count as unset.
fn credential(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .filter(|v| !(v.starts_with("your_") && v.ends_with("_here")))
        .map(str::to_string)
}

/// Fully resolved runtime settings, built once at startup and passed by
/// reference.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pagespeed_api_key: Option<String>,
    pub serp_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub pagespeed_endpoint: String,
    pub serp_endpoint: String,
    pub gemini_endpoint: String,
    pub gemini_model: String,
    pub strategy: String,
    pub timeout_secs: u64,
    pub output_dir: PathBuf,
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pagespeed_api_key: None,
            serp_api_key: None,
            gemini_api_key: None,
            pagespeed_endpoint: DEFAULT_PAGESPEED_ENDPOINT.to_string(),
            serp_endpoint: DEFAULT_SERP_ENDPOINT.to_string(),
            gemini_endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            strategy: DEFAULT_STRATEGY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_dir: PathBuf::from("."),
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Which credentials are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub pagespeed: bool,
    pub serp: bool,
    pub gemini: bool,
}

impl CredentialStatus {
    /// Environment variable names of the missing credentials
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.gemini, GEMINI_KEY_VAR),
            (self.pagespeed, PAGESPEED_KEY_VAR),
            (self.serp, SERP_KEY_VAR),
        ]
        .into_iter()
        .filter(|(present, _)| !present)
        .map(|(_, name)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.pagespeed && self.serp && self.gemini
    }
}

impl Settings {
    pub fn credential_status(&self) -> CredentialStatus {
        CredentialStatus {
            pagespeed: self.pagespeed_api_key.is_some(),
            serp: self.serp_api_key.is_some(),
            gemini: self.gemini_api_key.is_some(),
        }
    }

    /// Logs a warning per missing credential. Nothing is blocked: page-speed
    /// and rank calls fail at call time, and reports fall back to the template.
    pub fn warn_missing_credentials(&self) {
        let status = self.credential_status();
        if !status.pagespeed {
            tracing::warn!("{} is not set, PageSpeed requests will likely fail", PAGESPEED_KEY_VAR);
        }
        if !status.serp {
            tracing::warn!("{} is not set, rank lookups will likely fail", SERP_KEY_VAR);
        }
        if !status.gemini {
            tracing::warn!("{} is not set, reports will use the built-in template", GEMINI_KEY_VAR);
        }
    }
}
