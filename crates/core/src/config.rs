//! Configuration management for MedQuery.
//!
//! Configuration is assembled from several layers, later layers winning:
//! - Built-in defaults
//! - Config file (.medquery/config.yaml, or `MEDQUERY_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The workspace directory holds `.medquery/` with the config file and
//! optional prompt overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the LLM factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "ollama"];

/// Environment variable consulted for the Gemini key when none is configured.
pub const DEFAULT_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .medquery/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("gemini" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom provider endpoint
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// Deadline for a single LLM call
    pub llm_timeout_secs: u64,

    /// API key for the LLM provider
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// HTTP service settings
    pub server: ServerConfig,

    /// Knowledge source settings
    pub sources: SourcesConfig,
}

/// HTTP service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// End-to-end deadline for a single `/query` request
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 60,
            enable_cors: true,
        }
    }
}

/// Per-source retrieval settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub pubmed: PubMedSourceConfig,
    pub wikipedia: WikipediaSourceConfig,
    pub web: WebSourceConfig,
    pub openfda: OpenFdaSourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PubMedSourceConfig {
    pub enabled: bool,
    pub top_k: usize,
    pub timeout_secs: u64,
    pub base_url: String,
}

impl Default for PubMedSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 3,
            timeout_secs: 10,
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WikipediaSourceConfig {
    pub enabled: bool,
    pub top_k: usize,
    pub timeout_secs: u64,
    /// Maximum characters of article text per passage
    pub max_chars: usize,
    pub lang: String,
}

impl Default for WikipediaSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 1,
            timeout_secs: 10,
            max_chars: 1000,
            lang: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebSourceConfig {
    pub enabled: bool,
    pub top_k: usize,
    pub timeout_secs: u64,
    /// DuckDuckGo region code
    pub region: String,
    /// DuckDuckGo recency window (d, w, m, y)
    pub time: String,
}

impl Default for WebSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 3,
            timeout_secs: 10,
            region: "us-en".to_string(),
            time: "y".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenFdaSourceConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    /// Maximum characters of warning text per passage
    pub warning_chars: usize,
    pub base_url: String,
}

impl Default for OpenFdaSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 5,
            warning_chars: 400,
            base_url: "https://api.fda.gov/drug/label.json".to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    server: Option<ServerConfig>,
    sources: Option<SourcesConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            endpoint: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            llm_timeout_secs: 60,
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            server: ServerConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Environment variables:
    /// - `MEDQUERY_WORKSPACE`: Override workspace path
    /// - `MEDQUERY_CONFIG`: Path to config file
    /// - `MEDQUERY_PROVIDER`: LLM provider
    /// - `MEDQUERY_MODEL`: Model identifier
    /// - `MEDQUERY_API_KEY`: API key (falls back to the `apiKeyEnv` variable)
    /// - `MEDQUERY_HOST` / `MEDQUERY_PORT`: Listen address
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration with an explicit workspace and config file.
    ///
    /// Both arguments take precedence over `MEDQUERY_WORKSPACE` and
    /// `MEDQUERY_CONFIG` and decide which YAML file is merged.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace
            .or_else(|| std::env::var("MEDQUERY_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("MEDQUERY_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.medquery_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        if let Ok(provider) = std::env::var("MEDQUERY_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("MEDQUERY_MODEL") {
            config.model = model;
        }

        if let Ok(host) = std::env::var("MEDQUERY_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("MEDQUERY_PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid MEDQUERY_PORT '{}': {}", port, e)))?;
        }

        config.api_key = std::env::var("MEDQUERY_API_KEY")
            .ok()
            .or_else(|| std::env::var(&config.api_key_env).ok())
            .filter(|key| !key.trim().is_empty());

        if config.log_level.is_none() {
            config.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(api_key_env) = llm.api_key_env {
                result.api_key_env = api_key_env;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                result.llm_timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = config_file.server {
            result.server = server;
        }

        if let Some(sources) = config_file.sources {
            result.sources = sources;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the environment and the
    /// config file. The workspace and config file are chosen earlier by
    /// [`AppConfig::load_with`] since they decide which YAML is read.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .medquery directory.
    pub fn medquery_dir(&self) -> PathBuf {
        self.workspace.join(".medquery")
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "gemini" && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "API key not found. Set MEDQUERY_API_KEY or {}",
                self.api_key_env
            )));
        }

        if self.llm_timeout_secs == 0 {
            return Err(AppError::Config(
                "llm.timeoutSecs must be greater than zero".to_string(),
            ));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "server.requestTimeoutSecs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
