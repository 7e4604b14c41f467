use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Anchor sampling and time-mapping parameters
    #[serde(default)]
    pub sync: SyncConfig,

    /// Entry matcher configuration
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Entry matcher provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatcherProvider {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl MatcherProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }
}

impl std::fmt::Display for MatcherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for MatcherProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: MatcherProvider) -> Self {
        match provider_type {
            MatcherProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            MatcherProvider::LMStudio => Self {
                provider_type: "lmstudio".to_string(),
                model: default_lmstudio_model(),
                api_key: String::new(),
                endpoint: default_lmstudio_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Entry matcher configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatcherConfig {
    /// Active provider
    #[serde(default)]
    pub provider: MatcherProvider,

    /// Available provider configurations
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,
}

impl MatcherConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            MatcherProvider::OpenAI => default_openai_model(),
            MatcherProvider::LMStudio => default_lmstudio_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        // LM Studio runs locally and doesn't use API keys
        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            MatcherProvider::OpenAI => default_openai_endpoint(),
            MatcherProvider::LMStudio => default_lmstudio_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        default_timeout_secs()
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: MatcherProvider::default(),
            available_providers: Vec::new(),
        };

        // Add default providers
        config.available_providers.push(ProviderConfig::new(MatcherProvider::OpenAI));
        config.available_providers.push(ProviderConfig::new(MatcherProvider::LMStudio));

        config
    }
}

/// Synchronization engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncConfig {
    /// Maximum number of anchor groups sampled from the target track
    #[serde(default = "default_anchor_groups")]
    pub anchor_groups: usize,

    /// Consecutive target entries per sampled group
    #[serde(default = "default_entries_per_group")]
    pub entries_per_group: usize,

    /// Reference entries searched per group (wider than the group to
    /// absorb local offset uncertainty)
    #[serde(default = "default_search_window")]
    pub search_window: usize,

    /// MAD multiplier above which an anchor offset counts as an outlier
    #[serde(default = "default_max_deviation_factor")]
    pub max_deviation_factor: f64,

    /// Maximum characters of subtitle text sent per entry
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,

    /// Maximum concurrent matcher calls
    #[serde(default = "default_concurrent_groups")]
    pub concurrent_groups: usize,

    /// Maximum number of retry attempts per matcher call
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff time in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            anchor_groups: default_anchor_groups(),
            entries_per_group: default_entries_per_group(),
            search_window: default_search_window(),
            max_deviation_factor: default_max_deviation_factor(),
            excerpt_chars: default_excerpt_chars(),
            concurrent_groups: default_concurrent_groups(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_anchor_groups() -> usize {
    6
}

fn default_entries_per_group() -> usize {
    4
}

fn default_search_window() -> usize {
    40
}

fn default_max_deviation_factor() -> f64 {
    3.0
}

fn default_excerpt_chars() -> usize {
    80
}

fn default_concurrent_groups() -> usize {
    3
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_lmstudio_endpoint() -> String {
    // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate sync parameters
        if self.sync.anchor_groups == 0 {
            return Err(anyhow!("sync.anchor_groups must be at least 1"));
        }
        if self.sync.entries_per_group == 0 {
            return Err(anyhow!("sync.entries_per_group must be at least 1"));
        }
        if self.sync.search_window == 0 {
            return Err(anyhow!("sync.search_window must be at least 1"));
        }
        if self.sync.concurrent_groups == 0 {
            return Err(anyhow!("sync.concurrent_groups must be at least 1"));
        }
        if self.sync.max_deviation_factor <= 0.0 {
            return Err(anyhow!("sync.max_deviation_factor must be positive"));
        }

        // Validate API key for remote providers
        if self.matcher.provider == MatcherProvider::OpenAI {
            let api_key = self.matcher.get_api_key();
            if api_key.is_empty() {
                return Err(anyhow!("Matcher API key is required for OpenAI provider"));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            sync: SyncConfig::default(),
            matcher: MatcherConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
