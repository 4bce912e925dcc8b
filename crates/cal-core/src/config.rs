//! Configuration management
//!
//! Settings are resolved in the following order:
//! 1. Environment variables
//! 2. cal-gateway.toml configuration file
//! 3. Default values
//!
//! Inside the configuration file, `${VAR_NAME}` expands to the value of the
//! corresponding environment variable.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// LLM Provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Claude API
    #[default]
    Claude,
    /// OpenAI-compatible API (Gemini via compat endpoint, GLM, etc.)
    OpenAi,
}

impl LlmProvider {
    fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "openai" | "gemini" | "glm" => LlmProvider::OpenAi,
            _ => LlmProvider::Claude,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (usually supplied via LLM_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: LlmProvider::Claude,
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Port for the HTTP API server
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty means permissive.
    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
            allowed_origins: None,
        }
    }
}

/// Google Calendar/Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Calendar container id (the `calendarId` of the managed calendar)
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// Task list id (the single managed list)
    #[serde(default = "default_tasklist_id")]
    pub tasklist_id: String,

    /// Path to the stored OAuth token file
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            tasklist_id: default_tasklist_id(),
            token_path: default_token_path(),
        }
    }
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_tasklist_id() -> String {
    "@default".to_string()
}

fn default_token_path() -> String {
    "token.json".to_string()
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Path to SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "data/cal-gateway.db".to_string()
}

/// Agent loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum tool-call iterations per chat request
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_max_iterations() -> usize {
    10
}

fn default_max_tokens() -> u64 {
    4096
}

fn default_api_port() -> u16 {
    5000
}

/// Main configuration for cal-gateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// HTTP API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Google Calendar/Tasks configuration
    #[serde(default)]
    pub google: GoogleConfig,

    /// Session persistence configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` occurrences using environment variables.
    ///
    /// Missing variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, then apply env overrides.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let toml_content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let mut config: Config = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from the default path.
    ///
    /// Tries `./cal-gateway.toml`, falling back to environment variables only.
    pub fn load() -> crate::Result<Self> {
        if Path::new("cal-gateway.toml").exists() {
            return Self::from_toml_file("cal-gateway.toml");
        }

        Self::from_env()
    }

    /// Override settings from environment variables (env wins over file).
    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("LLM_API_KEY") {
            if !api_key.is_empty() {
                self.llm.api_key = api_key;
            }
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            if !model.is_empty() {
                self.llm.model = model;
            }
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            if !provider.is_empty() {
                self.llm.provider = LlmProvider::from_str_loose(&provider);
            }
        }
        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            if !base_url.is_empty() {
                self.llm.base_url = Some(base_url);
            }
        }

        if let Ok(port) = std::env::var("API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Ok(origins) = std::env::var("API_ALLOWED_ORIGINS") {
            self.api.allowed_origins =
                Some(origins.split(',').map(|s| s.trim().to_string()).collect());
        }

        if let Ok(id) = std::env::var("GOOGLE_CALENDAR_ID") {
            if !id.is_empty() {
                self.google.calendar_id = id;
            }
        }
        if let Ok(id) = std::env::var("GOOGLE_TASKLIST_ID") {
            if !id.is_empty() {
                self.google.tasklist_id = id;
            }
        }
        if let Ok(path) = std::env::var("GOOGLE_TOKEN_PATH") {
            if !path.is_empty() {
                self.google.token_path = path;
            }
        }

        if let Ok(path) = std::env::var("DB_PATH") {
            self.memory.db_path = path;
        }

        if let Ok(n) = std::env::var("AGENT_MAX_ITERATIONS") {
            if let Ok(n) = n.parse() {
                self.agent.max_iterations = n;
            }
        }
        if let Ok(n) = std::env::var("AGENT_MAX_TOKENS") {
            if let Ok(n) = n.parse() {
                self.agent.max_tokens = n;
            }
        }
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides();

        if config.llm.api_key.is_empty() {
            return Err(Error::Config("LLM_API_KEY not set".to_string()));
        }

        Ok(config)
    }

    /// Get the effective LLM configuration
    pub fn llm_config(&self) -> &LlmConfig {
        &self.llm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_provider_default() {
        assert_eq!(LlmProvider::default(), LlmProvider::Claude);
    }

    #[test]
    fn test_llm_provider_from_string() {
        assert_eq!(LlmProvider::from_str_loose("openai"), LlmProvider::OpenAi);
        assert_eq!(LlmProvider::from_str_loose("gemini"), LlmProvider::OpenAi);
        assert_eq!(LlmProvider::from_str_loose("claude"), LlmProvider::Claude);
        assert_eq!(LlmProvider::from_str_loose("anything"), LlmProvider::Claude);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.agent.max_tokens, 4096);
        assert_eq!(config.google.calendar_id, "primary");
        assert_eq!(config.google.tasklist_id, "@default");
        assert_eq!(config.memory.db_path, "data/cal-gateway.db");
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("CAL_GATEWAY_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${CAL_GATEWAY_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("CAL_GATEWAY_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[llm]
provider = "openai"
model = "gemini-2.5-flash"
api_key = "test_key"
base_url = "https://api.example.com"

[api]
port = 8080

[google]
calendar_id = "team-cal@group.calendar.google.com"
tasklist_id = "MjFUS0VlSGtRRldRalhueg"
token_path = "/etc/cal-gateway/token.json"

[memory]
db_path = "/path/to/db"

[agent]
max_iterations = 6
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.google.calendar_id, "team-cal@group.calendar.google.com");
        assert_eq!(config.google.tasklist_id, "MjFUS0VlSGtRRldRalhueg");
        assert_eq!(config.memory.db_path, "/path/to/db");
        assert_eq!(config.agent.max_iterations, 6);
        // Unspecified sections fall back to defaults
        assert_eq!(config.agent.max_tokens, 4096);
    }
}
