//! Configuration management for Refract
//!
//! Hosts load an [`AppConfig`] once at startup and hand the relevant
//! sections to the engine. Values are merged in priority order:
//! environment variables (`REFRACT__*`) over `refract.toml` over defaults.

pub mod logging;

use refract_foundation::error::{CoreError, CoreResult};
use refract_foundation::protocol::FunctionStyle;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Parser dialect configuration
    #[serde(default)]
    pub parser: ParserSettings,
    /// Refactoring behavior configuration
    #[serde(default)]
    pub refactor: RefactorSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Parser dialect configuration
///
/// `plugins` is the ordered list of grammar-extension names enabled when
/// parsing documents. The engine maps these onto SWC syntax options; names
/// the modern grammar already subsumes are accepted for compatibility with
/// older host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserSettings {
    pub plugins: Vec<String>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            plugins: vec![
                "jsx".to_string(),
                "typescript".to_string(),
                "classProperties".to_string(),
                "objectRestSpread".to_string(),
            ],
        }
    }
}

/// Refactoring behavior configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorSettings {
    /// Declaration shape used for extracted function components
    #[serde(default)]
    pub function_style: FunctionStyle,
}

impl AppConfig {
    /// Load configuration from `refract.toml` and the environment.
    ///
    /// Priority order (highest to lowest):
    /// 1. Environment variables (`REFRACT__*`, `__`-separated nesting)
    /// 2. `refract.toml` in the working directory
    /// 3. Default values
    pub fn load() -> CoreResult<Self> {
        use figment::providers::{Env, Format, Serialized, Toml};
        use figment::Figment;

        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("refract.toml"))
            .merge(Env::prefixed("REFRACT__").split("__"))
            .extract()
            .map_err(|e| CoreError::config(format!("Failed to load configuration: {}", e)))
    }
}
