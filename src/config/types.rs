use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set (default: "info").
    #[serde(default = "default_filter")]
    pub filter: String,
}

/// Settings for the headless demo run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Version shown by the version alert (default: "1.0.0").
    #[serde(default = "default_app_version")]
    pub app_version: String,
    /// Pause between scripted actions in milliseconds (default: 200).
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    /// Actions to play, e.g. "greet", "submit:Ada", "back".
    #[serde(default = "default_script")]
    pub script: Vec<String>,
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_app_version() -> String {
    "1.0.0".to_string()
}

fn default_step_delay_ms() -> u64 {
    200
}

fn default_script() -> Vec<String> {
    [
        "greet", "version", "ok", "back", "login", "submit:Ada", "version", "ok", "back",
        "settings", "back", "logout", "greet", "back", "close",
    ]
    .iter()
    .map(|action| action.to_string())
    .collect()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            app_version: default_app_version(),
            step_delay_ms: default_step_delay_ms(),
            script: default_script(),
        }
    }
}
