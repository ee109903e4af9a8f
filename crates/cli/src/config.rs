use crate::error::CliError;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Checker configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Log output format (default: `text`).
    pub log_format: LogFormat,
    /// Include per-field violations in each verdict (default: `false`).
    pub detailed: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Text,
            detailed: false,
        }
    }
}

impl CheckConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `FIELDCHECK_LOG_FORMAT` | `text`  |
    /// | `FIELDCHECK_DETAILED`   | `false` |
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_format = match lookup("FIELDCHECK_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(CliError::Config(format!(
                    "FIELDCHECK_LOG_FORMAT must be `text` or `json`, got `{other}`"
                )))
            }
        };

        let detailed = match lookup("FIELDCHECK_DETAILED").as_deref().map(str::trim) {
            None | Some("") => false,
            Some(v) => parse_bool(v).ok_or_else(|| {
                CliError::Config(format!("FIELDCHECK_DETAILED must be a boolean, got `{v}`"))
            })?,
        };

        Ok(Self {
            log_format,
            detailed,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
