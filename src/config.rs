use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};

/// Hosted seq2seq model that turns "<schema> <question>" into SQL.
pub const DEFAULT_INFERENCE_URL: &str =
    "https://api-inference.huggingface.co/models/barunparua/flant5-nltosql-final-model";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    /// Role switched to on every new connection, so generated SQL runs with
    /// that role's privileges rather than the login user's.
    pub role: Option<String>,
    pub read_only: bool,
    pub connect_timeout_secs: u64,
    pub query_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: String, // "huggingface" or "stub"
    pub api_url: String,
    pub api_key: Option<String>,
    pub max_new_tokens: u32,
    pub wait_for_model: bool,
    pub timeout_secs: u64,
    pub stub_sql: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    pub history_capacity: usize,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub web: WebConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Number of chat turns kept in memory
    #[arg(long)]
    pub history_capacity: Option<usize>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self> {
        Self::load(args, None)
    }

    /// `env` replaces the process environment when given.
    fn load(args: &CliArgs, env: Option<config::Map<String, String>>) -> Result<Self> {
        let mut config_builder = Config::builder();

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            let default_locations = [
                "config.toml",
                "config/config.toml",
                "/etc/nl2sql-chat/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // NL2SQL__DATABASE__PASSWORD -> database.password. Values stay strings
        // until deserialized, so secrets like "007" survive intact.
        config_builder = config_builder.add_source(
            Environment::with_prefix("NL2SQL")
                .prefix_separator("__")
                .separator("__")
                .source(env),
        );

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }
        if let Some(capacity) = args.history_capacity {
            config.chat.history_capacity = capacity;
        }
        if let Some(format) = args.log_format {
            config.logging.format = format;
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("database.user", &self.database.user),
            ("database.password", &self.database.password),
            ("database.host", &self.database.host),
        ];
        for (key, value) in required {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                return Err(AppError::configuration(format!("{} is not set", key)));
            }
        }

        match self.llm.backend.as_str() {
            "huggingface" => {
                if self.llm.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
                    return Err(AppError::configuration(
                        "llm.api_key is required for the huggingface backend",
                    ));
                }
            }
            "stub" => {}
            other => {
                return Err(AppError::configuration(format!(
                    "Unsupported LLM backend: {}",
                    other
                )));
            }
        }

        if self.chat.history_capacity == 0 {
            return Err(AppError::configuration(
                "chat.history_capacity must be at least 1",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl WebConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() { "<redacted>" } else { "<unset>" }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("role", &self.role)
            .field("read_only", &self.read_only)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("query_timeout_secs", &self.query_timeout_secs)
            .finish()
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("backend", &self.backend)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("max_new_tokens", &self.max_new_tokens)
            .field("wait_for_model", &self.wait_for_model)
            .field("timeout_secs", &self.timeout_secs)
            .field("stub_sql", &self.stub_sql)
            .finish()
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            request_timeout_secs: 120,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: None,
            password: None,
            host: None,
            port: 5432,
            role: None,
            read_only: true,
            connect_timeout_secs: 10,
            query_timeout_secs: 30,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: "huggingface".to_string(),
            api_url: DEFAULT_INFERENCE_URL.to_string(),
            api_key: None,
            max_new_tokens: 200,
            wait_for_model: true,
            timeout_secs: 60,
            stub_sql: None,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_capacity: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.user = Some("fest".to_string());
        config.database.password = Some("secret".to_string());
        config.database.host = Some("10.0.0.5".to_string());
        config.llm.api_key = Some("hf_token".to_string());
        config
    }

    fn args_for(path: &Path) -> CliArgs {
        CliArgs {
            config: Some(path.to_path_buf()),
            host: None,
            port: None,
            history_capacity: None,
            log_format: None,
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.llm.max_new_tokens, 200);
        assert!(config.llm.wait_for_model);
        assert_eq!(config.llm.api_url, DEFAULT_INFERENCE_URL);
        assert_eq!(config.chat.history_capacity, 5);
        assert_eq!(config.database.port, 5432);
        assert!(config.database.read_only);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_credentials() {
        let mut config = valid_config();
        config.database.password = None;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("database.password"));

        let mut config = valid_config();
        config.database.host = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_api_key_for_huggingface_only() {
        let mut config = valid_config();
        config.llm.api_key = None;
        assert!(config.validate().is_err());

        config.llm.backend = "stub".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_backend_and_zero_capacity() {
        let mut config = valid_config();
        config.llm.backend = "openai".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.chat.history_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", valid_config());
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("hf_token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_load_from_file_with_cli_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[database]
user = "fest"
password = "secret"
host = "db.internal"
role = "nl2sql_reader"

[llm]
backend = "stub"
stub_sql = "SELECT 1"

[chat]
history_capacity = 3
"#
        )
        .unwrap();

        let mut args = args_for(file.path());
        args.port = Some(8080);
        args.history_capacity = Some(1);

        let config = AppConfig::load(&args, Some(config::Map::new())).unwrap();
        assert_eq!(config.database.host.as_deref(), Some("db.internal"));
        assert_eq!(config.database.role.as_deref(), Some("nl2sql_reader"));
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.llm.backend, "stub");
        assert_eq!(config.llm.stub_sql.as_deref(), Some("SELECT 1"));
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.chat.history_capacity, 1);
    }

    #[test]
    fn test_load_fails_without_credentials() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[llm]\nbackend = \"stub\"").unwrap();

        let err = AppConfig::load(&args_for(file.path()), Some(config::Map::new())).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_env_values_are_kept_verbatim() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[llm]\nbackend = \"stub\"").unwrap();

        let env: config::Map<String, String> = [
            ("NL2SQL__DATABASE__USER", "fest"),
            ("NL2SQL__DATABASE__PASSWORD", "007"),
            ("NL2SQL__DATABASE__HOST", "10.0.0.5"),
            ("NL2SQL__DATABASE__ROLE", "true"),
            ("NL2SQL__DATABASE__READ_ONLY", "false"),
            ("NL2SQL__WEB__PORT", "8081"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = AppConfig::load(&args_for(file.path()), Some(env)).unwrap();
        assert_eq!(config.database.password.as_deref(), Some("007"));
        assert_eq!(config.database.role.as_deref(), Some("true"));
        assert!(!config.database.read_only);
        assert_eq!(config.web.port, 8081);
    }
}
