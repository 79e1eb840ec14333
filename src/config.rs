use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the settings file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// A required environment variable is unset or empty.
    MissingVar(&'static str),
    /// An environment variable holds a value that cannot be used.
    InvalidVar { name: &'static str, value: String },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read settings file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse settings file '{}': {}", path.display(), source)
            }
            Self::MissingVar(name) => write!(f, "environment variable {name} is required"),
            Self::InvalidVar { name, value } => {
                write!(f, "environment variable {name} has invalid value '{value}'")
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::MissingVar(_) | Self::InvalidVar { .. } | Self::Validation(_) => None,
        }
    }
}

/// OpenAI chat completion settings, shared by research and writing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Token budget for research answers.
    pub max_tokens: u32,
    /// Token budget for academic writing.
    pub writing_max_tokens: u32,
    pub timeout_secs: Option<u64>,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            writing_max_tokens: 3000,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-pro".to_string(),
            temperature: None,
            max_tokens: None,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HackerGptSettings {
    pub url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: Option<u64>,
}

impl Default for HackerGptSettings {
    fn default() -> Self {
        Self {
            url: "https://se7eneyes.org/api/hackergpt.php".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_secs: Some(10),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct SettingsFile {
    openai: OpenAiSettings,
    gemini: GeminiSettings,
    hackergpt: HackerGptSettings,
    /// Maximum characters per outbound Telegram message.
    chunk_chars: usize,
    /// Characters of extracted document text included in a summary.
    summary_chars: usize,
    /// Largest decompressed DOCX body accepted for summarising.
    max_document_bytes: u64,
    /// Concurrent update handlers in webhook mode.
    workers: usize,
    session_capacity: usize,
    /// 0 disables expiry.
    session_ttl_secs: u64,
    log_dir: Option<String>,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            openai: OpenAiSettings::default(),
            gemini: GeminiSettings::default(),
            hackergpt: HackerGptSettings::default(),
            chunk_chars: 4000,
            summary_chars: 1000,
            max_document_bytes: 10 * 1024 * 1024,
            workers: 4,
            session_capacity: 10_000,
            session_ttl_secs: 24 * 60 * 60,
            log_dir: None,
        }
    }
}

/// How updates reach the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Long polling against the Bot API.
    Polling,
    /// Telegram pushes updates to `url`; the HTTP server listens on `port`.
    Webhook { url: String, port: u16 },
}

pub struct Config {
    pub telegram_bot_token: String,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Read for completeness; no connection is opened.
    pub mongo_uri: Option<String>,
    pub mode: RunMode,
    pub openai: OpenAiSettings,
    pub gemini: GeminiSettings,
    pub hackergpt: HackerGptSettings,
    pub chunk_chars: usize,
    pub summary_chars: usize,
    pub max_document_bytes: u64,
    pub workers: usize,
    pub session_capacity: usize,
    pub session_ttl: Option<Duration>,
    pub log_dir: PathBuf,
}

const DEFAULT_PORT: u16 = 10000;

impl Config {
    /// Load settings from an optional JSON file and secrets from the process environment.
    pub fn load(settings_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(settings_path, |name| std::env::var(name).ok())
    }

    pub fn from_sources<F>(settings_path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match settings_path {
            Some(path) => {
                let path = path.to_path_buf();
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::ReadFile { path: path.clone(), source: e })?;
                serde_json::from_str::<SettingsFile>(&content)
                    .map_err(|e| ConfigError::ParseJson { path, source: e })?
            }
            None => SettingsFile::default(),
        };

        // Empty values count as unset
        let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let telegram_bot_token =
            var("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::MissingVar("TELEGRAM_BOT_TOKEN"))?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "TELEGRAM_BOT_TOKEN appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
            ));
        }

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVar { name: "PORT", value: raw.clone() })?,
            None => DEFAULT_PORT,
        };

        let mode = if var("RENDER").is_some() {
            let url = var("WEBHOOK_URL").ok_or_else(|| {
                ConfigError::Validation("WEBHOOK_URL is required when RENDER is set".into())
            })?;
            RunMode::Webhook { url, port }
        } else {
            RunMode::Polling
        };

        if file.chunk_chars == 0 {
            return Err(ConfigError::Validation("chunk_chars must be greater than zero".into()));
        }
        if file.workers == 0 {
            return Err(ConfigError::Validation("workers must be greater than zero".into()));
        }

        Ok(Self {
            telegram_bot_token,
            openai_api_key: var("OPENAI_API_KEY"),
            gemini_api_key: var("GEMINI_API_KEY"),
            mongo_uri: var("MONGO_URI"),
            mode,
            openai: file.openai,
            gemini: file.gemini,
            hackergpt: file.hackergpt,
            chunk_chars: file.chunk_chars,
            summary_chars: file.summary_chars,
            max_document_bytes: file.max_document_bytes,
            workers: file.workers,
            session_capacity: file.session_capacity.max(1),
            session_ttl: (file.session_ttl_secs > 0).then(|| Duration::from_secs(file.session_ttl_secs)),
            log_dir: file.log_dir.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("logs")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TOKEN: &str = "123456789:ABCdefGHIjklMNOpqrsTUVwxyz";

    fn write_settings(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_defaults_from_env_only() {
        let config = Config::from_sources(None, env(&[("TELEGRAM_BOT_TOKEN", TOKEN)]))
            .expect("should load with only a token");
        assert_eq!(config.mode, RunMode::Polling);
        assert_eq!(config.chunk_chars, 4000);
        assert_eq!(config.summary_chars, 1000);
        assert_eq!(config.max_document_bytes, 10 * 1024 * 1024);
        assert_eq!(config.workers, 4);
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.openai.max_tokens, 1000);
        assert_eq!(config.openai.writing_max_tokens, 3000);
        assert_eq!(config.gemini.model, "gemini-pro");
        assert_eq!(config.hackergpt.max_tokens, 1024);
        assert_eq!(config.hackergpt.timeout_secs, Some(10));
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.session_ttl, Some(Duration::from_secs(86400)));
    }

    #[test]
    fn test_api_keys_and_mongo_are_read() {
        let config = Config::from_sources(
            None,
            env(&[
                ("TELEGRAM_BOT_TOKEN", TOKEN),
                ("OPENAI_API_KEY", "sk-test"),
                ("GEMINI_API_KEY", "gm-test"),
                ("MONGO_URI", "mongodb://localhost"),
            ]),
        )
        .unwrap();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.gemini_api_key.as_deref(), Some("gm-test"));
        assert_eq!(config.mongo_uri.as_deref(), Some("mongodb://localhost"));
    }

    #[test]
    fn test_empty_key_counts_as_unset() {
        let config = Config::from_sources(
            None,
            env(&[("TELEGRAM_BOT_TOKEN", TOKEN), ("OPENAI_API_KEY", "  ")]),
        )
        .unwrap();
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_missing_token() {
        let err = assert_err(Config::from_sources(None, env(&[])));
        assert!(matches!(err, ConfigError::MissingVar("TELEGRAM_BOT_TOKEN")));
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let err = assert_err(Config::from_sources(
            None,
            env(&[("TELEGRAM_BOT_TOKEN", "invalid_token_no_colon")]),
        ));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_invalid_token_format_empty_secret() {
        let err = assert_err(Config::from_sources(None, env(&[("TELEGRAM_BOT_TOKEN", "123456789:")])));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_webhook_mode() {
        let config = Config::from_sources(
            None,
            env(&[
                ("TELEGRAM_BOT_TOKEN", TOKEN),
                ("RENDER", "true"),
                ("WEBHOOK_URL", "https://bot.example.com/webhook"),
                ("PORT", "8080"),
            ]),
        )
        .unwrap();
        assert_eq!(
            config.mode,
            RunMode::Webhook { url: "https://bot.example.com/webhook".into(), port: 8080 }
        );
    }

    #[test]
    fn test_webhook_mode_default_port() {
        let config = Config::from_sources(
            None,
            env(&[
                ("TELEGRAM_BOT_TOKEN", TOKEN),
                ("RENDER", "1"),
                ("WEBHOOK_URL", "https://bot.example.com/webhook"),
            ]),
        )
        .unwrap();
        assert!(matches!(config.mode, RunMode::Webhook { port: 10000, .. }));
    }

    #[test]
    fn test_webhook_mode_requires_url() {
        let err = assert_err(Config::from_sources(
            None,
            env(&[("TELEGRAM_BOT_TOKEN", TOKEN), ("RENDER", "1")]),
        ));
        assert!(err.to_string().contains("WEBHOOK_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = assert_err(Config::from_sources(
            None,
            env(&[("TELEGRAM_BOT_TOKEN", TOKEN), ("PORT", "eighty")]),
        ));
        assert!(matches!(err, ConfigError::InvalidVar { name: "PORT", .. }));
    }

    #[test]
    fn test_settings_file_overrides() {
        let file = write_settings(r#"{
            "openai": { "model": "gpt-4o-mini", "max_tokens": 500 },
            "hackergpt": { "timeout_secs": 30 },
            "chunk_chars": 3000,
            "workers": 8,
            "max_document_bytes": 65536,
            "session_ttl_secs": 0,
            "log_dir": "/tmp/mastermind-logs"
        }"#);
        let config = Config::from_sources(Some(file.path()), env(&[("TELEGRAM_BOT_TOKEN", TOKEN)])).unwrap();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.max_tokens, 500);
        // Unspecified fields keep their defaults
        assert_eq!(config.openai.writing_max_tokens, 3000);
        assert_eq!(config.hackergpt.timeout_secs, Some(30));
        assert_eq!(config.hackergpt.max_tokens, 1024);
        assert_eq!(config.chunk_chars, 3000);
        assert_eq!(config.workers, 8);
        assert_eq!(config.max_document_bytes, 65536);
        assert_eq!(config.session_ttl, None);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/mastermind-logs"));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let file = write_settings(r#"{ "chunk_chars": 0 }"#);
        let err = assert_err(Config::from_sources(Some(file.path()), env(&[("TELEGRAM_BOT_TOKEN", TOKEN)])));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::from_sources(
            Some(Path::new("/nonexistent/path/settings.json")),
            env(&[("TELEGRAM_BOT_TOKEN", TOKEN)]),
        ));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_settings("{ invalid json }");
        let err = assert_err(Config::from_sources(Some(file.path()), env(&[("TELEGRAM_BOT_TOKEN", TOKEN)])));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
