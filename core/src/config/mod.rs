// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use yaml_rust::{Yaml, YamlLoader};

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_CHAT_PATH: &str = "/ai-chat/message";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hello! I'm your **Vertex AI Assistant**. I have access to your live portfolio and watchlist. How can I help you today?";
pub const DEFAULT_CONNECTION_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error. Please check your connection and try again.";

/// Config errors
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum ConfigError {
    #[error("Failed to load file: {0}")]
    LoadFileError(String),

    #[error("Invalid value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },
}

/// Where the backend lives and how long to wait for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub chat_path: String,
    pub connect_timeout_secs: u64,
    /// Longest gap allowed between two body chunks of a streamed reply
    pub idle_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_chat_path(mut self, chat_path: String) -> Self {
        self.chat_path = chat_path;
        self
    }

    pub fn with_idle_timeout_secs(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Absolute URL for a backend path such as `/auth/login`
    pub fn url_for(&self, path: &str) -> ClientResult<String> {
        let base = Url::parse(&self.base_url).map_err(|e| {
            ClientError::ConfigError(format!("Invalid base URL {:?}: {}", self.base_url, e))
        })?;
        let base = base.as_str().trim_end_matches('/');

        if path.starts_with('/') {
            Ok(format!("{}{}", base, path))
        } else {
            Ok(format!("{}/{}", base, path))
        }
    }

    pub fn chat_url(&self) -> ClientResult<String> {
        self.url_for(&self.chat_path)
    }
}

/// Where the bearer token is kept between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub token_file: Option<PathBuf>,
}

/// User-facing texts of the chat surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub welcome_message: String,
    pub connection_error_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            connection_error_message: DEFAULT_CONNECTION_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub credentials: CredentialsConfig,
    pub chat: ChatConfig,
}

fn get_str_value_or_none_from_yaml(item: &Yaml, section: &str, key: &str) -> Result<Option<String>, ConfigError> {
    match &item[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::String(value) => Ok(Some(value.clone())),
        _ => Err(invalid(section, key, "expected a string")),
    }
}

fn get_u64_value_or_none_from_yaml(item: &Yaml, section: &str, key: &str) -> Result<Option<u64>, ConfigError> {
    match &item[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(value) if *value >= 0 => Ok(Some(*value as u64)),
        _ => Err(invalid(section, key, "expected a non-negative integer")),
    }
}

/// Timeouts of zero would fail every request before it starts
fn get_secs_value_or_none_from_yaml(item: &Yaml, section: &str, key: &str) -> Result<Option<u64>, ConfigError> {
    match get_u64_value_or_none_from_yaml(item, section, key)? {
        Some(0) => Err(invalid(section, key, "must be at least 1 second")),
        secs => Ok(secs),
    }
}

fn invalid(section: &str, key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{}.{}", section, key),
        message: message.to_string(),
    }
}

impl Config {
    pub fn from_yaml(path: &str) -> Result<Self, ConfigError> {
        match File::open(path) {
            Ok(_file) => {
                let source = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::LoadFileError(e.to_string()))?;
                Self::from_yaml_str(&source)
            }
            Err(_e) => Err(ConfigError::LoadFileError(path.to_string())),
        }
    }

    /// Every key is optional; missing ones keep their defaults.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(source)
            .map_err(|e| ConfigError::LoadFileError(e.to_string()))?;

        let mut config = Config::default();
        let Some(doc) = docs.first() else {
            return Ok(config);
        };

        let backend = &doc["backend"];
        if let Some(base_url) = get_str_value_or_none_from_yaml(backend, "backend", "base_url")? {
            Url::parse(&base_url).map_err(|e| invalid("backend", "base_url", &e.to_string()))?;
            config.backend.base_url = base_url;
        }
        if let Some(chat_path) = get_str_value_or_none_from_yaml(backend, "backend", "chat_path")? {
            config.backend.chat_path = chat_path;
        }
        if let Some(secs) = get_secs_value_or_none_from_yaml(backend, "backend", "connect_timeout_secs")? {
            config.backend.connect_timeout_secs = secs;
        }
        if let Some(secs) = get_secs_value_or_none_from_yaml(backend, "backend", "idle_timeout_secs")? {
            config.backend.idle_timeout_secs = secs;
        }

        let credentials = &doc["credentials"];
        config.credentials.token_file =
            get_str_value_or_none_from_yaml(credentials, "credentials", "token_file")?.map(PathBuf::from);

        let chat = &doc["chat"];
        if let Some(welcome) = get_str_value_or_none_from_yaml(chat, "chat", "welcome_message")? {
            config.chat.welcome_message = welcome;
        }
        if let Some(message) = get_str_value_or_none_from_yaml(chat, "chat", "connection_error_message")? {
            config.chat.connection_error_message = message;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_yaml_content() -> String {
        r#"
backend:
    base_url: https://vertex.example.com
    chat_path: /v2/ai-chat/message
    connect_timeout_secs: 5
    idle_timeout_secs: 30
credentials:
    token_file: /tmp/vertex/token
chat:
    welcome_message: Hi there
"#
        .trim()
        .to_string()
    }

    #[test]
    fn test_config_from_yaml_success() {
        let config = Config::from_yaml_str(create_test_yaml_content().as_str())
            .expect("Failed to load config");

        assert_eq!(config.backend.base_url, "https://vertex.example.com");
        assert_eq!(config.backend.chat_path, "/v2/ai-chat/message");
        assert_eq!(config.backend.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.backend.idle_timeout(), Duration::from_secs(30));
        assert_eq!(
            config.credentials.token_file,
            Some(PathBuf::from("/tmp/vertex/token"))
        );
        assert_eq!(config.chat.welcome_message, "Hi there");
        assert_eq!(
            config.chat.connection_error_message,
            DEFAULT_CONNECTION_ERROR_MESSAGE
        );
        assert_eq!(
            config.backend.chat_url().unwrap(),
            "https://vertex.example.com/v2/ai-chat/message"
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_yaml_str("").unwrap();

        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.backend.chat_path, DEFAULT_CHAT_PATH);
        assert!(config.credentials.token_file.is_none());
        assert_eq!(config.chat.welcome_message, DEFAULT_WELCOME_MESSAGE);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let result = Config::from_yaml_str("backend:\n    idle_timeout_secs: soon\n");
        match result {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "backend.idle_timeout_secs"),
            other => panic!("unexpected result: {:?}", other),
        }

        let result = Config::from_yaml_str("backend:\n    base_url: not a url\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        for key in ["connect_timeout_secs", "idle_timeout_secs"] {
            let result = Config::from_yaml_str(&format!("backend:\n    {}: 0\n", key));
            match result {
                Err(ConfigError::InvalidValue { key: reported, .. }) => {
                    assert_eq!(reported, format!("backend.{}", key))
                }
                other => panic!("unexpected result for {}: {:?}", key, other),
            }
        }

        let config = Config::from_yaml_str("backend:\n    idle_timeout_secs: 1\n").unwrap();
        assert_eq!(config.backend.idle_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_from_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_test_yaml_content().as_bytes()).unwrap();
        file.flush().unwrap();

        let config = Config::from_yaml(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.backend.idle_timeout_secs, 30);
    }

    #[test]
    fn test_config_from_yaml_file_not_found() {
        let result = Config::from_yaml("/non/existent/path/config.yaml");

        match result {
            Err(ConfigError::LoadFileError(path)) => {
                assert_eq!(path, "/non/existent/path/config.yaml");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_url_joining() {
        let backend = BackendConfig::default().with_base_url("http://localhost:3000/".to_string());
        assert_eq!(backend.url_for("/auth/login").unwrap(), "http://localhost:3000/auth/login");
        assert_eq!(backend.url_for("auth/status").unwrap(), "http://localhost:3000/auth/status");

        let nested = BackendConfig::default().with_base_url("https://api.example.com/vertex".to_string());
        assert_eq!(
            nested.chat_url().unwrap(),
            "https://api.example.com/vertex/ai-chat/message"
        );
    }
}
