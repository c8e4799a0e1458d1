use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "config/analyzer.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Every runtime option of the service. Built once at startup, then shared.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub openai_max_tokens: u32,
    pub transcription_model: String,
    pub transcription_language: String,
    pub google_speech_api_key: Option<String>,
    pub google_speech_language: String,
    pub api_host: String,
    pub api_port: u16,
    pub upload_dir: PathBuf,
    pub frontend_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o".to_string(),
            openai_temperature: 0.3,
            openai_max_tokens: 2000,
            transcription_model: "whisper-1".to_string(),
            transcription_language: "en".to_string(),
            google_speech_api_key: None,
            google_speech_language: "en-US".to_string(),
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            upload_dir: PathBuf::from("uploads"),
            frontend_dir: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value: raw })
}

impl AppConfig {
    /// Defaults, then the optional YAML file, then environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let config = match std::env::var("BLUEPRINT_CONFIG") {
            Ok(path) => Self::from_yaml_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_yaml_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            Err(_) => Self::default(),
        };

        let config = config.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Applies environment-style overrides from `lookup`. Numeric values that
    /// do not parse are rejected rather than silently defaulted.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = Some(value);
        }
        if let Some(value) = lookup("OPENAI_BASE_URL") {
            self.openai_base_url = value;
        }
        if let Some(value) = lookup("OPENAI_MODEL") {
            self.openai_model = value;
        }
        if let Some(value) = lookup("OPENAI_TEMPERATURE") {
            self.openai_temperature = parse_env("OPENAI_TEMPERATURE", value)?;
        }
        if let Some(value) = lookup("OPENAI_MAX_TOKENS") {
            self.openai_max_tokens = parse_env("OPENAI_MAX_TOKENS", value)?;
        }
        if let Some(value) = lookup("TRANSCRIPTION_MODEL") {
            self.transcription_model = value;
        }
        if let Some(value) = lookup("TRANSCRIPTION_LANGUAGE") {
            self.transcription_language = value;
        }
        if let Some(value) = lookup("GOOGLE_SPEECH_API_KEY") {
            self.google_speech_api_key = Some(value);
        }
        if let Some(value) = lookup("GOOGLE_SPEECH_LANGUAGE") {
            self.google_speech_language = value;
        }
        if let Some(value) = lookup("API_HOST") {
            self.api_host = value;
        }
        if let Some(value) = lookup("API_PORT") {
            self.api_port = parse_env("API_PORT", value)?;
        }
        if let Some(value) = lookup("UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("FRONTEND_DIR") {
            self.frontend_dir = Some(PathBuf::from(value));
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let blank = |value: &str| value.trim().is_empty();

        if self.openai_api_key.as_deref().is_some_and(blank) {
            return Err(ConfigError::Validation("OPENAI_API_KEY is set but empty".into()));
        }
        if self.google_speech_api_key.as_deref().is_some_and(blank) {
            return Err(ConfigError::Validation(
                "GOOGLE_SPEECH_API_KEY is set but empty".into(),
            ));
        }
        Url::parse(&self.openai_base_url).map_err(|e| {
            ConfigError::Validation(format!("OPENAI_BASE_URL is not a valid URL: {}", e))
        })?;
        if !(0.0..=2.0).contains(&self.openai_temperature) {
            return Err(ConfigError::Validation(format!(
                "OPENAI_TEMPERATURE must be between 0.0 and 2.0, got {}",
                self.openai_temperature
            )));
        }
        if self.openai_max_tokens == 0 {
            return Err(ConfigError::Validation("OPENAI_MAX_TOKENS must be positive".into()));
        }
        if self.api_port == 0 {
            return Err(ConfigError::Validation("API_PORT must be positive".into()));
        }
        for (key, value) in [
            ("OPENAI_MODEL", self.openai_model.as_str()),
            ("TRANSCRIPTION_MODEL", self.transcription_model.as_str()),
            ("TRANSCRIPTION_LANGUAGE", self.transcription_language.as_str()),
            ("GOOGLE_SPEECH_LANGUAGE", self.google_speech_language.as_str()),
            ("API_HOST", self.api_host.as_str()),
        ] {
            if blank(value) {
                return Err(ConfigError::Validation(format!("{} must not be empty", key)));
            }
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("UPLOAD_DIR must not be empty".into()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}
