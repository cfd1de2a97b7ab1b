//! Runtime configuration for the homework status bot.
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use teloxide::types::{ChatId, Recipient};
use thiserror::Error;
use tracing::{info, instrument};

pub const PRACTICUM_TOKEN_VAR: &str = "TOKEN_1";
pub const TELEGRAM_TOKEN_VAR: &str = "TOKEN_2";
pub const TELEGRAM_CHAT_ID_VAR: &str = "CHAT_ID";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_RETRY_PERIOD_SECS: u64 = 600;
pub const DEFAULT_LOG_FILE: &str = "main.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Отсутствует токен. Бот остановлен!")]
    MissingTokens(Vec<&'static str>),
    #[error("invalid endpoint URL: {0}")]
    Endpoint(String),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// The three secrets read from the environment. Absent variables are kept
/// as empty strings so the startup check sees them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            practicum_token: get(PRACTICUM_TOKEN_VAR),
            telegram_token: get(TELEGRAM_TOKEN_VAR),
            telegram_chat_id: get(TELEGRAM_CHAT_ID_VAR),
        }
    }

    /// Names of the variables that are absent or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (PRACTICUM_TOKEN_VAR, &self.practicum_token),
            (TELEGRAM_TOKEN_VAR, &self.telegram_token),
            (TELEGRAM_CHAT_ID_VAR, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    #[instrument(skip_all)]
    pub fn check_tokens(&self) -> bool {
        info!("checking that all tokens are present");
        self.missing().is_empty()
    }

    /// Numeric ids address a chat directly; anything else is treated as a
    /// public channel username such as `@my_channel`.
    pub fn chat_recipient(&self) -> Recipient {
        match self.telegram_chat_id.trim().parse::<i64>() {
            Ok(id) => Recipient::Id(ChatId(id)),
            Err(_) => Recipient::ChannelUsername(self.telegram_chat_id.trim().to_string()),
        }
    }
}

/// Settings that are not secrets; the binary fills them from CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub retry_period: Duration,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry_period: Duration::from_secs(DEFAULT_RETRY_PERIOD_SECS),
            log_file: default_log_file(),
        }
    }
}

/// `main.log` next to the running executable, falling back to the working
/// directory when the executable path is unknown.
pub fn default_log_file() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_LOG_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoint: Url,
    pub retry_period: Duration,
}

impl Config {
    /// Build and validate the runtime configuration. This is the one place
    /// the startup token check runs.
    pub fn build(credentials: Credentials, settings: &Settings) -> Result<Self, ConfigError> {
        if !credentials.check_tokens() {
            return Err(ConfigError::MissingTokens(credentials.missing()));
        }
        if settings.retry_period.is_zero() {
            return Err(ConfigError::Invalid("retry period must be > 0"));
        }
        let endpoint =
            Url::parse(&settings.endpoint).map_err(|e| ConfigError::Endpoint(e.to_string()))?;
        Ok(Self {
            credentials,
            endpoint,
            retry_period: settings.retry_period,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> Credentials {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Credentials::from_lookup(|key| map.get(key).cloned())
    }

    fn full() -> Credentials {
        env(&[
            (PRACTICUM_TOKEN_VAR, "practicum"),
            (TELEGRAM_TOKEN_VAR, "123:abc"),
            (TELEGRAM_CHAT_ID_VAR, "42"),
        ])
    }

    #[test]
    fn check_tokens_all_present() {
        assert!(full().check_tokens());
    }

    #[test]
    fn check_tokens_absent_variable() {
        let creds = env(&[(PRACTICUM_TOKEN_VAR, "p"), (TELEGRAM_TOKEN_VAR, "t")]);
        assert!(!creds.check_tokens());
        assert_eq!(creds.missing(), vec![TELEGRAM_CHAT_ID_VAR]);
    }

    #[test]
    fn check_tokens_empty_variable() {
        let mut creds = full();
        creds.practicum_token = String::new();
        assert!(!creds.check_tokens());

        let mut creds = full();
        creds.telegram_token = String::new();
        assert!(!creds.check_tokens());
    }

    #[test]
    fn chat_recipient_numeric_and_channel() {
        let creds = full();
        assert_eq!(creds.chat_recipient(), Recipient::Id(ChatId(42)));

        let mut creds = full();
        creds.telegram_chat_id = "@homeworks".into();
        assert_eq!(
            creds.chat_recipient(),
            Recipient::ChannelUsername("@homeworks".into())
        );
    }

    #[test]
    fn debug_hides_tokens() {
        let rendered = format!("{:?}", full());
        assert!(!rendered.contains("practicum"));
        assert!(!rendered.contains("123:abc"));
    }

    #[test]
    fn build_rejects_missing_tokens() {
        let err = Config::build(Credentials::default(), &Settings::default()).unwrap_err();
        match err {
            ConfigError::MissingTokens(names) => assert_eq!(names.len(), 3),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn build_rejects_zero_period_and_bad_url() {
        let settings = Settings {
            retry_period: Duration::ZERO,
            ..Settings::default()
        };
        assert!(matches!(
            Config::build(full(), &settings),
            Err(ConfigError::Invalid(_))
        ));

        let settings = Settings {
            endpoint: "not a url".into(),
            ..Settings::default()
        };
        assert!(matches!(
            Config::build(full(), &settings),
            Err(ConfigError::Endpoint(_))
        ));
    }

    #[test]
    fn build_defaults() {
        let cfg = Config::build(full(), &Settings::default()).unwrap();
        assert_eq!(cfg.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(cfg.retry_period, Duration::from_secs(600));
        assert!(Settings::default().log_file.ends_with(DEFAULT_LOG_FILE));
    }

    #[test]
    fn build_reports_each_missing_variable() {
        let mut creds = full();
        creds.telegram_chat_id = String::new();
        match Config::build(creds, &Settings::default()) {
            Err(ConfigError::MissingTokens(names)) => assert_eq!(names, vec![TELEGRAM_CHAT_ID_VAR]),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
