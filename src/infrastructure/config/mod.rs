//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::errors::ConfigError;
use crate::application::messaging::LiteralMode;

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    pub cache: CacheConfig,
    pub drivers: DriversConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConversationConfig {
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MatcherConfig {
    #[serde(default)]
    pub literal_mode: LiteralMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DriversConfig {
    pub slack: Option<SlackConfig>,
    pub nexmo: Option<NexmoConfig>,
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlackConfig {
    pub enabled: bool,
    pub token: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct NexmoConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
    pub api_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "hearken".to_string(),
            },
            conversation: ConversationConfig {
                ttl_seconds: 30 * 60,
            },
            matcher: MatcherConfig::default(),
            cache: CacheConfig {
                backend: CacheBackend::Memory,
                path: Some(PathBuf::from("hearken.db")),
            },
            drivers: DriversConfig {
                slack: Some(SlackConfig {
                    enabled: true,
                    token: None,
                    api_url: None,
                }),
                nexmo: Some(NexmoConfig {
                    enabled: false,
                    api_key: None,
                    api_secret: None,
                    api_url: None,
                }),
                telegram: Some(TelegramConfig {
                    enabled: false,
                    token: None,
                    api_url: None,
                }),
            },
        }
    }
}

/// Upper bound for `conversation.ttl-seconds` (one year)
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(token) = std::env::var("SLACK_TOKEN") {
            if let Some(ref mut slack) = config.drivers.slack {
                slack.token = Some(token);
                slack.enabled = true;
            }
        }

        if let (Ok(key), Ok(secret)) = (std::env::var("NEXMO_API_KEY"), std::env::var("NEXMO_API_SECRET")) {
            if let Some(ref mut nexmo) = config.drivers.nexmo {
                nexmo.api_key = Some(key);
                nexmo.api_secret = Some(secret);
                nexmo.enabled = true;
            }
        }

        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if let Some(ref mut tg) = config.drivers.telegram {
                tg.token = Some(token);
                tg.enabled = true;
            }
        }

        if let Ok(ttl) = std::env::var("HEARKEN_CONVERSATION_TTL") {
            match ttl.parse() {
                Ok(secs) => config.conversation.ttl_seconds = secs,
                Err(_) => tracing::warn!("Ignoring invalid HEARKEN_CONVERSATION_TTL: {}", ttl),
            }
        }

        if let Ok(path) = std::env::var("HEARKEN_CACHE_PATH") {
            config.cache.backend = CacheBackend::Sqlite;
            config.cache.path = Some(PathBuf::from(path));
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.conversation.ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue("conversation.ttl-seconds must be positive".to_string()));
        }
        if self.conversation.ttl_seconds > MAX_TTL_SECONDS {
            return Err(ConfigError::InvalidValue(format!(
                "conversation.ttl-seconds must be at most {}",
                MAX_TTL_SECONDS
            )));
        }

        if self.cache.backend == CacheBackend::Sqlite && self.cache.path.is_none() {
            return Err(ConfigError::MissingField("cache.path".to_string()));
        }

        if let Some(nexmo) = self.drivers.nexmo.as_ref().filter(|n| n.enabled) {
            if nexmo.api_key.is_none() {
                return Err(ConfigError::MissingField("drivers.nexmo.api-key".to_string()));
            }
            if nexmo.api_secret.is_none() {
                return Err(ConfigError::MissingField("drivers.nexmo.api-secret".to_string()));
            }
        }

        if let Some(tg) = self.drivers.telegram.as_ref().filter(|t| t.enabled) {
            if tg.token.is_none() {
                return Err(ConfigError::MissingField("drivers.telegram.token".to_string()));
            }
        }

        Ok(())
    }

    pub fn conversation_ttl(&self) -> Duration {
        Duration::from_secs(self.conversation.ttl_seconds)
    }
}
