//! Builds a dispatcher from configuration

use std::sync::Arc;

use crate::application::conversations::ConversationStore;
use crate::application::errors::{BotError, ConfigError};
use crate::application::messaging::Dispatcher;
use crate::domain::traits::{Cache, HttpClient};
use crate::infrastructure::adapters::{NexmoDriver, SlackDriver, TelegramDriver};
use crate::infrastructure::config::{CacheBackend, Config};
use crate::infrastructure::database::SqliteCache;
use crate::infrastructure::storage::MemoryCache;

/// Cache backend selected by the configuration
pub fn cache_from_config(config: &Config) -> Result<Arc<dyn Cache>, BotError> {
    match config.cache.backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryCache::new())),
        CacheBackend::Sqlite => {
            let path = config.cache.path.as_ref()
                .ok_or_else(|| ConfigError::MissingField("cache.path".to_string()))?;
            tracing::info!("Using SQLite conversation cache at {}", path.display());
            Ok(Arc::new(SqliteCache::open(path)?))
        }
    }
}

/// Dispatcher with every enabled driver, in priority order Slack, Nexmo, Telegram
pub fn dispatcher_from_config(config: &Config, http: Arc<dyn HttpClient>) -> Result<Dispatcher, BotError> {
    config.validate()?;

    let store = ConversationStore::new(cache_from_config(config)?).with_ttl(config.conversation_ttl());
    let mut dispatcher = Dispatcher::new(store).with_literal_mode(config.matcher.literal_mode);

    if let Some(slack) = config.drivers.slack.as_ref().filter(|s| s.enabled) {
        let mut driver = SlackDriver::new(http.clone()).with_token(slack.token.clone());
        if let Some(url) = &slack.api_url {
            driver = driver.with_api_url(url.as_str());
        }
        dispatcher.register_driver(Arc::new(driver));
    }

    if let Some(nexmo) = config.drivers.nexmo.as_ref().filter(|n| n.enabled) {
        let (Some(key), Some(secret)) = (&nexmo.api_key, &nexmo.api_secret) else {
            return Err(ConfigError::MissingField("drivers.nexmo.api-key".to_string()).into());
        };
        let mut driver = NexmoDriver::new(http.clone(), key.as_str(), secret.as_str());
        if let Some(url) = &nexmo.api_url {
            driver = driver.with_api_url(url.as_str());
        }
        dispatcher.register_driver(Arc::new(driver));
    }

    if let Some(tg) = config.drivers.telegram.as_ref().filter(|t| t.enabled) {
        let token = tg.token.as_ref()
            .ok_or_else(|| ConfigError::MissingField("drivers.telegram.token".to_string()))?;
        let mut driver = TelegramDriver::new(http.clone(), token.as_str());
        if let Some(url) = &tg.api_url {
            driver = driver.with_api_url(url.as_str());
        }
        dispatcher.register_driver(Arc::new(driver));
    }

    if dispatcher.driver_names().is_empty() {
        tracing::warn!("No drivers enabled; every request will be rejected");
    } else {
        tracing::info!("{}: drivers {:?}", config.bot.name, dispatcher.driver_names());
    }

    Ok(dispatcher)
}
