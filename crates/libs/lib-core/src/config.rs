//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `AI_WEBHOOK_URL` | unset | Remote reply endpoint; unset means local replies only |
//! | `AI_WEBHOOK_TIMEOUT_SECS` | `30` | Timeout for the remote call |
//! | `SESSION_TTL_HOURS` | `24` | Age after which a session expires |
//! | `CHAT_RATE_LIMIT_PER_MINUTE` | `15` | Chat messages per client address per minute |
//! | `API_RATE_LIMIT_PER_MINUTE` | `100` | API requests per client address per minute |
//!
//! The config is built once at startup and handed to the server state; nothing
//! reads it through a global.

use lib_utils::envs::{get_env_or, get_env_parse_or};

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Remote AI webhook URL
    pub ai_webhook_url: Option<String>,

    /// Timeout for the remote AI call, in seconds
    ///
    /// Valid range: 1-120 seconds
    pub ai_webhook_timeout_secs: u64,

    /// Session validity period in hours
    ///
    /// After this period the session is marked inactive and a new one is created.
    /// Valid range: 1-720 hours (1 hour to 30 days)
    pub session_ttl_hours: i64,

    /// Chat messages allowed per client address per minute
    pub chat_rate_limit_per_minute: u32,

    /// API requests allowed per client address per minute
    pub api_rate_limit_per_minute: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai_webhook_url: None,
            ai_webhook_timeout_secs: 30,
            session_ttl_hours: 24,
            chat_rate_limit_per_minute: 15,
            api_rate_limit_per_minute: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let ai_webhook_url = Some(get_env_or("AI_WEBHOOK_URL", ""))
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let ai_webhook_timeout_secs =
            get_env_parse_or("AI_WEBHOOK_TIMEOUT_SECS", defaults.ai_webhook_timeout_secs)
                .map_err(|e| format!("AI_WEBHOOK_TIMEOUT_SECS must be a valid number: {}", e))?;

        let session_ttl_hours = get_env_parse_or("SESSION_TTL_HOURS", defaults.session_ttl_hours)
            .map_err(|e| format!("SESSION_TTL_HOURS must be a valid number: {}", e))?;

        let chat_rate_limit_per_minute =
            get_env_parse_or("CHAT_RATE_LIMIT_PER_MINUTE", defaults.chat_rate_limit_per_minute)
                .map_err(|e| format!("CHAT_RATE_LIMIT_PER_MINUTE must be a valid number: {}", e))?;

        let api_rate_limit_per_minute =
            get_env_parse_or("API_RATE_LIMIT_PER_MINUTE", defaults.api_rate_limit_per_minute)
                .map_err(|e| format!("API_RATE_LIMIT_PER_MINUTE must be a valid number: {}", e))?;

        Ok(Self {
            ai_webhook_url,
            ai_webhook_timeout_secs,
            session_ttl_hours,
            chat_rate_limit_per_minute,
            api_rate_limit_per_minute,
        })
    }

    /// Validate configuration values against business rules.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.ai_webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err("AI_WEBHOOK_URL must start with http:// or https://".to_string());
            }
        }

        if self.ai_webhook_timeout_secs < 1 || self.ai_webhook_timeout_secs > 120 {
            return Err("AI_WEBHOOK_TIMEOUT_SECS must be between 1 and 120".to_string());
        }

        if self.session_ttl_hours < 1 || self.session_ttl_hours > 720 {
            return Err("SESSION_TTL_HOURS must be between 1 and 720 (30 days)".to_string());
        }

        if self.chat_rate_limit_per_minute == 0 || self.api_rate_limit_per_minute == 0 {
            return Err("Rate limits must allow at least 1 request per minute".to_string());
        }

        Ok(())
    }

    /// Session validity period.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }

    /// Timeout for the remote AI call.
    pub fn ai_webhook_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ai_webhook_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.ai_webhook_timeout(), std::time::Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let bad_url = Config {
            ai_webhook_url: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());

        let bad_ttl = Config {
            session_ttl_hours: 0,
            ..Default::default()
        };
        assert!(bad_ttl.validate().is_err());

        let bad_limit = Config {
            chat_rate_limit_per_minute: 0,
            ..Default::default()
        };
        assert!(bad_limit.validate().is_err());
    }
}
