use std::{net::SocketAddr, path::PathBuf, time::Duration};

use teloxide::types::ChatId;
use url::Url;

use crate::{
    error::ConfigError,
    runner::{RunnerSettings, DEFAULT_SHARE_LINK},
};

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOGO: &str = "img/logo.jpg";
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub log_level: String,
    pub webhook: Option<WebhookConfig>,
    pub catalog_path: Option<PathBuf>,
    pub logo: Option<String>,
    pub feedback_chat: Option<ChatId>,
    pub share_link: String,
    pub session_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token = var("TELOXIDE_TOKEN").ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;
        validate_token(&token)?;

        let webhook = match (var("WEBHOOK_URL"), var("WEBHOOK_ADDR")) {
            (Some(url), Some(addr)) => Some(WebhookConfig {
                url: url.parse::<Url>().map_err(|err: url::ParseError| ConfigError::Invalid {
                    var: "WEBHOOK_URL",
                    reason: err.to_string(),
                })?,
                addr: addr
                    .parse::<SocketAddr>()
                    .map_err(|err: std::net::AddrParseError| ConfigError::Invalid {
                        var: "WEBHOOK_ADDR",
                        reason: err.to_string(),
                    })?,
            }),
            (Some(_), None) => {
                return Err(ConfigError::Incomplete {
                    set: "WEBHOOK_URL",
                    unset: "WEBHOOK_ADDR",
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete {
                    set: "WEBHOOK_ADDR",
                    unset: "WEBHOOK_URL",
                })
            }
            (None, None) => None,
        };

        let feedback_chat = var("FEEDBACK_CHAT_ID")
            .map(|raw| parse_number::<i64>("FEEDBACK_CHAT_ID", &raw).map(ChatId))
            .transpose()?;

        let ttl_secs = var("SESSION_TTL_SECS")
            .map(|raw| parse_number::<u64>("SESSION_TTL_SECS", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Ok(Self {
            token,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
            webhook,
            catalog_path: var("CATALOG_PATH").map(PathBuf::from),
            logo: Some(var("LOGO_PATH").unwrap_or_else(|| DEFAULT_LOGO.to_owned())),
            feedback_chat,
            share_link: var("SHARE_LINK").unwrap_or_else(|| DEFAULT_SHARE_LINK.to_owned()),
            session_ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
        })
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            logo: self.logo.clone(),
            feedback_chat: self.feedback_chat,
            share_link: self.share_link.clone(),
            session_ttl: self.session_ttl,
            ..RunnerSettings::default()
        }
    }
}

/// Telegram tokens look like `123456:secret`.
fn validate_token(token: &str) -> Result<(), ConfigError> {
    let valid = token.split_once(':').is_some_and(|(id, secret)| {
        !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) && !secret.is_empty()
    });
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            var: "TELOXIDE_TOKEN",
            reason: "expected <bot id>:<secret>".to_owned(),
        })
    }
}

fn parse_number<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        var,
        reason: err.to_string(),
    })
}
