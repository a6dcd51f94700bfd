//! Process configuration, built once at startup and handed to the server.
//!
//! Credentials only ever come from the environment. Non-secret settings can be
//! placed in a TOML file; `STOCKS_SUBREDDIT` overrides the community name.

use crate::error::{ConfigError, ValidationError};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

pub const CLIENT_ID_VAR: &str = "REDDIT_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "REDDIT_CLIENT_SECRET";
pub const SUBREDDIT_VAR: &str = "STOCKS_SUBREDDIT";

pub const DEFAULT_SUBREDDIT: &str = "stocks";
pub const DEFAULT_USER_AGENT: &str = "stocks-sentiment-mcp/0.1 (app-only)";
pub const DEFAULT_POST_LIMIT: u32 = 25;
pub const MAX_POST_LIMIT: u32 = 100;
pub const DEFAULT_COMMENT_LIMIT: u32 = 50;

#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub default_posts: u32,
    pub max_posts: u32,
    pub max_comments: u32,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            default_posts: DEFAULT_POST_LIMIT,
            max_posts: MAX_POST_LIMIT,
            max_comments: DEFAULT_COMMENT_LIMIT,
        }
    }
}

impl FetchLimits {
    /// Resolves the caller's advisory post limit: absent means the default,
    /// values above the maximum are clamped, zero is rejected.
    pub fn resolve_post_limit(&self, requested: Option<u32>) -> Result<u32, ValidationError> {
        match requested {
            None => Ok(self.default_posts),
            Some(0) => Err(ValidationError::InvalidArgument {
                field: "limit".to_string(),
                reason: "must be a positive integer".to_string(),
            }),
            Some(limit) if limit > self.max_posts => {
                debug!("Clamping post limit {} to {}", limit, self.max_posts);
                Ok(self.max_posts)
            }
            Some(limit) => Ok(limit),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: RedditCredentials,
    pub subreddit: String,
    pub user_agent: String,
    pub limits: FetchLimits,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    reddit: RedditSection,
    limits: LimitsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RedditSection {
    subreddit: Option<String>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LimitsSection {
    default_posts: Option<u32>,
    max_posts: Option<u32>,
    max_comments: Option<u32>,
}

impl AppConfig {
    /// Builds the configuration from the process environment and an optional
    /// settings file.
    pub fn load(settings_path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match settings_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })?;
                info!("Loaded settings from {}", path.display());
                Some(raw)
            }
            None => None,
        };
        Self::from_sources(|name| std::env::var(name).ok(), settings.as_deref())
    }

    /// Builds the configuration from a variable lookup and optional TOML text.
    pub fn from_sources<F>(lookup: F, settings_toml: Option<&str>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings: FileSettings = match settings_toml {
            Some(raw) => toml::from_str(raw)?,
            None => FileSettings::default(),
        };

        let credentials = RedditCredentials {
            client_id: required_var(&lookup, CLIENT_ID_VAR)?,
            client_secret: required_var(&lookup, CLIENT_SECRET_VAR)?,
        };

        let subreddit = lookup(SUBREDDIT_VAR)
            .filter(|value| !value.trim().is_empty())
            .or(settings.reddit.subreddit)
            .unwrap_or_else(|| DEFAULT_SUBREDDIT.to_string());
        let subreddit = normalize_subreddit(&subreddit)?;

        let user_agent = settings
            .reddit
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        if user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "reddit.user_agent".to_string(),
                value: user_agent,
            });
        }

        let defaults = FetchLimits::default();
        let limits = FetchLimits {
            default_posts: settings.limits.default_posts.unwrap_or(defaults.default_posts),
            max_posts: settings.limits.max_posts.unwrap_or(defaults.max_posts),
            max_comments: settings.limits.max_comments.unwrap_or(defaults.max_comments),
        };
        validate_limits(&limits)?;

        Ok(Self {
            credentials,
            subreddit,
            user_agent,
            limits,
        })
    }
}

fn required_var<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
            var_name: name.to_string(),
        })
}

/// Accepts `stocks`, `r/stocks` or `/r/stocks` and returns the bare name.
fn normalize_subreddit(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let name = trimmed
        .trim_start_matches('/')
        .strip_prefix("r/")
        .unwrap_or(trimmed.trim_start_matches('/'));

    let valid_length = (2..=21).contains(&name.len());
    let valid_chars = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_length || !valid_chars {
        return Err(ConfigError::InvalidValue {
            field: "subreddit".to_string(),
            value: raw.to_string(),
        });
    }
    Ok(name.to_string())
}

fn validate_limits(limits: &FetchLimits) -> Result<(), ConfigError> {
    if limits.default_posts == 0 || limits.default_posts > limits.max_posts {
        return Err(ConfigError::ValidationFailed {
            reason: format!(
                "limits.default_posts must be between 1 and limits.max_posts ({}), got {}",
                limits.max_posts, limits.default_posts
            ),
        });
    }
    if limits.max_comments == 0 {
        return Err(ConfigError::ValidationFailed {
            reason: "limits.max_comments must be at least 1".to_string(),
        });
    }
    Ok(())
}
