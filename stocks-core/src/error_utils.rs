use crate::error::*;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

/// Error families a tool caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Configuration,
    AuthenticationOrNetwork,
    InputValidation,
    PostNotFound,
    Render,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "CONFIGURATION",
            ErrorCategory::AuthenticationOrNetwork => "AUTHENTICATION_OR_NETWORK",
            ErrorCategory::InputValidation => "INPUT_VALIDATION",
            ErrorCategory::PostNotFound => "POST_NOT_FOUND",
            ErrorCategory::Render => "RENDER",
            ErrorCategory::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
    fn category(&self) -> ErrorCategory;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            CoreError::Render(e) => {
                error!("Render error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::RedditApi(e) => e.is_retryable(),
            CoreError::Network(_) => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::RedditApi(e) => e.retry_after(),
            _ if self.is_retryable() => Some(Duration::from_secs(5)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Validation(e) => e.user_friendly_message(),
            CoreError::Render(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error while talking to Reddit. Please check your internet connection."
                    .to_string()
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.error_code(),
            CoreError::Config(e) => e.error_code(),
            CoreError::Validation(e) => e.error_code(),
            CoreError::Render(e) => e.error_code(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            CoreError::RedditApi(e) => e.category(),
            CoreError::Config(_) => ErrorCategory::Configuration,
            CoreError::Validation(_) => ErrorCategory::InputValidation,
            CoreError::Render(_) => ErrorCategory::Render,
            CoreError::Network(_) => ErrorCategory::AuthenticationOrNetwork,
            CoreError::Io(_) | CoreError::Internal { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RedditApiError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            RedditApiError::RateLimitExceeded { .. } => true,
            RedditApiError::RequestTimeout => true,
            RedditApiError::ServerError { status_code } => *status_code >= 500,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            RedditApiError::RateLimitExceeded { retry_after } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ if self.is_retryable() => Some(Duration::from_secs(30)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit authentication failed. Please check your credentials.".to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. You may not have permission to view this content.",
                resource
            ),
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("Subreddit '{}' not found or is private.", subreddit)
            }
            RedditApiError::PostNotFound { post_id } => format!(
                "Post '{}' could not be found. It may have been removed or made private.",
                post_id
            ),
            RedditApiError::InvalidToken => {
                "Reddit rejected the access token. Please check your credentials.".to_string()
            }
            RedditApiError::RequestTimeout => {
                "Request to Reddit timed out. Please try again.".to_string()
            }
            _ => "Reddit API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND".to_string(),
            RedditApiError::PostNotFound { .. } => "REDDIT_POST_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            RedditApiError::PostNotFound { .. } => ErrorCategory::PostNotFound,
            _ => ErrorCategory::AuthenticationOrNetwork,
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            _ => "Configuration error occurred. Please check your settings.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl ErrorExt for ValidationError {
    fn log_error(&self) -> &Self {
        error!("ValidationError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ValidationError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ValidationError::InvalidPostReference { .. } => format!(
                "{}. Pass a bare post id such as '1a2b3c4' or a full reddit.com post URL.",
                self
            ),
            ValidationError::InvalidArgument { .. } => self.to_string(),
            _ => format!("{}. Fix the record and call create_plot again.", self),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ValidationError::NotAnObject { .. } => "VALIDATION_NOT_AN_OBJECT".to_string(),
            ValidationError::MissingField { .. } => "VALIDATION_MISSING_FIELD".to_string(),
            ValidationError::WrongType { .. } => "VALIDATION_WRONG_TYPE".to_string(),
            ValidationError::OutOfRange { .. } => "VALIDATION_OUT_OF_RANGE".to_string(),
            ValidationError::InvalidValue { .. } => "VALIDATION_INVALID_VALUE".to_string(),
            ValidationError::InvalidPostReference { .. } => {
                "VALIDATION_INVALID_POST_REFERENCE".to_string()
            }
            ValidationError::InvalidArgument { .. } => "VALIDATION_INVALID_ARGUMENT".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::InputValidation
    }
}

impl ErrorExt for RenderError {
    fn log_error(&self) -> &Self {
        error!("RenderError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RenderError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RenderError::InvalidLabel { index } => format!(
                "The symbol of record {} contains control characters. Use plain text labels.",
                index
            ),
            _ => "The chart could not be rendered.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RenderError::InvalidLabel { .. } => "RENDER_INVALID_LABEL".to_string(),
            RenderError::NonFiniteCoordinate { .. } => "RENDER_NON_FINITE".to_string(),
            RenderError::Serialization { .. } => "RENDER_SERIALIZATION".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Render
    }
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    /// Logs a failed tool call. Caller mistakes are reported as warnings,
    /// collaborator faults as errors.
    pub fn report(&self, error: &CoreError) {
        match error.category() {
            ErrorCategory::InputValidation | ErrorCategory::PostNotFound => {
                self.report_warning(error)
            }
            _ => self.report_error(error),
        }
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
            if error.is_retryable() {
                if let Some(retry_after) = error.retry_after() {
                    info!("Error is retryable. Retry after: {:?}", retry_after);
                }
            }
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
