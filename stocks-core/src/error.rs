use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Subreddit not found: {subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("Post not found: {post_id}")]
    PostNotFound { post_id: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Input that breaks a tool's declared contract.
///
/// Record-level variants carry the zero-based index of the offending record
/// and the name of the field as the caller spelled it in the schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("record {index}: missing required field '{field}'")]
    MissingField { index: usize, field: String },

    #[error("record {index}: field '{field}' must be {expected}")]
    WrongType {
        index: usize,
        field: String,
        expected: &'static str,
    },

    #[error("record {index}: field '{field}' is {value}, outside [{min}, {max}]")]
    OutOfRange {
        index: usize,
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("record {index}: field '{field}' {reason}")]
    InvalidValue {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("invalid post reference '{input}': {reason}")]
    InvalidPostReference { input: String, reason: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

impl ValidationError {
    /// Index of the offending record, if the error concerns a plot record.
    pub fn index(&self) -> Option<usize> {
        match self {
            ValidationError::NotAnObject { index }
            | ValidationError::MissingField { index, .. }
            | ValidationError::WrongType { index, .. }
            | ValidationError::OutOfRange { index, .. }
            | ValidationError::InvalidValue { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingField { field, .. }
            | ValidationError::WrongType { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidValue { field, .. }
            | ValidationError::InvalidArgument { field, .. } => Some(field),
            ValidationError::InvalidPostReference { .. } => Some("post_id"),
            // The whole record is the offending field.
            ValidationError::NotAnObject { .. } => Some("record"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("label for marker {index} contains characters that cannot be rendered")]
    InvalidLabel { index: usize },

    #[error("non-finite coordinate for marker {index}")]
    NonFiniteCoordinate { index: usize },

    #[error("chart serialization failed: {reason}")]
    Serialization { reason: String },
}
