use stocks_core::{
    ConfigError, CoreError, ErrorCategory, ErrorExt, ErrorReporter, RedditApiError, RenderError,
    ValidationError,
};
use std::time::Duration;

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_INVALID_TOKEN");

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_CLIENT_ID".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG_MISSING_ENV_VAR");

    let validation_error = CoreError::Validation(ValidationError::OutOfRange {
        index: 0,
        field: "Sentiment".to_string(),
        value: 1.5,
        min: -1.0,
        max: 1.0,
    });
    assert_eq!(validation_error.error_code(), "VALIDATION_OUT_OF_RANGE");

    let render_error = CoreError::Render(RenderError::InvalidLabel { index: 2 });
    assert_eq!(render_error.error_code(), "RENDER_INVALID_LABEL");

    let io_error = CoreError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
    assert_eq!(io_error.error_code(), "IO");
}

#[test]
fn test_error_categories() {
    let cases = [
        (
            CoreError::Config(ConfigError::ValidationFailed {
                reason: "bad".to_string(),
            }),
            ErrorCategory::Configuration,
        ),
        (
            CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                reason: "invalid_client".to_string(),
            }),
            ErrorCategory::AuthenticationOrNetwork,
        ),
        (
            CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 }),
            ErrorCategory::AuthenticationOrNetwork,
        ),
        (
            CoreError::RedditApi(RedditApiError::PostNotFound {
                post_id: "abc123".to_string(),
            }),
            ErrorCategory::PostNotFound,
        ),
        (
            CoreError::Validation(ValidationError::InvalidPostReference {
                input: "https://example.com".to_string(),
                reason: "not a Reddit URL".to_string(),
            }),
            ErrorCategory::InputValidation,
        ),
        (
            CoreError::Render(RenderError::NonFiniteCoordinate { index: 0 }),
            ErrorCategory::Render,
        ),
        (
            CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
            ErrorCategory::Internal,
        ),
        (
            CoreError::Internal {
                message: "boom".to_string(),
            },
            ErrorCategory::Internal,
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(error.category(), expected, "category of {error}");
    }
}

#[test]
fn test_category_labels() {
    assert_eq!(ErrorCategory::InputValidation.as_str(), "INPUT_VALIDATION");
    assert_eq!(
        ErrorCategory::AuthenticationOrNetwork.to_string(),
        "AUTHENTICATION_OR_NETWORK"
    );
    assert_eq!(
        serde_json::to_value(ErrorCategory::PostNotFound).unwrap(),
        serde_json::json!("POST_NOT_FOUND")
    );
}

#[test]
fn test_retryable_errors() {
    let retryable_error =
        CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 60 });
    assert!(retryable_error.is_retryable());

    let non_retryable_error = CoreError::Validation(ValidationError::NotAnObject { index: 3 });
    assert!(!non_retryable_error.is_retryable());

    let not_found = CoreError::RedditApi(RedditApiError::PostNotFound {
        post_id: "abc".to_string(),
    });
    assert!(!not_found.is_retryable());
}

#[test]
fn test_retry_after() {
    let rate_limit_error =
        CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 60 });
    assert_eq!(
        rate_limit_error.retry_after(),
        Some(Duration::from_secs(60))
    );

    let config_error = CoreError::Config(ConfigError::ValidationFailed {
        reason: "bad".to_string(),
    });
    assert_eq!(config_error.retry_after(), None);
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("access token"));

    let validation_error = CoreError::Validation(ValidationError::OutOfRange {
        index: 0,
        field: "Sentiment".to_string(),
        value: 1.5,
        min: -1.0,
        max: 1.0,
    });
    let message = validation_error.user_friendly_message();
    assert!(message.contains("record 0"));
    assert!(message.contains("Sentiment"));

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_CLIENT_SECRET".to_string(),
    });
    assert!(config_error
        .user_friendly_message()
        .contains("REDDIT_CLIENT_SECRET"));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new()
        .with_error_reporting(true)
        .with_warning_reporting(true);
    let error = CoreError::RedditApi(RedditApiError::InvalidToken);

    // This test just ensures the methods don't panic
    reporter.report(&error);
    reporter.report_error(&error);
    reporter.report_warning(&error);
    reporter.report(&CoreError::Validation(ValidationError::NotAnObject { index: 0 }));
}
