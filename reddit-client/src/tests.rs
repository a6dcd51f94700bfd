use crate::{auth, HttpRedditConnector, RedditApiClient, RedditOAuth2Config, RedditToken};
use std::time::{Duration, SystemTime};
use stocks_core::{AppConfig, CoreError, ErrorCategory, ErrorExt, RedditApiError};

fn create_test_config() -> RedditOAuth2Config {
    RedditOAuth2Config::new(
        "test_client_id".to_string(),
        "test_client_secret".to_string(),
        "stocks-sentiment/1.0 by test_user".to_string(),
    )
}

#[test]
fn test_config_creation() {
    let config = create_test_config();
    assert_eq!(config.client_id, "test_client_id");
    assert_eq!(config.client_secret, "test_client_secret");
    assert_eq!(config.user_agent, "stocks-sentiment/1.0 by test_user");
    assert_eq!(config.token_url, auth::REDDIT_TOKEN_URL);
    assert_eq!(config.api_base, auth::REDDIT_API_BASE);
}

#[test]
fn test_config_from_app_config() {
    let app = AppConfig::from_sources(
        |name| match name {
            "REDDIT_CLIENT_ID" => Some("app-id".to_string()),
            "REDDIT_CLIENT_SECRET" => Some("app-secret".to_string()),
            _ => None,
        },
        Some("[reddit]\nuser_agent = \"custom-agent/2.0\""),
    )
    .unwrap();

    let config = RedditOAuth2Config::from_app_config(&app);
    assert_eq!(config.client_id, "app-id");
    assert_eq!(config.client_secret, "app-secret");
    assert_eq!(config.user_agent, "custom-agent/2.0");
}

#[test]
fn test_endpoint_override_trims_trailing_slash() {
    let config = create_test_config()
        .with_endpoints("http://127.0.0.1:9/api/v1/access_token", "http://127.0.0.1:9/");
    assert_eq!(config.api_base, "http://127.0.0.1:9");
    assert_eq!(config.token_url, "http://127.0.0.1:9/api/v1/access_token");
}

#[test]
fn test_required_scopes() {
    assert_eq!(RedditOAuth2Config::get_required_scopes(), vec!["read"]);
}

#[test]
fn test_token_serialization() {
    let token = RedditToken {
        access_token: "test_access_token".to_string(),
        expires_at: SystemTime::UNIX_EPOCH + Duration::from_secs(1640995200),
        scope: vec!["read".to_string()],
    };

    let serialized = serde_json::to_string(&token).unwrap();
    assert!(serialized.contains("test_access_token"));

    let deserialized: RedditToken = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized.access_token, token.access_token);
    assert_eq!(deserialized.expires_at, token.expires_at);
    assert_eq!(deserialized.scope, token.scope);
}

#[test]
fn test_api_client_sessions_are_distinct() {
    let token = RedditToken {
        access_token: "token".to_string(),
        expires_at: SystemTime::now() + Duration::from_secs(60),
        scope: vec!["read".to_string()],
    };
    let first = RedditApiClient::new(reqwest::Client::new(), auth::REDDIT_API_BASE, token.clone());
    let second = RedditApiClient::new(reqwest::Client::new(), auth::REDDIT_API_BASE, token);
    assert_ne!(first.session_id(), second.session_id());
}

#[test]
fn test_connector_creation() {
    assert!(HttpRedditConnector::new(create_test_config()).is_ok());
}

#[test]
fn test_reddit_errors_map_to_categories() {
    let not_found = CoreError::RedditApi(RedditApiError::PostNotFound {
        post_id: "abc".to_string(),
    });
    assert_eq!(not_found.category(), ErrorCategory::PostNotFound);

    let missing_sub = CoreError::RedditApi(RedditApiError::SubredditNotFound {
        subreddit: "nope".to_string(),
    });
    assert_eq!(missing_sub.category(), ErrorCategory::AuthenticationOrNetwork);
}
