//! Application-only OAuth2 for Reddit.
//!
//! The server never acts on behalf of a user, so it exchanges the app id and
//! secret for a short-lived bearer token with the `client_credentials` grant.

use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError, Scope,
    TokenResponse, TokenUrl,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use stocks_core::{AppConfig, ConfigError, CoreError, RedditApiError};
use tracing::{debug, error};

pub const REDDIT_AUTHORIZE_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub token_url: String,
    pub api_base: String,
}

impl RedditOAuth2Config {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
            token_url: REDDIT_TOKEN_URL.to_string(),
            api_base: REDDIT_API_BASE.to_string(),
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            config.credentials.client_id.clone(),
            config.credentials.client_secret.clone(),
            config.user_agent.clone(),
        )
    }

    /// Points the client at other endpoints, e.g. a local test server.
    pub fn with_endpoints(mut self, token_url: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn get_required_scopes() -> Vec<&'static str> {
        vec!["read"]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }
}

pub struct AppOnlyAuthenticator {
    oauth_client: BasicClient,
    http_client: Client,
}

impl AppOnlyAuthenticator {
    pub fn new(config: &RedditOAuth2Config, http_client: Client) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(REDDIT_AUTHORIZE_URL.to_string()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "authorize_url".to_string(),
                value: e.to_string(),
            }
        })?;
        let token_url = TokenUrl::new(config.token_url.clone()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "token_url".to_string(),
                value: format!("{} ({})", config.token_url, e),
            }
        })?;

        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        Ok(Self {
            oauth_client,
            http_client,
        })
    }

    pub async fn fetch_token(&self) -> Result<RedditToken, CoreError> {
        let http_client = self.http_client.clone();
        let mut request = self.oauth_client.exchange_client_credentials();
        for scope in RedditOAuth2Config::get_required_scopes() {
            request = request.add_scope(Scope::new(scope.to_string()));
        }

        let token = request
            .request_async(|req| send_token_request(http_client, req))
            .await
            .map_err(map_token_error)?;

        let lifetime = token.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let scope = token
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        debug!("Obtained app-only token valid for {:?}", lifetime);
        Ok(RedditToken {
            access_token: token.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
            scope,
        })
    }
}

/// Sends the token request through the shared client so the configured
/// User-Agent and timeout apply; Reddit throttles anonymous agents.
async fn send_token_request(
    http_client: Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

fn map_token_error(err: RequestTokenError<reqwest::Error, BasicErrorResponse>) -> CoreError {
    match err {
        RequestTokenError::ServerResponse(response) => {
            error!("Reddit rejected the client credentials: {}", response);
            CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                reason: response.to_string(),
            })
        }
        RequestTokenError::Request(e) => {
            error!("Token request failed: {}", e);
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::Network(e)
            }
        }
        RequestTokenError::Parse(e, _body) => {
            error!("Unexpected token response: {}", e);
            CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                reason: "unexpected token response, check REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET"
                    .to_string(),
            })
        }
        RequestTokenError::Other(message) => {
            error!("Token request failed: {}", message);
            CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason: message })
        }
    }
}
