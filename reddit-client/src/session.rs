//! Capability seams between the tools and Reddit.
//!
//! Every tool call opens its own session through a [`RedditConnector`], uses
//! the returned [`PostSource`] and drops it. Nothing is shared between calls.

use crate::api::{NewestPosts, RedditApiClient};
use crate::auth::{AppOnlyAuthenticator, RedditOAuth2Config};
use crate::post_ref::PostId;
use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::time::Duration;
use stocks_core::{CoreError, PostDetail};
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read access to one community's posts.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn list_newest(&self, subreddit: &str, limit: u32) -> Result<NewestPosts, CoreError>;

    async fn get_post(&self, post_id: &PostId, comment_limit: u32)
        -> Result<PostDetail, CoreError>;
}

/// Opens authenticated sessions.
#[async_trait]
pub trait RedditConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn PostSource>, CoreError>;
}

#[async_trait]
impl PostSource for RedditApiClient {
    async fn list_newest(&self, subreddit: &str, limit: u32) -> Result<NewestPosts, CoreError> {
        self.get_newest_posts(subreddit, limit).await
    }

    async fn get_post(
        &self,
        post_id: &PostId,
        comment_limit: u32,
    ) -> Result<PostDetail, CoreError> {
        self.get_post_thread(post_id, comment_limit).await
    }
}

/// Connects to Reddit over HTTPS with app-only credentials.
pub struct HttpRedditConnector {
    config: RedditOAuth2Config,
    http_client: Client,
}

impl HttpRedditConnector {
    pub fn new(config: RedditOAuth2Config) -> Result<Self, CoreError> {
        // Redirects are answers in their own right: unknown subreddits bounce to search.
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(CoreError::Network)?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl RedditConnector for HttpRedditConnector {
    async fn connect(&self) -> Result<Box<dyn PostSource>, CoreError> {
        let authenticator = AppOnlyAuthenticator::new(&self.config, self.http_client.clone())?;
        let token = authenticator.fetch_token().await?;

        let client = RedditApiClient::new(
            self.http_client.clone(),
            self.config.api_base.clone(),
            token,
        );
        info!("Opened Reddit session {}", client.session_id());
        debug!("Session API base: {}", self.config.api_base);
        Ok(Box::new(client))
    }
}
