//! Bindings between the tools and their collaborators.

use plot_renderer::{ChartRenderer, RenderedChart};
use reddit_client::{PostId, RedditConnector};
use serde_json::Value;
use std::sync::Arc;
use stocks_core::validation::validate_points;
use stocks_core::{AppConfig, CoreError, FetchLimits, PostDetail, PostSummary};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct SubredditPosts {
    pub subreddit: String,
    pub posts: Vec<PostSummary>,
    pub skipped: usize,
}

/// Reads posts through a fresh Reddit session per call.
pub struct PostService {
    connector: Arc<dyn RedditConnector>,
    subreddit: String,
    limits: FetchLimits,
}

impl PostService {
    pub fn new(config: &AppConfig, connector: Arc<dyn RedditConnector>) -> Self {
        Self {
            connector,
            subreddit: config.subreddit.clone(),
            limits: config.limits,
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub async fn newest_posts(&self, limit: Option<u32>) -> Result<SubredditPosts, CoreError> {
        let limit = self.limits.resolve_post_limit(limit)?;
        debug!("Fetching up to {} posts from r/{}", limit, self.subreddit);

        let session = self.connector.connect().await?;
        let listing = session.list_newest(&self.subreddit, limit).await?;

        let mut posts = listing.posts;
        posts.sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
        posts.truncate(limit as usize);

        info!(
            "Returning {} posts from r/{} ({} skipped)",
            posts.len(),
            self.subreddit,
            listing.skipped
        );
        Ok(SubredditPosts {
            subreddit: self.subreddit.clone(),
            posts,
            skipped: listing.skipped,
        })
    }

    pub async fn single_post(&self, reference: &str) -> Result<PostDetail, CoreError> {
        let post_id = PostId::parse(reference)?;
        debug!("Resolved post reference '{}' to {}", reference, post_id);

        let session = self.connector.connect().await?;
        session.get_post(&post_id, self.limits.max_comments).await
    }
}

/// Validates plot records and hands them to the renderer.
pub struct PlotService {
    renderer: Arc<dyn ChartRenderer>,
}

impl PlotService {
    pub fn new(renderer: Arc<dyn ChartRenderer>) -> Self {
        Self { renderer }
    }

    pub fn create_plot(&self, records: &[Value]) -> Result<RenderedChart, CoreError> {
        let points = validate_points(records)?;
        Ok(self.renderer.render(&points)?)
    }
}
