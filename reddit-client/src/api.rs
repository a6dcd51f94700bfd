use crate::auth::RedditToken;
use crate::post_ref::PostId;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stocks_core::{Comment, CoreError, PostDetail, PostSummary, RedditApiError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const REDDIT_WEB_BASE: &str = "https://www.reddit.com";
const DELETED_AUTHOR: &str = "[deleted]";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subreddit: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub upvote_ratio: Option<f64>,
    #[serde(default)]
    pub removed_by_category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub score: i64,
    pub created_utc: f64,
}

/// Posts decoded from one listing page, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewestPosts {
    pub posts: Vec<PostSummary>,
    /// Children that could not be decoded and were left out.
    pub skipped: usize,
}

/// What a request is about, for mapping 3xx/403/404 answers.
#[derive(Debug, Clone, Copy)]
enum Resource<'a> {
    Subreddit(&'a str),
    Post(&'a str),
}

impl Resource<'_> {
    fn not_found(&self) -> RedditApiError {
        match self {
            Resource::Subreddit(name) => RedditApiError::SubredditNotFound {
                subreddit: name.to_string(),
            },
            Resource::Post(id) => RedditApiError::PostNotFound {
                post_id: id.to_string(),
            },
        }
    }

    fn forbidden(&self) -> RedditApiError {
        match self {
            Resource::Subreddit(name) => RedditApiError::Forbidden {
                resource: format!("r/{}", name),
            },
            // Posts in private or quarantined communities look the same as missing ones.
            Resource::Post(_) => self.not_found(),
        }
    }
}

/// One authenticated, read-only Reddit session.
#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    api_base: String,
    access_token: String,
    session_id: Uuid,
}

impl RedditApiClient {
    pub fn new(http_client: Client, api_base: impl Into<String>, token: RedditToken) -> Self {
        Self {
            http_client,
            api_base: api_base.into(),
            access_token: token.access_token,
            session_id: Uuid::new_v4(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    async fn make_request(
        &self,
        endpoint: &str,
        query_params: &[(&str, String)],
        resource: Resource<'_>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.api_base, endpoint);

        info!(
            "Making Reddit API request: {} {} (session {})",
            Method::GET,
            endpoint,
            self.session_id
        );
        let response = match self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query_params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for GET {}: {}", endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let err = match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited, retry after {} seconds", retry_after);
                RedditApiError::RateLimitExceeded { retry_after }
            }
            StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
            StatusCode::FORBIDDEN => resource.forbidden(),
            StatusCode::NOT_FOUND => resource.not_found(),
            // Unknown communities redirect to the search page.
            s if s.is_redirection() => resource.not_found(),
            s if s.is_server_error() => RedditApiError::ServerError {
                status_code: s.as_u16(),
            },
            s => RedditApiError::InvalidResponse {
                details: format!("unexpected status {} for {}", s, endpoint),
            },
        };
        Err(CoreError::RedditApi(err))
    }

    async fn get_json(
        &self,
        endpoint: &str,
        query_params: &[(&str, String)],
        resource: Resource<'_>,
    ) -> Result<Value, CoreError> {
        let response = self.make_request(endpoint, query_params, resource).await?;
        response.json::<Value>().await.map_err(|e| {
            error!("Failed to decode response from {}: {}", endpoint, e);
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("response from {} is not JSON", endpoint),
                })
            }
        })
    }

    /// Fetches up to `limit` posts of `subreddit`, newest first.
    pub async fn get_newest_posts(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<NewestPosts, CoreError> {
        let endpoint = format!("/r/{}/new", subreddit);
        let params = [("limit", limit.to_string()), ("raw_json", "1".to_string())];

        let body = self
            .get_json(&endpoint, &params, Resource::Subreddit(subreddit))
            .await?;
        let listing = parse_post_listing(subreddit, &body)?;

        info!(
            "Retrieved {} posts from r/{} ({} skipped)",
            listing.posts.len(),
            subreddit,
            listing.skipped
        );
        Ok(listing)
    }

    /// Fetches one post and up to `comment_limit` of its top-level comments.
    pub async fn get_post_thread(
        &self,
        post_id: &PostId,
        comment_limit: u32,
    ) -> Result<PostDetail, CoreError> {
        let endpoint = format!("/comments/{}", post_id.as_str());
        let params = [
            ("limit", comment_limit.to_string()),
            ("depth", "1".to_string()),
            ("sort", "top".to_string()),
            ("raw_json", "1".to_string()),
        ];

        let body = self
            .get_json(&endpoint, &params, Resource::Post(post_id.as_str()))
            .await?;
        let detail = parse_post_thread(post_id, &body, comment_limit as usize)?;

        info!(
            "Fetched post '{}' with {} comments",
            detail.summary.title,
            detail.comments.len()
        );
        Ok(detail)
    }
}

/// Decodes a `/r/<sub>/new` listing. Children that fail to decode are
/// skipped and counted rather than failing the batch.
pub fn parse_post_listing(subreddit: &str, body: &Value) -> Result<NewestPosts, CoreError> {
    let children = listing_children(body).ok_or_else(|| {
        CoreError::RedditApi(RedditApiError::InvalidResponse {
            details: format!("Failed to parse posts for r/{}", subreddit),
        })
    })?;

    let mut listing = NewestPosts::default();
    for (position, child) in children.iter().enumerate() {
        match decode_post_child(child) {
            Ok(post) => listing.posts.push(post),
            Err(reason) => {
                warn!(
                    "Skipping post {} of r/{} listing: {}",
                    position, subreddit, reason
                );
                listing.skipped += 1;
            }
        }
    }
    Ok(listing)
}

/// Decodes the two-listing answer of `/comments/<id>`.
pub fn parse_post_thread(
    post_id: &PostId,
    body: &Value,
    comment_limit: usize,
) -> Result<PostDetail, CoreError> {
    let not_found = || {
        CoreError::RedditApi(RedditApiError::PostNotFound {
            post_id: post_id.to_string(),
        })
    };
    let listings = body.as_array().ok_or_else(|| {
        CoreError::RedditApi(RedditApiError::InvalidResponse {
            details: format!("Failed to parse thread for post {}", post_id),
        })
    })?;

    let post_child = listings
        .first()
        .and_then(listing_children)
        .and_then(|children| children.iter().find(|c| c["kind"] == "t3"))
        .ok_or_else(not_found)?;
    let post_data: RedditPostData =
        serde_json::from_value(post_child["data"].clone()).map_err(|e| {
            error!("Failed to parse post {}: {}", post_id, e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse post {}", post_id),
            })
        })?;

    if let Some(category) = &post_data.removed_by_category {
        warn!("Post {} was removed ({})", post_id, category);
        return Err(not_found());
    }

    let subreddit = post_data.subreddit.clone().unwrap_or_default();
    let upvote_ratio = post_data.upvote_ratio;
    let summary = post_data
        .into_summary()
        .map_err(|reason| CoreError::RedditApi(RedditApiError::InvalidResponse { details: reason }))?;

    let comments = listings
        .get(1)
        .and_then(listing_children)
        .map(|children| decode_comments(post_id, children, comment_limit))
        .unwrap_or_default();

    Ok(PostDetail {
        summary,
        subreddit,
        upvote_ratio,
        comments,
    })
}

fn listing_children(body: &Value) -> Option<&Vec<Value>> {
    body.get("data")?.get("children")?.as_array()
}

fn decode_post_child(child: &Value) -> Result<PostSummary, String> {
    let kind = child["kind"].as_str().unwrap_or_default();
    if kind != "t3" {
        return Err(format!("unexpected kind '{}'", kind));
    }
    let data: RedditPostData =
        serde_json::from_value(child["data"].clone()).map_err(|e| e.to_string())?;
    data.into_summary()
}

fn decode_comments(post_id: &PostId, children: &[Value], limit: usize) -> Vec<Comment> {
    children
        .iter()
        // "more" placeholders stand for comments that were not loaded
        .filter(|child| child["kind"] == "t1")
        .filter_map(|child| {
            match serde_json::from_value::<RedditCommentData>(child["data"].clone()) {
                Ok(data) => match data.into_comment() {
                    Ok(comment) => Some(comment),
                    Err(reason) => {
                        warn!("Skipping comment on post {}: {}", post_id, reason);
                        None
                    }
                },
                Err(e) => {
                    warn!("Skipping comment on post {}: {}", post_id, e);
                    None
                }
            }
        })
        .take(limit)
        .collect()
}

fn timestamp(created_utc: f64) -> Result<DateTime<Utc>, String> {
    if !created_utc.is_finite() {
        return Err(format!("invalid created_utc {}", created_utc));
    }
    let secs = created_utc.trunc() as i64;
    let nanos = ((created_utc.fract()) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    DateTime::from_timestamp(secs, nanos).ok_or_else(|| format!("invalid created_utc {}", created_utc))
}

fn author_or_deleted(author: Option<String>) -> String {
    author
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DELETED_AUTHOR.to_string())
}

fn absolute_permalink(permalink: &str) -> String {
    if permalink.starts_with('/') {
        format!("{}{}", REDDIT_WEB_BASE, permalink)
    } else {
        permalink.to_string()
    }
}

impl RedditPostData {
    pub fn into_summary(self) -> Result<PostSummary, String> {
        let created_utc = timestamp(self.created_utc)?;
        let permalink = self
            .permalink
            .as_deref()
            .map(absolute_permalink)
            .unwrap_or_else(|| format!("{}/comments/{}", REDDIT_WEB_BASE, self.id));
        let url = self
            .url
            .filter(|url| !url.is_empty())
            .map(|url| absolute_permalink(&url))
            .unwrap_or_else(|| permalink.clone());

        Ok(PostSummary {
            id: self.id,
            title: self.title,
            author: author_or_deleted(self.author),
            score: self.score,
            num_comments: self.num_comments,
            created_utc,
            url,
            permalink,
            selftext: self.selftext.unwrap_or_default(),
        })
    }
}

impl RedditCommentData {
    pub fn into_comment(self) -> Result<Comment, String> {
        Ok(Comment {
            created_utc: timestamp(self.created_utc)?,
            id: self.id,
            author: author_or_deleted(self.author),
            body: self.body.unwrap_or_default(),
            score: self.score,
        })
    }
}
