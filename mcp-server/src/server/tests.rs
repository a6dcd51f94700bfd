use super::*;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use plot_renderer::{RenderedChart, SvgChartRenderer};
use reddit_client::{NewestPosts, PostId, PostSource};
use rmcp::model::{ErrorCode, PromptMessageContent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use stocks_core::{Comment, PostDetail, PostSummary, RedditApiError, RenderError, SentimentPoint};

fn summary(id: &str, created_secs: i64) -> PostSummary {
    PostSummary {
        id: id.to_string(),
        title: format!("Post {id}"),
        author: "trader".to_string(),
        score: 10,
        num_comments: 2,
        created_utc: Utc.timestamp_opt(created_secs, 0).unwrap(),
        url: format!("https://www.reddit.com/r/stocks/comments/{id}/post/"),
        permalink: format!("https://www.reddit.com/r/stocks/comments/{id}/post/"),
        selftext: String::new(),
    }
}

#[derive(Default)]
struct FakeReddit {
    connects: AtomicUsize,
    requested_limits: Mutex<Vec<u32>>,
    fail_auth: bool,
}

impl FakeReddit {
    fn failing() -> Self {
        Self {
            fail_auth: true,
            ..Self::default()
        }
    }
}

struct FakeSession {
    reddit: &'static FakeReddit,
}

#[async_trait]
impl PostSource for FakeSession {
    async fn list_newest(&self, subreddit: &str, limit: u32) -> Result<NewestPosts, CoreError> {
        assert_eq!(subreddit, "stocks");
        self.reddit.requested_limits.lock().unwrap().push(limit);
        // Deliberately out of order.
        let posts: Vec<PostSummary> = [3i64, 1, 4, 0, 2, 6, 5]
            .iter()
            .map(|n| summary(&format!("p{n}"), 1_700_000_000 + n * 60))
            .take(limit as usize)
            .collect();
        Ok(NewestPosts { posts, skipped: 1 })
    }

    async fn get_post(
        &self,
        post_id: &PostId,
        comment_limit: u32,
    ) -> Result<PostDetail, CoreError> {
        if post_id.as_str() != "abc123" {
            return Err(CoreError::RedditApi(RedditApiError::PostNotFound {
                post_id: post_id.to_string(),
            }));
        }
        assert_eq!(comment_limit, 50);
        Ok(PostDetail {
            summary: summary("abc123", 1_700_000_000),
            subreddit: "stocks".to_string(),
            upvote_ratio: Some(0.9),
            comments: vec![Comment {
                id: "c1".to_string(),
                author: "a".to_string(),
                body: "Long NVDA".to_string(),
                score: 4,
                created_utc: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
            }],
        })
    }
}

struct FakeConnector(&'static FakeReddit);

#[async_trait]
impl RedditConnector for FakeConnector {
    async fn connect(&self) -> Result<Box<dyn PostSource>, CoreError> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_auth {
            return Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                reason: "invalid_client".to_string(),
            }));
        }
        Ok(Box::new(FakeSession { reddit: self.0 }))
    }
}

struct BrokenRenderer;

impl ChartRenderer for BrokenRenderer {
    fn render(&self, _points: &[SentimentPoint]) -> Result<RenderedChart, RenderError> {
        Err(RenderError::Serialization {
            reason: "disk full".to_string(),
        })
    }
}

fn config() -> AppConfig {
    AppConfig::from_sources(
        |name| match name {
            "REDDIT_CLIENT_ID" => Some("id".to_string()),
            "REDDIT_CLIENT_SECRET" => Some("secret".to_string()),
            _ => None,
        },
        None,
    )
    .unwrap()
}

fn server_with(reddit: FakeReddit) -> (StocksMcp, &'static FakeReddit) {
    let reddit: &'static FakeReddit = Box::leak(Box::new(reddit));
    let server = StocksMcp::new(
        &config(),
        Arc::new(FakeConnector(reddit)),
        Arc::new(SvgChartRenderer::new()),
    );
    (server, reddit)
}

fn server() -> StocksMcp {
    server_with(FakeReddit::default()).0
}

fn error_data(err: &ErrorData) -> &serde_json::Value {
    err.data.as_ref().expect("error data")
}

#[tokio::test]
async fn plan_lists_record_keys() {
    let Json(result) = server().make_stocks_plot_plan().await.expect("plan");
    assert!(result.plan.contains("'Symbol'"));
    assert!(result.plan.contains("fetch_single_reddit_post"));

    let Json(again) = server().make_stocks_plot_plan().await.expect("plan again");
    assert_eq!(result.plan, again.plan);
}

#[tokio::test]
async fn fetch_posts_returns_newest_first_within_limit() {
    let (server, reddit) = server_with(FakeReddit::default());

    for limit in [1, 3, 7] {
        let Json(result) = server
            .fetch_stocks_subreddit_posts(Parameters(FetchPostsParams { limit: Some(limit) }))
            .await
            .expect("fetch posts");

        assert_eq!(result.subreddit, "stocks");
        assert_eq!(result.skipped, 1);
        assert!(result.posts.len() <= limit as usize);
        assert!(result
            .posts
            .windows(2)
            .all(|pair| pair[0].created_utc >= pair[1].created_utc));
    }
    assert_eq!(reddit.connects.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn fetch_posts_defaults_and_clamps_limit() {
    let (server, reddit) = server_with(FakeReddit::default());

    server
        .fetch_stocks_subreddit_posts(Parameters(FetchPostsParams::default()))
        .await
        .expect("default limit");
    server
        .fetch_stocks_subreddit_posts(Parameters(FetchPostsParams { limit: Some(5000) }))
        .await
        .expect("clamped limit");

    assert_eq!(*reddit.requested_limits.lock().unwrap(), vec![25, 100]);
}

#[tokio::test]
async fn fetch_posts_rejects_zero_limit_without_connecting() {
    let (server, reddit) = server_with(FakeReddit::default());

    let err = server
        .fetch_stocks_subreddit_posts(Parameters(FetchPostsParams { limit: Some(0) }))
        .await
        .err().expect("zero limit");

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(error_data(&err)["category"], "INPUT_VALIDATION");
    assert_eq!(error_data(&err)["field"], "limit");
    assert_eq!(reddit.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetch_posts_reports_authentication_failure() {
    let (server, _) = server_with(FakeReddit::failing());

    let err = server
        .fetch_stocks_subreddit_posts(Parameters(FetchPostsParams::default()))
        .await
        .err().expect("auth failure");

    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert_eq!(error_data(&err)["category"], "AUTHENTICATION_OR_NETWORK");
    assert_eq!(error_data(&err)["code"], "REDDIT_AUTH_FAILED");
    assert_eq!(error_data(&err)["retryable"], false);
}

#[tokio::test]
async fn single_post_by_id_and_url_match() {
    let server = server();

    let Json(by_id) = server
        .fetch_single_reddit_post(Parameters(FetchPostParams {
            post_id: "abc123".to_string(),
        }))
        .await
        .expect("by id");
    let Json(by_url) = server
        .fetch_single_reddit_post(Parameters(FetchPostParams {
            post_id: "https://www.reddit.com/r/stocks/comments/abc123/some_title/".to_string(),
        }))
        .await
        .expect("by url");

    assert_eq!(by_id.post, by_url.post);
    assert_eq!(by_id.post.comments.len(), 1);
    assert_eq!(by_id.post.upvote_ratio, Some(0.9));
}

#[tokio::test]
async fn single_post_rejects_malformed_reference() {
    let (server, reddit) = server_with(FakeReddit::default());

    let err = server
        .fetch_single_reddit_post(Parameters(FetchPostParams {
            post_id: "https://example.com/r/stocks/comments/abc123/".to_string(),
        }))
        .await
        .err().expect("wrong host");

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(error_data(&err)["field"], "post_id");
    assert_eq!(reddit.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn single_post_unknown_id_is_not_found() {
    let err = server()
        .fetch_single_reddit_post(Parameters(FetchPostParams {
            post_id: "t3_zzz999".to_string(),
        }))
        .await
        .err().expect("missing post");

    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
    assert_eq!(error_data(&err)["category"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn create_plot_single_point() {
    let Json(result) = server()
        .create_plot(Parameters(CreatePlotParams {
            data: vec![json!({"Symbol": "Apple Inc. (AAPL)", "Sentiment": 0.75, "Presence": 0.85})],
        }))
        .await
        .expect("plot");

    assert_eq!(result.markers, 1);
    assert_eq!(result.mime_type, "image/svg+xml");
    let legend: Vec<_> = result.legend.iter().map(|e| e.symbol.as_str()).collect();
    assert_eq!(legend, vec!["Apple Inc. (AAPL)"]);
    assert!(result.chart.starts_with("<svg"));
}

#[tokio::test]
async fn create_plot_empty_data_draws_axes() {
    let Json(result) = server()
        .create_plot(Parameters(CreatePlotParams { data: vec![] }))
        .await
        .expect("empty plot");

    assert_eq!(result.markers, 0);
    assert!(result.legend.is_empty());
    assert!(result.chart.contains("Sentiment"));
}

#[tokio::test]
async fn create_plot_names_first_offending_record() {
    let err = server()
        .create_plot(Parameters(CreatePlotParams {
            data: vec![
                json!({"Symbol": "X", "Sentiment": 1.5, "Presence": 0.5}),
                json!({"Symbol": "Y", "Sentiment": 0.0, "Presence": 7.0}),
            ],
        }))
        .await
        .err().expect("out of range");

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(error_data(&err)["index"], 0);
    assert_eq!(error_data(&err)["field"], "Sentiment");
    assert_eq!(error_data(&err)["code"], "VALIDATION_OUT_OF_RANGE");
}

#[tokio::test]
async fn create_plot_non_object_record_names_field() {
    let err = server()
        .create_plot(Parameters(CreatePlotParams {
            data: vec![
                json!({"Symbol": "X", "Sentiment": 0.1, "Presence": 0.5}),
                json!("Apple (AAPL)"),
            ],
        }))
        .await
        .err().expect("not an object");

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(error_data(&err)["index"], 1);
    assert_eq!(error_data(&err)["field"], "record");
    assert_eq!(error_data(&err)["code"], "VALIDATION_NOT_AN_OBJECT");
}

#[tokio::test]
async fn create_plot_render_failure_is_internal() {
    let reddit: &'static FakeReddit = Box::leak(Box::default());
    let server = StocksMcp::new(
        &config(),
        Arc::new(FakeConnector(reddit)),
        Arc::new(BrokenRenderer),
    );

    let err = server
        .create_plot(Parameters(CreatePlotParams {
            data: vec![json!({"Symbol": "X", "Sentiment": 0.1, "Presence": 0.5})],
        }))
        .await
        .err().expect("render failure");

    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert_eq!(error_data(&err)["category"], "RENDER");
}

#[tokio::test]
async fn prompt_asks_for_the_plan_first() {
    let messages = server().make_r_stocks_plot().await.expect("prompt");

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, PromptMessageRole::User);
    match &messages[0].content {
        PromptMessageContent::Text { text } => assert!(text.contains("make_stocks_plot_plan")),
        other => panic!("unexpected prompt content: {other:?}"),
    }
}

#[test]
fn server_info_advertises_tools_and_prompts() {
    let info = server().get_info();

    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.prompts.is_some());
    assert!(info.instructions.unwrap_or_default().contains("r/stocks"));
}
