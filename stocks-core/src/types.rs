use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One post of the community listing, normalized from Reddit's `t3` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PostSummary {
    /// Base36 post id without the `t3_` prefix.
    pub id: String,
    pub title: String,
    /// Author name, `[deleted]` when the account is gone.
    pub author: String,
    pub score: i64,
    pub num_comments: u64,
    #[schemars(with = "String")]
    pub created_utc: DateTime<Utc>,
    /// Link target of the post; equals the permalink for self posts.
    pub url: String,
    /// Absolute link to the discussion page.
    pub permalink: String,
    /// Body text, empty for link posts.
    pub selftext: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    #[schemars(with = "String")]
    pub created_utc: DateTime<Utc>,
}

/// A post together with its top-level comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub subreddit: String,
    /// Share of upvotes in `[0, 1]`, when Reddit reports it.
    pub upvote_ratio: Option<f64>,
    pub comments: Vec<Comment>,
}

impl PostDetail {
    pub fn id(&self) -> &str {
        &self.summary.id
    }
}

/// Reference to a post where a stock was mentioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PostLink {
    /// Absolute http(s) URL of the post.
    pub url: String,
    /// Human-readable title, 1 to 200 characters.
    pub title: String,
}

/// One plotted stock as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SentimentPoint {
    /// Stock name with ticker in parentheses, e.g. "Apple Inc. (AAPL)".
    #[serde(rename = "Symbol", alias = "symbol")]
    pub symbol: String,
    /// Polarity of the mentions in [-1.0, 1.0]; 0.0 is neutral.
    #[serde(rename = "Sentiment", alias = "sentiment")]
    pub sentiment: f64,
    /// Relative mention frequency in [0.0, 1.0]; 1.0 means it appears in nearly every post.
    #[serde(rename = "Presence", alias = "presence")]
    pub presence: f64,
    /// Short reasoning behind the sentiment and presence values, at most 2000 characters.
    #[serde(
        rename = "Summary",
        alias = "summary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    /// Posts where the stock was mentioned.
    #[serde(
        rename = "Links",
        alias = "links",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub links: Vec<PostLink>,
}

impl SentimentPoint {
    pub fn new(symbol: impl Into<String>, sentiment: f64, presence: f64) -> Self {
        Self {
            symbol: symbol.into(),
            sentiment,
            presence,
            summary: None,
            links: Vec::new(),
        }
    }
}
