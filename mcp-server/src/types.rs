use plot_renderer::LegendEntry;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stocks_core::{PostDetail, PostSummary, SentimentPoint};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlotPlanResponse {
    /// Step-by-step workflow for producing the sentiment plot.
    pub plan: String,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FetchPostsParams {
    /// Number of posts to return (1 to 100, default 25). Larger values are capped at 100.
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchPostsResponse {
    pub subreddit: String,
    /// Newest posts first.
    pub posts: Vec<PostSummary>,
    /// Listing entries that could not be decoded and were left out.
    pub skipped: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FetchPostParams {
    /// Post id (e.g. '1a2b3c4' or 't3_1a2b3c4') or a full Reddit post URL.
    pub post_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchPostResponse {
    pub post: PostDetail,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreatePlotParams {
    /// One record per stock, see make_stocks_plot_plan for the exact keys and ranges.
    #[schemars(with = "Vec<SentimentPoint>")]
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreatePlotResponse {
    /// Standalone chart document.
    pub chart: String,
    pub mime_type: String,
    /// Number of plotted markers.
    pub markers: usize,
    /// Distinct symbols with their colors, in first-appearance order.
    pub legend: Vec<LegendEntry>,
}
