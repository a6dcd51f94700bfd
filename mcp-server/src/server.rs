use std::sync::Arc;

use plot_renderer::ChartRenderer;
use reddit_client::RedditConnector;
use rmcp::handler::server::router::prompt::PromptRouter;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{
    GetPromptRequestParams, GetPromptResult, ListPromptsResult, PaginatedRequestParams,
    PromptMessage, PromptMessageRole, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::RoleServer;
use rmcp::{
    prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router, ErrorData,
    ServerHandler, ServiceExt,
};
use serde_json::json;
use stocks_core::{AppConfig, CoreError, ErrorCategory, ErrorExt, ErrorReporter};

use crate::plan::{PLOT_PLAN, PLOT_PROMPT};
use crate::service::{PlotService, PostService};
use crate::types::*;

#[derive(Clone)]
pub struct StocksMcp {
    posts: Arc<PostService>,
    plots: Arc<PlotService>,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

#[tool_router]
impl StocksMcp {
    pub fn new(
        config: &AppConfig,
        connector: Arc<dyn RedditConnector>,
        renderer: Arc<dyn ChartRenderer>,
    ) -> Self {
        Self {
            posts: Arc::new(PostService::new(config, connector)),
            plots: Arc::new(PlotService::new(renderer)),
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// Returns the exact plan for building the r/Stocks sentiment plot. Always call this
    /// before create_plot.
    #[tool(name = "make_stocks_plot_plan")]
    async fn make_stocks_plot_plan(&self) -> Result<Json<PlotPlanResponse>, ErrorData> {
        Ok(Json(PlotPlanResponse {
            plan: PLOT_PLAN.to_string(),
        }))
    }

    /// Fetches the newest posts of the configured stocks subreddit, newest first.
    #[tool(name = "fetch_stocks_subreddit_posts")]
    async fn fetch_stocks_subreddit_posts(
        &self,
        params: Parameters<FetchPostsParams>,
    ) -> Result<Json<FetchPostsResponse>, ErrorData> {
        let FetchPostsParams { limit } = params.0;
        let listing = self.posts.newest_posts(limit).await.map_err(to_error_data)?;

        Ok(Json(FetchPostsResponse {
            subreddit: listing.subreddit,
            posts: listing.posts,
            skipped: listing.skipped,
        }))
    }

    /// Fetches one Reddit post by id or URL, with score, upvote ratio, comment count and
    /// its top comments.
    #[tool(name = "fetch_single_reddit_post")]
    async fn fetch_single_reddit_post(
        &self,
        params: Parameters<FetchPostParams>,
    ) -> Result<Json<FetchPostResponse>, ErrorData> {
        let FetchPostParams { post_id } = params.0;
        let post = self
            .posts
            .single_post(&post_id)
            .await
            .map_err(to_error_data)?;

        Ok(Json(FetchPostResponse { post }))
    }

    /// Renders the sentiment data as a scatter chart (x = sentiment, y = presence). Call
    /// make_stocks_plot_plan first to get the exact record format.
    #[tool(name = "create_plot")]
    async fn create_plot(
        &self,
        params: Parameters<CreatePlotParams>,
    ) -> Result<Json<CreatePlotResponse>, ErrorData> {
        let CreatePlotParams { data } = params.0;
        let chart = self.plots.create_plot(&data).map_err(to_error_data)?;

        Ok(Json(CreatePlotResponse {
            chart: chart.document,
            mime_type: chart.mime_type.to_string(),
            markers: chart.markers,
            legend: chart.legend,
        }))
    }
}

#[prompt_router]
impl StocksMcp {
    /// Asks for a sentiment plot of r/Stocks, starting from make_stocks_plot_plan.
    #[prompt(name = "make_r_stocks_plot")]
    async fn make_r_stocks_plot(&self) -> Result<Vec<PromptMessage>, ErrorData> {
        Ok(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            PLOT_PROMPT,
        )])
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for StocksMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(format!(
                "Sentiment of stock discussions on r/{} (tools: make_stocks_plot_plan, fetch_stocks_subreddit_posts, fetch_single_reddit_post, create_plot; prompt: make_r_stocks_plot). Start with make_stocks_plot_plan.",
                self.posts.subreddit()
            )),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }
}

/// Turns a failed call into a tool error carrying the category, code and,
/// for bad records, the record index and field.
fn to_error_data(err: CoreError) -> ErrorData {
    ErrorReporter::new().report(&err);

    let category = err.category();
    let mut data = json!({
        "category": category,
        "code": err.error_code(),
        "retryable": err.is_retryable(),
    });
    if let CoreError::Validation(validation) = &err {
        if let Some(index) = validation.index() {
            data["index"] = json!(index);
        }
        if let Some(field) = validation.field() {
            data["field"] = json!(field);
        }
    }

    let message = err.user_friendly_message();
    match category {
        ErrorCategory::InputValidation => ErrorData::invalid_params(message, Some(data)),
        ErrorCategory::PostNotFound => ErrorData::resource_not_found(message, Some(data)),
        _ => ErrorData::internal_error(message, Some(data)),
    }
}

#[cfg(test)]
mod tests;
