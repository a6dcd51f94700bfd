//! MCP surface of the r/Stocks sentiment server.

mod plan;
mod server;
mod service;
pub mod types;

pub use plan::{PLOT_PLAN, PLOT_PROMPT};
pub use server::StocksMcp;
pub use service::{PlotService, PostService, SubredditPosts};
