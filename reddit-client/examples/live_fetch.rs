//! Manual check against the live Reddit API.
//!
//! Reads REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET from the environment (or
//! `.env`), lists the newest r/stocks posts and fetches the first one.
//!
//! `cargo run -p reddit-client --example live_fetch`

use reddit_client::{HttpRedditConnector, PostId, RedditConnector, RedditOAuth2Config};
use stocks_core::{AppConfig, CoreError, ErrorExt};

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter("reddit_client=debug")
        .init();
    dotenvy::dotenv().ok();

    let config = AppConfig::load(None)?;
    let connector = HttpRedditConnector::new(RedditOAuth2Config::from_app_config(&config))?;

    let session = match connector.connect().await {
        Ok(session) => session,
        Err(e) => {
            println!("❌ {}", e.user_friendly_message());
            return Err(e);
        }
    };

    let listing = session.list_newest(&config.subreddit, 5).await?;
    println!(
        "✅ {} posts from r/{} ({} skipped)",
        listing.posts.len(),
        config.subreddit,
        listing.skipped
    );
    for post in &listing.posts {
        println!("  [{}] {} ({} comments)", post.id, post.title, post.num_comments);
    }

    if let Some(first) = listing.posts.first() {
        let post_id = PostId::parse(&first.permalink)?;
        let detail = session.get_post(&post_id, 5).await?;
        println!(
            "\n📄 {} by {} - upvote ratio {:?}",
            detail.summary.title, detail.summary.author, detail.upvote_ratio
        );
        for comment in &detail.comments {
            println!("  {} ({}): {}", comment.author, comment.score, comment.body);
        }
    }

    Ok(())
}
