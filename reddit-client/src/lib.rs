pub mod api;
pub mod auth;
pub mod post_ref;
pub mod session;

#[cfg(test)]
mod tests;

pub use api::{NewestPosts, RedditApiClient};
pub use auth::{AppOnlyAuthenticator, RedditOAuth2Config, RedditToken};
pub use post_ref::PostId;
pub use session::{HttpRedditConnector, PostSource, RedditConnector};
