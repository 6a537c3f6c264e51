pub mod twitter;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::GatewayError;

/// Maximum posts returned per timeline page.
pub const PAGE_SIZE: usize = 200;

/// A single fetched post. Ids are monotonically comparable: a larger id is a
/// more recent post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: u64,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// One account's fetched posts, newest-first. Ids are strictly decreasing
/// within `posts` (gateway contract); the report counting relies on this to
/// stop at the first post outside the window.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountTimeline {
    pub name: String,
    pub posts: Vec<Post>,
}

#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// Resolve a source account to the ids of the accounts it follows, in
    /// gateway-provided order.
    async fn followed_ids(&self, screen_name: &str) -> Result<Vec<u64>, GatewayError>;
}

#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Fetch one page of an account's timeline, newest-first: up to
    /// [`PAGE_SIZE`] posts strictly older than `cursor`, or the most recent
    /// posts when `cursor` is `None`.
    async fn fetch_page(
        &self,
        account_id: u64,
        cursor: Option<u64>,
    ) -> Result<Vec<Post>, GatewayError>;
}
