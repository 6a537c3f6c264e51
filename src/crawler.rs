//! Per-account timeline crawling.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::gateway::{Post, TimelineSource};
use crate::window::WindowBoundary;

/// Fixed cooldowns for the two recoverable gateway signals.
///
/// Retries are unbounded and always reissue the identical request (same
/// cursor), so a page is never skipped or fetched twice across a retry. There
/// is deliberately no exponential growth.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub rate_limit_cooldown: Duration,
    pub transient_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limit_cooldown: Duration::from_secs(15 * 60),
            transient_cooldown: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Zero-delay policy for tests.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            rate_limit_cooldown: Duration::ZERO,
            transient_cooldown: Duration::ZERO,
        }
    }

    fn cooldown(&self, err: &GatewayError) -> Option<Duration> {
        match err {
            GatewayError::RateLimited => Some(self.rate_limit_cooldown),
            GatewayError::Transient => Some(self.transient_cooldown),
            _ => None,
        }
    }
}

/// What one account's crawl produced: its posts, newest-first, and the final
/// pagination cursor (`None` when no page ever returned a post).
#[derive(Debug, Clone, Default)]
pub struct Crawl {
    pub posts: Vec<Post>,
    pub final_cursor: Option<u64>,
}

pub struct Crawler<T> {
    source: T,
    retry: RetryPolicy,
    early_exit: bool,
}

impl<T: TimelineSource> Crawler<T> {
    pub fn new(source: T) -> Self {
        Self {
            source,
            retry: RetryPolicy::default(),
            early_exit: true,
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Disable the below-boundary early exit. Final counts are identical
    /// either way; the exit only saves gateway requests on posts the report
    /// would clip anyway.
    #[must_use]
    pub fn without_early_exit(mut self) -> Self {
        self.early_exit = false;
        self
    }

    /// Drive paginated retrieval for one account until its timeline is
    /// exhausted or the cursor falls behind the shared window boundary.
    pub async fn crawl(
        &self,
        account_id: u64,
        boundary: &WindowBoundary,
    ) -> Result<Crawl, GatewayError> {
        let mut posts: Vec<Post> = Vec::new();
        let mut cursor: Option<u64> = None;

        loop {
            let page = self.fetch_page_retrying(account_id, cursor).await?;

            // Exhausted: nothing left, or the gateway echoed back only the
            // cursor post (no forward progress).
            if page.is_empty() || (page.len() == 1 && Some(page[0].id) == cursor) {
                break;
            }

            cursor = page.last().map(|post| post.id);
            posts.extend(page);

            debug!(
                account = posts[0].author.as_str(),
                fetched = posts.len(),
                cursor = ?cursor,
                "fetched timeline page"
            );

            if self.early_exit {
                if let (Some(cursor), Some(bound)) = (cursor, boundary.id()) {
                    if cursor < bound {
                        // Older than the shared window already; the report
                        // clips everything below the boundary.
                        break;
                    }
                }
            }
        }

        Ok(Crawl {
            posts,
            final_cursor: cursor,
        })
    }

    async fn fetch_page_retrying(
        &self,
        account_id: u64,
        cursor: Option<u64>,
    ) -> Result<Vec<Post>, GatewayError> {
        loop {
            match self.source.fetch_page(account_id, cursor).await {
                Ok(page) => return Ok(page),
                Err(err) => match self.retry.cooldown(&err) {
                    Some(delay) => {
                        warn!(
                            account_id,
                            error = %err,
                            cooldown_secs = delay.as_secs(),
                            "recoverable gateway error, retrying same page"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(err),
                },
            }
        }
    }
}
