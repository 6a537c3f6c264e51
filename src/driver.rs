//! Sequential orchestration: follow list, per-account crawls, boundary
//! tracking, final ranking.

use tracing::info;

use crate::crawler::Crawler;
use crate::error::GatewayError;
use crate::gateway::{AccountTimeline, SocialGraph, TimelineSource};
use crate::report::{self, RankedCount};
use crate::window::WindowBoundary;

/// Resolve the follow list once, crawl each followed account strictly in
/// order, and rank everyone against the final window boundary.
///
/// Accounts crawled before the boundary settles are not re-fetched; the final
/// counting pass clips them instead. A fatal gateway error anywhere aborts
/// with no report.
pub async fn run<G, T>(
    graph: &G,
    crawler: &Crawler<T>,
    source_account: &str,
) -> Result<Vec<RankedCount>, GatewayError>
where
    G: SocialGraph,
    T: TimelineSource,
{
    let accounts = graph.followed_ids(source_account).await?;
    info!(
        source = source_account,
        count = accounts.len(),
        "resolved follow list"
    );

    let mut boundary = WindowBoundary::default();
    let mut timelines: Vec<AccountTimeline> = Vec::new();

    for (index, account_id) in accounts.iter().copied().enumerate() {
        let crawl = crawler.crawl(account_id, &boundary).await?;
        boundary.observe(&crawl);

        let name = crawl.posts.first().map(|post| post.author.clone());
        info!(
            progress = index + 1,
            total = accounts.len(),
            account = name.as_deref().unwrap_or("(no posts)"),
            posts = crawl.posts.len(),
            final_cursor = ?crawl.final_cursor,
            boundary = ?boundary.id(),
            "account crawled"
        );

        // The follow list is identifier-only; a display name only becomes
        // known from a fetched post. Nothing fetched, nothing to rank.
        if let Some(name) = name {
            timelines.push(AccountTimeline {
                name,
                posts: crawl.posts,
            });
        }
    }

    Ok(report::rank(&timelines, &boundary))
}
