//! The shared counting cutoff across all crawled accounts.

use crate::crawler::Crawl;
use crate::gateway::Post;

/// An account must have fetched strictly more than this many posts before it
/// may raise the boundary. Shorter histories do not meaningfully constrain
/// the shared window.
pub const MIN_QUALIFYING_POSTS: usize = 1000;

/// The most recent point at which some high-volume account's retrievable
/// history ran out. Every account's count is clipped there, so differing
/// per-account depth limits stay comparable. `None` means unbounded: no
/// account has qualified yet.
#[derive(Debug, Clone, Default)]
pub struct WindowBoundary {
    post: Option<Post>,
}

impl WindowBoundary {
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.post.as_ref().map(|post| post.id)
    }

    #[must_use]
    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    /// Offer a finished crawl. Raises the boundary (and returns true) when
    /// the account qualifies and its final cursor is newer than the current
    /// boundary. The boundary never moves backward: accounts arrive in
    /// arbitrary gateway order, and a later, less-constraining account must
    /// not undo earlier truncation decisions.
    pub fn observe(&mut self, crawl: &Crawl) -> bool {
        if crawl.posts.len() <= MIN_QUALIFYING_POSTS {
            return false;
        }
        let Some(final_cursor) = crawl.final_cursor else {
            return false;
        };

        let raises = match self.id() {
            Some(current) => final_cursor > current,
            None => true,
        };
        if raises {
            self.post = crawl.posts.last().cloned();
        }
        raises
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// A crawl of `len` posts whose oldest retained post has id
    /// `final_cursor`, ids strictly decreasing.
    fn crawl(len: usize, final_cursor: u64) -> Crawl {
        let newest = final_cursor + len as u64 - 1;
        let posts = (final_cursor..=newest)
            .rev()
            .map(|id| Post {
                id,
                author: "someone".into(),
                created_at: Utc::now(),
            })
            .collect();
        Crawl {
            posts,
            final_cursor: Some(final_cursor),
        }
    }

    #[test]
    fn test_first_qualifying_account_sets_boundary() {
        let mut boundary = WindowBoundary::default();
        assert!(boundary.observe(&crawl(1500, 100)));
        assert_eq!(boundary.id(), Some(100));
        assert_eq!(boundary.post().unwrap().id, 100);
    }

    #[test]
    fn test_exactly_1000_posts_never_raises() {
        let mut boundary = WindowBoundary::default();
        assert!(!boundary.observe(&crawl(1000, 500)));
        assert_eq!(boundary.id(), None);
    }

    #[test]
    fn test_1001_posts_with_higher_cursor_raises() {
        let mut boundary = WindowBoundary::default();
        boundary.observe(&crawl(1500, 100));
        assert!(boundary.observe(&crawl(1001, 200)));
        assert_eq!(boundary.id(), Some(200));
    }

    #[test]
    fn test_boundary_never_moves_backward() {
        let mut boundary = WindowBoundary::default();
        boundary.observe(&crawl(1500, 300));
        assert!(!boundary.observe(&crawl(2000, 150)));
        assert_eq!(boundary.id(), Some(300));
    }

    #[test]
    fn test_monotone_under_any_processing_order() {
        let cursors = [400u64, 100, 900, 250, 600];
        // Forward, reverse, and an interleaved order all end at the same
        // place, and the boundary id never decreases along the way.
        for order in [[0usize, 1, 2, 3, 4], [4, 3, 2, 1, 0], [2, 0, 4, 1, 3]] {
            let mut boundary = WindowBoundary::default();
            let mut last = 0;
            for i in order {
                boundary.observe(&crawl(1200, cursors[i]));
                let current = boundary.id().unwrap();
                assert!(current >= last);
                last = current;
            }
            assert_eq!(boundary.id(), Some(900));
        }
    }

    #[test]
    fn test_empty_crawl_is_ignored() {
        let mut boundary = WindowBoundary::default();
        assert!(!boundary.observe(&Crawl::default()));
        assert_eq!(boundary.id(), None);
    }
}
