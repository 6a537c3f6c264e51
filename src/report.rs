//! Window counting, ranking and report rendering.

use std::fmt;

use crate::gateway::{AccountTimeline, Post};
use crate::window::WindowBoundary;

/// One line of the final report.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCount {
    pub name: String,
    pub count: usize,
    pub percent: f64,
}

impl fmt::Display for RankedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:5.2}% {:4}: {}", self.percent, self.count, self.name)
    }
}

/// Count the leading posts at or after the boundary.
///
/// Timelines are newest-first with strictly decreasing ids, so counting stops
/// at the first post older than the boundary instead of scanning the whole
/// slice. An unbounded window counts everything.
fn window_count(posts: &[Post], boundary: &WindowBoundary) -> usize {
    match boundary.id() {
        Some(bound) => posts.iter().take_while(|post| post.id >= bound).count(),
        None => posts.len(),
    }
}

/// Rank all timelines against the final boundary: per-account window counts
/// and each account's percentage of the grand total, sorted by count
/// descending. The sort is stable, so tied accounts keep their gateway order.
pub fn rank(timelines: &[AccountTimeline], boundary: &WindowBoundary) -> Vec<RankedCount> {
    let counts: Vec<(&AccountTimeline, usize)> = timelines
        .iter()
        .map(|timeline| (timeline, window_count(&timeline.posts, boundary)))
        .collect();
    let total: usize = counts.iter().map(|(_, count)| count).sum();

    let mut ranked: Vec<RankedCount> = counts
        .into_iter()
        .map(|(timeline, count)| RankedCount {
            name: timeline.name.clone(),
            count,
            percent: if total == 0 {
                0.0
            } else {
                100.0 * count as f64 / total as f64
            },
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Crawl;
    use chrono::Utc;

    fn post(id: u64) -> Post {
        Post {
            id,
            author: "someone".into(),
            created_at: Utc::now(),
        }
    }

    fn timeline(name: &str, ids: &[u64]) -> AccountTimeline {
        AccountTimeline {
            name: name.into(),
            posts: ids.iter().copied().map(post).collect(),
        }
    }

    fn boundary_at(id: u64) -> WindowBoundary {
        let mut boundary = WindowBoundary::default();
        let posts: Vec<Post> = (id..id + 1100).rev().map(post).collect();
        boundary.observe(&Crawl {
            posts,
            final_cursor: Some(id),
        });
        assert_eq!(boundary.id(), Some(id));
        boundary
    }

    #[test]
    fn test_short_circuit_count_matches_enumeration() {
        let bound = 40;
        let boundary = boundary_at(bound);
        let cases: [&[u64]; 5] = [
            &[],
            &[100, 90, 80],
            &[100, 41, 40, 39, 5],
            &[39, 20, 10],
            &[40],
        ];
        for ids in cases {
            let enumerated = ids.iter().filter(|id| **id >= bound).count();
            let posts: Vec<Post> = ids.iter().copied().map(post).collect();
            assert_eq!(window_count(&posts, &boundary), enumerated, "ids {ids:?}");
        }
    }

    #[test]
    fn test_unbounded_window_counts_everything() {
        let posts: Vec<Post> = [30u64, 20, 10].iter().copied().map(post).collect();
        assert_eq!(window_count(&posts, &WindowBoundary::default()), 3);
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let timelines = [
            timeline("a", &[106, 105, 104, 103, 102, 101, 100]),
            timeline("b", &[110, 109]),
            timeline("c", &[120]),
        ];
        let ranked = rank(&timelines, &boundary_at(100));
        let sum: f64 = ranked.iter().map(|entry| entry.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_reports_zero_percentages() {
        let timelines = [timeline("a", &[30, 20]), timeline("b", &[10])];
        let ranked = rank(&timelines, &boundary_at(1000));
        assert!(ranked.iter().all(|entry| entry.count == 0));
        assert!(ranked.iter().all(|entry| entry.percent == 0.0));
    }

    #[test]
    fn test_sorted_by_count_descending() {
        let timelines = [
            timeline("low", &[103, 102]),
            timeline("high", &[110, 109, 108, 107]),
            timeline("mid", &[120, 119, 118]),
        ];
        let ranked = rank(&timelines, &boundary_at(100));
        let names: Vec<&str> = ranked.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_ties_keep_gateway_order() {
        let timelines = [
            timeline("first", &[102, 101]),
            timeline("second", &[202, 201]),
            timeline("third", &[302, 301, 300]),
        ];
        let ranked = rank(&timelines, &boundary_at(100));
        let names: Vec<&str> = ranked.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["third", "first", "second"]);
    }

    #[test]
    fn test_report_line_format() {
        let entry = RankedCount {
            name: "someone".into(),
            count: 42,
            percent: 3.5,
        };
        assert_eq!(entry.to_string(), " 3.50%   42: someone");
    }
}
