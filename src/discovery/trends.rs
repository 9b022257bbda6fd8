//! Hashtag trend detection
//!
//! Two global outputs (static popularity, burst detection) plus the
//! location-scoped engagement aggregation. All three recompute from the
//! snapshot on every call; at higher traffic an external materialized view
//! in front of the windowed post scans is the expected operational answer,
//! not a cache inside this module.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::config::DiscoveryConfig;
use crate::error::Result;

use super::model::{BurstingTag, LocalTrend, Post, TrendingTag, UserId};
use super::store::GraphStore;

/// Shown when the hashtag registry is empty, so a fresh deployment renders a
/// populated trending panel instead of a blank one.
pub(crate) const DEFAULT_TRENDING_TAGS: &[&str] =
    &["welcome", "introductions", "community", "events", "marketplace"];

pub(crate) fn default_trending(limit: usize) -> Vec<TrendingTag> {
    DEFAULT_TRENDING_TAGS
        .iter()
        .take(limit)
        .map(|tag| TrendingTag {
            tag: (*tag).to_string(),
            post_count: 0,
        })
        .collect()
}

/// Static popularity: the registry ranked by denormalized post count.
pub(crate) async fn trending_hashtags<S: GraphStore>(
    store: &S,
    limit: usize,
) -> Result<Vec<TrendingTag>> {
    let registry = store.hashtags_by_post_count(limit).await?;
    if registry.is_empty() {
        return Ok(default_trending(limit));
    }

    let mut ranked: Vec<TrendingTag> = registry
        .into_iter()
        .map(|h| TrendingTag {
            tag: h.tag,
            post_count: h.post_count,
        })
        .collect();
    // The store contract already ranks; re-impose the tie-break here so the
    // ordering does not depend on any one implementation.
    ranked.sort_by(|a, b| b.post_count.cmp(&a.post_count).then_with(|| a.tag.cmp(&b.tag)));
    Ok(ranked)
}

/// Velocity of one tag: recent count against the baseline hourly rate.
///
/// With no recent occurrences the velocity is zero regardless of baseline.
/// With recent occurrences but no baseline there is nothing to normalize
/// against, so the count is scaled by the configured cold-start multiplier.
pub(crate) fn burst_velocity(
    recent: usize,
    baseline: usize,
    baseline_hours: f64,
    cold_start_multiplier: f64,
) -> f64 {
    if recent == 0 {
        return 0.0;
    }
    let hourly_rate = baseline as f64 / baseline_hours;
    if hourly_rate > 0.0 {
        recent as f64 / hourly_rate
    } else {
        recent as f64 * cold_start_multiplier
    }
}

/// Per-tag (recent, baseline) occurrence counts over the two burst windows:
/// recent = (now - recent_window, now], baseline = the remainder of the
/// baseline window.
pub(crate) fn window_counts(
    posts: &[Post],
    now: DateTime<Utc>,
    config: &DiscoveryConfig,
) -> HashMap<String, (usize, usize)> {
    let recent_cutoff = now - config.recent_window;
    let baseline_cutoff = now - config.baseline_window;

    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for post in posts {
        if post.created_at <= baseline_cutoff {
            continue;
        }
        let is_recent = post.created_at > recent_cutoff;
        for tag in &post.hashtags {
            let entry = counts.entry(tag.clone()).or_insert((0, 0));
            if is_recent {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
    }
    counts
}

/// Burst detection: tags whose recent rate exceeds the configured multiple of
/// their baseline rate, ranked by velocity.
pub(crate) async fn detect_bursting<S: GraphStore>(
    store: &S,
    config: &DiscoveryConfig,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<BurstingTag>> {
    let posts = store.posts_since(now - config.baseline_window).await?;
    let counts = window_counts(&posts, now, config);
    let baseline_hours = config.baseline_hours();

    let mut bursting: Vec<BurstingTag> = counts
        .into_iter()
        .filter_map(|(tag, (recent, baseline))| {
            let velocity = burst_velocity(
                recent,
                baseline,
                baseline_hours,
                config.cold_start_multiplier,
            );
            (velocity > config.burst_threshold).then_some(BurstingTag {
                tag,
                velocity,
                recent_count: recent,
                baseline_count: baseline,
            })
        })
        .collect();

    bursting.sort_by(|a, b| {
        b.velocity
            .partial_cmp(&a.velocity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.tag.cmp(&b.tag))
    });
    bursting.truncate(limit);
    Ok(bursting)
}

/// Location-scoped trends: engagement-weighted hashtag totals over posts by
/// local authors within the baseline window. A blank location yields an empty
/// result; geographic trends have no meaning without one.
pub(crate) async fn local_trends<S: GraphStore>(
    store: &S,
    config: &DiscoveryConfig,
    location: &str,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<LocalTrend>> {
    let location = location.trim();
    if location.is_empty() {
        return Ok(Vec::new());
    }

    let locals = store.users_by_location(location).await?;
    if locals.is_empty() {
        return Ok(Vec::new());
    }

    let author_ids: Vec<UserId> = locals.iter().map(|u| u.id).collect();
    let posts = store
        .posts_by_authors(&author_ids, Some(now - config.baseline_window))
        .await?;

    let mut totals: HashMap<String, i64> = HashMap::new();
    for post in &posts {
        let engagement = post.interaction_count + post.comment_count;
        for tag in &post.hashtags {
            *totals.entry(tag.clone()).or_insert(0) += engagement;
        }
    }

    let mut trends: Vec<LocalTrend> = totals
        .into_iter()
        .map(|(tag, engagement)| LocalTrend { tag, engagement })
        .collect();
    trends.sort_by(|a, b| {
        b.engagement
            .cmp(&a.engagement)
            .then_with(|| a.tag.cmp(&b.tag))
    });
    trends.truncate(limit);
    Ok(trends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_burst_velocity_against_baseline() {
        // 10 recent, 2 across the prior 23 hours: rate 2/23, velocity 115.
        let velocity = burst_velocity(10, 2, 23.0, 10.0);
        assert!((velocity - 115.0).abs() < 1e-9);
        assert!(velocity > 2.0);
    }

    #[test]
    fn test_burst_velocity_zero_recent_is_never_bursting() {
        assert_eq!(burst_velocity(0, 40, 23.0, 10.0), 0.0);
    }

    #[test]
    fn test_burst_velocity_cold_start() {
        let velocity = burst_velocity(3, 0, 23.0, 10.0);
        assert!((velocity - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_counts_split_on_boundaries() {
        let config = DiscoveryConfig::default();
        let now = Utc::now();

        let post = |minutes_ago: i64, tag: &str| Post {
            id: Uuid::new_v4(),
            author_id: Uuid::from_u128(1),
            created_at: now - chrono::Duration::minutes(minutes_ago),
            hashtags: vec![tag.to_string()],
            interaction_count: 0,
            comment_count: 0,
        };

        let posts = vec![
            post(10, "paris"),        // recent
            post(30, "paris"),        // recent
            post(120, "paris"),       // baseline
            post(23 * 60, "paris"),   // baseline
            post(25 * 60, "expired"), // outside both windows
        ];

        let counts = window_counts(&posts, now, &config);
        assert_eq!(counts.get("paris"), Some(&(2, 2)));
        assert!(!counts.contains_key("expired"));
    }

    #[test]
    fn test_default_trending_respects_limit() {
        assert_eq!(default_trending(2).len(), 2);
        assert_eq!(default_trending(50).len(), DEFAULT_TRENDING_TAGS.len());
    }
}
