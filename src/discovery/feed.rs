//! Feed ranking
//!
//! Explore feed: global engagement ranking over the recent post window,
//! excluding accounts the caller already follows (their content reaches the
//! home timeline through other paths).
//!
//! Interest feed: recency-first ranking over posts sharing a hashtag with the
//! caller's recent engagement history. A caller with no engagement signal
//! falls back to the explore feed wholesale; same output type, same ordering.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::HashSet;

use crate::config::DiscoveryConfig;
use crate::error::{Error, Result};

use super::graph::exclusion_set;
use super::model::{FeedPost, Post, PostId, UserId};
use super::store::GraphStore;

/// Candidate sets below this size are scored inline; larger ones go through
/// rayon on a blocking thread so the scoring pass stays off the runtime.
pub(crate) const PARALLEL_SCORING_THRESHOLD: usize = 512;

/// Engagement score used by the explore feed: comments weigh more than raw
/// interactions.
pub(crate) fn engagement_score(post: &Post) -> i64 {
    post.interaction_count * 2 + post.comment_count * 3
}

fn to_feed_post(post: Post) -> FeedPost {
    FeedPost {
        score: engagement_score(&post),
        matched_interests: 0,
        post,
    }
}

/// Score and rank explore candidates: score descending, newest first on ties,
/// id ascending as the final tie-break.
pub(crate) fn rank_explore(posts: Vec<Post>, limit: usize) -> Vec<FeedPost> {
    let mut scored: Vec<FeedPost> = if posts.len() >= PARALLEL_SCORING_THRESHOLD {
        posts.into_par_iter().map(to_feed_post).collect()
    } else {
        posts.into_iter().map(to_feed_post).collect()
    };

    scored.sort_unstable_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.post.created_at.cmp(&a.post.created_at))
            .then_with(|| a.post.id.cmp(&b.post.id))
    });
    scored.truncate(limit);
    scored
}

pub(crate) async fn explore_feed<S: GraphStore>(
    store: &S,
    config: &DiscoveryConfig,
    user: UserId,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<FeedPost>> {
    let excluded = exclusion_set(store, user).await?;
    let posts = store.posts_since(now - config.feed_window).await?;

    let candidates: Vec<Post> = posts
        .into_iter()
        .filter(|p| !excluded.contains(&p.author_id))
        .collect();

    if candidates.len() >= PARALLEL_SCORING_THRESHOLD {
        tokio::task::spawn_blocking(move || rank_explore(candidates, limit))
            .await
            .map_err(|e| Error::Other(anyhow::Error::new(e)))
    } else {
        Ok(rank_explore(candidates, limit))
    }
}

/// Hashtags attached to the posts behind the caller's most recent
/// interactions. Empty when the caller has no engagement history.
pub(crate) async fn engaged_tags<S: GraphStore>(
    store: &S,
    config: &DiscoveryConfig,
    user: UserId,
) -> Result<HashSet<String>> {
    let interactions = store
        .interactions_by_user(user, config.interaction_sample)
        .await?;

    let mut seen: HashSet<PostId> = HashSet::new();
    let mut post_ids: Vec<PostId> = Vec::new();
    for interaction in &interactions {
        if seen.insert(interaction.post_id) {
            post_ids.push(interaction.post_id);
        }
    }
    if post_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let posts = store.posts_by_ids(&post_ids).await?;
    Ok(posts.into_iter().flat_map(|p| p.hashtags).collect())
}

pub(crate) async fn interest_feed<S: GraphStore>(
    store: &S,
    config: &DiscoveryConfig,
    user: UserId,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<FeedPost>> {
    let tags = engaged_tags(store, config, user).await?;
    if tags.is_empty() {
        // No signal to personalize on; the explore feed is the documented
        // fallback, not an error.
        return explore_feed(store, config, user, now, limit).await;
    }

    let posts = store.posts_since(now - config.feed_window).await?;

    let mut matched: Vec<FeedPost> = posts
        .into_iter()
        .filter(|p| p.author_id != user)
        .filter_map(|post| {
            let overlap = post.hashtags.iter().filter(|t| tags.contains(*t)).count();
            (overlap > 0).then(|| FeedPost {
                score: engagement_score(&post),
                matched_interests: overlap,
                post,
            })
        })
        .collect();

    // Recency-first, unlike the explore feed's score-first ordering.
    matched.sort_unstable_by(|a, b| {
        b.post
            .created_at
            .cmp(&a.post.created_at)
            .then_with(|| a.post.id.cmp(&b.post.id))
    });
    matched.truncate(limit);
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn post(n: u128, interactions: i64, comments: i64) -> Post {
        Post {
            id: Uuid::from_u128(n),
            author_id: Uuid::from_u128(1000),
            created_at: Utc::now(),
            hashtags: Vec::new(),
            interaction_count: interactions,
            comment_count: comments,
        }
    }

    #[test]
    fn test_engagement_score_weights() {
        // 5 interactions + 3 comments -> 19; 10 interactions -> 20.
        assert_eq!(engagement_score(&post(1, 5, 3)), 19);
        assert_eq!(engagement_score(&post(2, 10, 0)), 20);
    }

    #[test]
    fn test_rank_explore_orders_by_score() {
        let ranked = rank_explore(vec![post(1, 5, 3), post(2, 10, 0)], 10);
        assert_eq!(ranked[0].post.id, Uuid::from_u128(2));
        assert_eq!(ranked[0].score, 20);
        assert_eq!(ranked[1].score, 19);
    }

    #[test]
    fn test_rank_explore_ties_break_on_recency_then_id() {
        let now = Utc::now();
        let mut older = post(1, 5, 0);
        older.created_at = now - chrono::Duration::hours(2);
        let mut newer = post(2, 5, 0);
        newer.created_at = now;
        let mut twin = post(3, 5, 0);
        twin.created_at = now;

        let ranked = rank_explore(vec![older, twin, newer], 10);
        let ids: Vec<u128> = ranked.iter().map(|f| f.post.id.as_u128()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_rank_explore_truncates() {
        let ranked = rank_explore(vec![post(1, 1, 0), post(2, 2, 0), post(3, 3, 0)], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].post.id, Uuid::from_u128(3));
    }
}
