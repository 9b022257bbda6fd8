//! Data model for the discovery engine
//!
//! Read-only views over the social graph (users, follow edges), the content
//! graph (posts, hashtags) and the engagement log (interactions), plus the
//! result types the recommenders hand to the feed-assembly layer.
//!
//! Every entity here is immutable for the duration of one computation: the
//! engine never creates, mutates or destroys graph state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a user account
pub type UserId = Uuid;
/// Identifier for a post
pub type PostId = Uuid;

/// A platform account as the discovery engine sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Free-form city/region label; empty and missing are equivalent
    pub location: Option<String>,
    /// Role label ("member", "agent", "creator", ...)
    pub role: String,
    /// Platform reputation, non-negative
    pub reputation: i64,
}

/// A post with its denormalized engagement counters and attached hashtags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub hashtags: Vec<String>,
    pub interaction_count: i64,
    pub comment_count: i64,
}

/// A hashtag registry entry with its denormalized post count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hashtag {
    pub tag: String,
    pub post_count: i64,
}

/// Interaction types the engagement log records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    View,
    Like,
    Comment,
    Share,
    Save,
}

impl InteractionKind {
    /// Parse the store's string representation; unknown kinds are dropped at
    /// the boundary rather than failing the whole query.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(Self::View),
            "like" => Some(Self::Like),
            "comment" => Some(Self::Comment),
            "share" => Some(Self::Share),
            "save" => Some(Self::Save),
            _ => None,
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionKind::View => write!(f, "view"),
            InteractionKind::Like => write!(f, "like"),
            InteractionKind::Comment => write!(f, "comment"),
            InteractionKind::Share => write!(f, "share"),
            InteractionKind::Save => write!(f, "save"),
        }
    }
}

/// A single engagement-log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub post_id: PostId,
    pub kind: InteractionKind,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Result types
// ============================================================================

/// Why an account was recommended.
///
/// Exactly one reason is attached per candidate; string formatting is a
/// presentation concern and lives in [`RecommendationReason::label`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    /// Followed by accounts the caller follows (two-hop signal)
    MutualConnections { count: usize },
    /// Member of the caller's extended network (affinity pool)
    FollowedByYourNetwork,
    /// Shares the caller's location
    SameLocation { location: String },
    /// Shares the caller's role
    SameRole { role: String },
    /// Large audience
    ManyFollowers { count: u64 },
    /// Nothing more specific applied
    Popular,
}

impl RecommendationReason {
    /// Human-readable label for UI display
    pub fn label(&self) -> String {
        match self {
            RecommendationReason::MutualConnections { count } => {
                format!("{} mutual connections", count)
            }
            RecommendationReason::FollowedByYourNetwork => {
                "Followed by people you follow".to_string()
            }
            RecommendationReason::SameLocation { location } => {
                format!("Same city: {}", location)
            }
            RecommendationReason::SameRole { role } => format!("Same profile: {}", role),
            RecommendationReason::ManyFollowers { count } => format!("{} followers", count),
            RecommendationReason::Popular => "Popular on the platform".to_string(),
        }
    }
}

/// "Users you may know" suggestion with its two-hop evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutualSuggestion {
    pub user: User,
    /// Number of accounts the caller follows that follow this candidate
    pub mutual_count: usize,
    /// Capped first-seen sample of the accounts the connection goes through
    pub through: Vec<UserId>,
    pub reason: RecommendationReason,
}

/// Affinity-ranked suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedUser {
    pub user: User,
    pub reason: RecommendationReason,
}

/// Co-following similarity result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarAccount {
    pub user: User,
    /// Distinct members of the reference following set this account follows
    pub overlap: usize,
}

/// Static-popularity trend entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTag {
    pub tag: String,
    pub post_count: i64,
}

/// Burst-detection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstingTag {
    pub tag: String,
    /// Ratio of the recent hourly rate to the baseline hourly rate
    pub velocity: f64,
    pub recent_count: usize,
    pub baseline_count: usize,
}

/// Location-scoped, engagement-weighted trend entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalTrend {
    pub tag: String,
    /// Accumulated interaction + comment counts of the tagged local posts
    pub engagement: i64,
}

/// Ranked feed entry.
///
/// The explore feed ranks by `score`; the interest feed ranks by recency and
/// carries the tag-overlap count in `matched_interests` (zero on explore
/// results and on the interest feed's explore fallback).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPost {
    pub post: Post,
    pub score: i64,
    pub matched_interests: usize,
}

/// Unexplored-hashtag suggestion with its coarse category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSuggestion {
    pub tag: String,
    pub post_count: i64,
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_labels() {
        assert_eq!(
            RecommendationReason::MutualConnections { count: 2 }.label(),
            "2 mutual connections"
        );
        assert_eq!(
            RecommendationReason::SameLocation {
                location: "Lyon".to_string()
            }
            .label(),
            "Same city: Lyon"
        );
        assert_eq!(
            RecommendationReason::Popular.label(),
            "Popular on the platform"
        );
    }

    #[test]
    fn test_interaction_kind_round_trip() {
        for kind in [
            InteractionKind::View,
            InteractionKind::Like,
            InteractionKind::Comment,
            InteractionKind::Share,
            InteractionKind::Save,
        ] {
            assert_eq!(InteractionKind::parse(&kind.to_string()), Some(kind));
        }
        assert_eq!(InteractionKind::parse("purchase"), None);
    }
}
