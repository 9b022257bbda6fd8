//! Topic suggestions
//!
//! Surfaces popular hashtags the caller has not engaged with yet, each
//! labeled with a coarse category. The taxonomy is a fixed configuration
//! table, matched by case-insensitive substring in declaration order; it is
//! not inferred from content.

use crate::config::DiscoveryConfig;
use crate::error::Result;

use super::feed::engaged_tags;
use super::model::{TopicSuggestion, UserId};
use super::store::GraphStore;

/// Ordered category table: first keyword hit wins.
pub(crate) const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    (
        "Housing",
        &["immo", "housing", "apartment", "rent", "property", "home"],
    ),
    (
        "Finance",
        &["loan", "lend", "credit", "invest", "budget", "money", "crypto"],
    ),
    (
        "Community",
        &["event", "meetup", "local", "neighbor", "volunteer", "market"],
    ),
    ("Video", &["video", "clip", "short", "film", "creator"]),
    (
        "Lifestyle",
        &["food", "travel", "sport", "fitness", "music", "art", "fashion"],
    ),
];

pub(crate) const FALLBACK_CATEGORY: &str = "Other";

/// Coarse category for a tag: first table entry with a substring match.
pub(crate) fn categorize(tag: &str) -> &'static str {
    let lower = tag.to_lowercase();
    for (category, keywords) in CATEGORY_TABLE {
        if keywords.iter().any(|k| lower.contains(k)) {
            return category;
        }
    }
    FALLBACK_CATEGORY
}

pub(crate) async fn suggest_topics<S: GraphStore>(
    store: &S,
    config: &DiscoveryConfig,
    user: UserId,
    limit: usize,
) -> Result<Vec<TopicSuggestion>> {
    let engaged = engaged_tags(store, config, user).await?;

    // At most |engaged| registry entries can be filtered out, so this fetch
    // size always leaves `limit` candidates when the registry has them.
    let fetch = limit + engaged.len();
    let mut registry = store.hashtags_by_post_count(fetch).await?;
    registry.sort_by(|a, b| b.post_count.cmp(&a.post_count).then_with(|| a.tag.cmp(&b.tag)));

    Ok(registry
        .into_iter()
        .filter(|h| !engaged.contains(&h.tag))
        .take(limit)
        .map(|h| TopicSuggestion {
            category: categorize(&h.tag).to_string(),
            tag: h.tag,
            post_count: h.post_count,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_matches_substring_case_insensitive() {
        assert_eq!(categorize("Immobilier"), "Housing");
        assert_eq!(categorize("CryptoArt"), "Finance");
        assert_eq!(categorize("streetfood"), "Lifestyle");
        assert_eq!(categorize("shortclips"), "Video");
    }

    #[test]
    fn test_categorize_first_match_wins() {
        // "homeinvesting" hits Housing ("home") before Finance ("invest").
        assert_eq!(categorize("homeinvesting"), "Housing");
    }

    #[test]
    fn test_categorize_falls_back_to_other() {
        assert_eq!(categorize("zebra"), FALLBACK_CATEGORY);
    }
}
