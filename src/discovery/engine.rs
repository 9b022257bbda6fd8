//! Discovery engine facade
//!
//! One entry point per recommender, all degrade-safe: a failed GraphStore
//! read is logged and turns into an empty result (or the fixed trending
//! fallback), never an error. Recommendations are an optional enhancement to
//! page rendering and must not block or corrupt the primary response.
//!
//! Every call samples `now` once and owns its local accumulators, so calls
//! are independent and may run concurrently without coordination.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use crate::config::DiscoveryConfig;
use crate::error::Error;

use super::metrics::PerformanceTimer;
use super::model::{
    BurstingTag, FeedPost, LocalTrend, MutualSuggestion, SimilarAccount, SuggestedUser,
    TopicSuggestion, TrendingTag, UserId,
};
use super::store::GraphStore;
use super::{affinity, feed, graph, topics, trends};

/// Read-only recommendation engine over a [`GraphStore`]
pub struct DiscoveryEngine<S> {
    store: Arc<S>,
    config: DiscoveryConfig,
}

impl<S> Clone for DiscoveryEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: GraphStore> DiscoveryEngine<S> {
    pub fn new(store: Arc<S>, config: DiscoveryConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Ids excluded from any recommendation for `user`: the user plus
    /// everyone they already follow. Degrades to the empty set.
    pub async fn exclusion_set(&self, user: UserId) -> HashSet<UserId> {
        match graph::exclusion_set(self.store.as_ref(), user).await {
            Ok(set) => set,
            Err(e) => {
                log_degraded("exclusion_set", user, &e);
                HashSet::new()
            }
        }
    }

    /// "Users you may know": two-hop follow-graph suggestions.
    pub async fn suggest_mutual_connections(
        &self,
        user: UserId,
        limit: usize,
    ) -> Vec<MutualSuggestion> {
        let _timer = PerformanceTimer::new("suggest_mutual_connections");
        match graph::find_mutual_connections(
            self.store.as_ref(),
            user,
            self.config.through_sample_cap,
            limit,
        )
        .await
        {
            Ok(items) => items,
            Err(e) => {
                log_degraded("suggest_mutual_connections", user, &e);
                Vec::new()
            }
        }
    }

    /// Multi-signal affinity suggestions with a single reason per candidate.
    pub async fn suggest_by_affinity(&self, user: UserId, limit: usize) -> Vec<SuggestedUser> {
        let _timer = PerformanceTimer::new("suggest_by_affinity");
        match affinity::recommend_by_affinity(self.store.as_ref(), &self.config, user, limit).await
        {
            Ok(items) => items,
            Err(e) => {
                log_degraded("suggest_by_affinity", user, &e);
                Vec::new()
            }
        }
    }

    /// Accounts similar to `user` by co-following overlap.
    pub async fn similar_accounts(&self, user: UserId, limit: usize) -> Vec<SimilarAccount> {
        let _timer = PerformanceTimer::new("similar_accounts");
        match graph::find_similar_accounts(self.store.as_ref(), user, limit).await {
            Ok(items) => items,
            Err(e) => {
                log_degraded("similar_accounts", user, &e);
                Vec::new()
            }
        }
    }

    /// Registry-ranked trending hashtags. Degrades to the fixed default set
    /// so the trending panel never renders empty.
    pub async fn trending_hashtags(&self, limit: usize) -> Vec<TrendingTag> {
        let _timer = PerformanceTimer::new("trending_hashtags");
        match trends::trending_hashtags(self.store.as_ref(), limit).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "trending_hashtags degraded to default set");
                trends::default_trending(limit)
            }
        }
    }

    /// Hashtags bursting right now, ranked by velocity.
    pub async fn bursting_hashtags(&self, limit: usize) -> Vec<BurstingTag> {
        let _timer = PerformanceTimer::new("bursting_hashtags");
        match trends::detect_bursting(self.store.as_ref(), &self.config, Utc::now(), limit).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "bursting_hashtags degraded to empty");
                Vec::new()
            }
        }
    }

    /// Engagement-weighted hashtag trends for one location.
    pub async fn local_trends(&self, location: &str, limit: usize) -> Vec<LocalTrend> {
        let _timer = PerformanceTimer::new("local_trends");
        match trends::local_trends(self.store.as_ref(), &self.config, location, Utc::now(), limit)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                warn!(location, error = %e, "local_trends degraded to empty");
                Vec::new()
            }
        }
    }

    /// Globally-ranked explore feed, excluding the caller's own network.
    pub async fn explore_feed(&self, user: UserId, limit: usize) -> Vec<FeedPost> {
        let _timer = PerformanceTimer::new("explore_feed");
        match feed::explore_feed(self.store.as_ref(), &self.config, user, Utc::now(), limit).await {
            Ok(items) => items,
            Err(e) => {
                log_degraded("explore_feed", user, &e);
                Vec::new()
            }
        }
    }

    /// Tag-affinity feed; falls back to the explore feed when the caller has
    /// no engagement signal.
    pub async fn interest_feed(&self, user: UserId, limit: usize) -> Vec<FeedPost> {
        let _timer = PerformanceTimer::new("interest_feed");
        match feed::interest_feed(self.store.as_ref(), &self.config, user, Utc::now(), limit).await
        {
            Ok(items) => items,
            Err(e) => {
                log_degraded("interest_feed", user, &e);
                Vec::new()
            }
        }
    }

    /// Popular hashtags the caller has not engaged with, with categories.
    pub async fn suggest_topics(&self, user: UserId, limit: usize) -> Vec<TopicSuggestion> {
        let _timer = PerformanceTimer::new("suggest_topics");
        match topics::suggest_topics(self.store.as_ref(), &self.config, user, limit).await {
            Ok(items) => items,
            Err(e) => {
                log_degraded("suggest_topics", user, &e);
                Vec::new()
            }
        }
    }
}

fn log_degraded(operation: &'static str, user: UserId, error: &Error) {
    warn!(%user, error = %error, "{} degraded to empty result", operation);
}
