//! Affinity recommender
//!
//! Multi-signal account suggestions: the candidate pool is the union of
//! accounts sharing the caller's location, accounts sharing their role,
//! established accounts above the reputation floor, and the caller's two-hop
//! network. The pool is an explicit accumulator rather than a composed
//! relational query, so the union/exclusion semantics are visible and
//! testable in one place.
//!
//! Each surviving candidate gets exactly one reason, picked by a fixed
//! priority order: network > same location > same role > follower count >
//! popular.

use std::collections::{HashMap, HashSet};

use crate::config::DiscoveryConfig;
use crate::error::Result;

use super::graph::{exclusion_set, mutual_candidates};
use super::model::{RecommendationReason, SuggestedUser, User, UserId};
use super::store::GraphStore;

/// Union-of-sources candidate accumulator with a single exclusion pass.
pub(crate) struct CandidatePool {
    users: HashMap<UserId, User>,
}

impl CandidatePool {
    pub(crate) fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    pub(crate) fn contains(&self, id: &UserId) -> bool {
        self.users.contains_key(id)
    }

    /// Add a source's users to the pool; duplicates collapse on id.
    pub(crate) fn extend(&mut self, users: Vec<User>) {
        for user in users {
            self.users.entry(user.id).or_insert(user);
        }
    }

    pub(crate) fn remove_excluded(&mut self, excluded: &HashSet<UserId>) {
        self.users.retain(|id, _| !excluded.contains(id));
    }

    /// Drain the pool ranked by reputation descending, ties by id ascending.
    pub(crate) fn into_ranked(self) -> Vec<User> {
        let mut ranked: Vec<User> = self.users.into_values().collect();
        ranked.sort_unstable_by(|a, b| {
            b.reputation
                .cmp(&a.reputation)
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked
    }
}

pub(crate) async fn recommend_by_affinity<S: GraphStore>(
    store: &S,
    config: &DiscoveryConfig,
    user_id: UserId,
    limit: usize,
) -> Result<Vec<SuggestedUser>> {
    // Without the caller's record there is no reference point to compare
    // against, and the contract is an empty result rather than an error.
    let Some(caller) = store.user(user_id).await? else {
        return Ok(Vec::new());
    };

    let excluded = exclusion_set(store, user_id).await?;

    let mut pool = CandidatePool::new();
    if let Some(location) = caller.location.as_deref().filter(|l| !l.is_empty()) {
        pool.extend(store.users_by_location(location).await?);
    }
    pool.extend(store.users_by_role(&caller.role).await?);
    pool.extend(
        store
            .users_with_min_reputation(config.reputation_threshold)
            .await?,
    );

    // Two-hop network candidates, without the "through" sample.
    let network = mutual_candidates(store, user_id, 0).await?;
    let network_ids: HashSet<UserId> = network.counts.keys().copied().collect();
    let mut missing: Vec<UserId> = network_ids
        .iter()
        .filter(|id| !pool.contains(id))
        .copied()
        .collect();
    missing.sort_unstable();
    pool.extend(store.users_by_ids(&missing).await?);

    pool.remove_excluded(&excluded);

    // Shortlist twice the requested size before reason assignment, then cut.
    let shortlist: Vec<User> = pool.into_ranked().into_iter().take(limit * 2).collect();

    let ids: Vec<UserId> = shortlist.iter().map(|u| u.id).collect();
    let follower_counts = store.follower_counts(&ids).await?;

    let mut suggestions: Vec<SuggestedUser> = shortlist
        .into_iter()
        .map(|candidate| {
            let followers = follower_counts.get(&candidate.id).copied().unwrap_or(0);
            let reason = pick_reason(
                &caller,
                &candidate,
                &network_ids,
                followers,
                config.notable_follower_threshold,
            );
            SuggestedUser {
                user: candidate,
                reason,
            }
        })
        .collect();

    suggestions.truncate(limit);
    Ok(suggestions)
}

/// Single-reason selection; first matching rule wins.
pub(crate) fn pick_reason(
    caller: &User,
    candidate: &User,
    network_ids: &HashSet<UserId>,
    follower_count: u64,
    notable_follower_threshold: u64,
) -> RecommendationReason {
    if network_ids.contains(&candidate.id) {
        return RecommendationReason::FollowedByYourNetwork;
    }

    if let (Some(caller_loc), Some(candidate_loc)) =
        (caller.location.as_deref(), candidate.location.as_deref())
    {
        if !caller_loc.is_empty() && caller_loc == candidate_loc {
            return RecommendationReason::SameLocation {
                location: candidate_loc.to_string(),
            };
        }
    }

    if candidate.role == caller.role {
        return RecommendationReason::SameRole {
            role: candidate.role.clone(),
        };
    }

    if follower_count > notable_follower_threshold {
        return RecommendationReason::ManyFollowers {
            count: follower_count,
        };
    }

    RecommendationReason::Popular
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(n: u128, location: Option<&str>, role: &str) -> User {
        User {
            id: Uuid::from_u128(n),
            username: format!("user{}", n),
            location: location.map(String::from),
            role: role.to_string(),
            reputation: 0,
        }
    }

    #[test]
    fn test_reason_priority_network_beats_location() {
        let caller = user(1, Some("Lyon"), "member");
        let candidate = user(2, Some("Lyon"), "member");
        let network: HashSet<UserId> = [candidate.id].into_iter().collect();

        let reason = pick_reason(&caller, &candidate, &network, 500, 100);
        assert_eq!(reason, RecommendationReason::FollowedByYourNetwork);
    }

    #[test]
    fn test_reason_priority_location_beats_role() {
        let caller = user(1, Some("Lyon"), "member");
        let candidate = user(2, Some("Lyon"), "member");

        let reason = pick_reason(&caller, &candidate, &HashSet::new(), 0, 100);
        assert_eq!(
            reason,
            RecommendationReason::SameLocation {
                location: "Lyon".to_string()
            }
        );
    }

    #[test]
    fn test_reason_empty_location_never_matches() {
        let caller = user(1, Some(""), "member");
        let candidate = user(2, Some(""), "agent");

        let reason = pick_reason(&caller, &candidate, &HashSet::new(), 0, 100);
        assert_eq!(reason, RecommendationReason::Popular);
    }

    #[test]
    fn test_reason_follower_count_then_default() {
        let caller = user(1, None, "member");
        let candidate = user(2, None, "agent");

        assert_eq!(
            pick_reason(&caller, &candidate, &HashSet::new(), 101, 100),
            RecommendationReason::ManyFollowers { count: 101 }
        );
        assert_eq!(
            pick_reason(&caller, &candidate, &HashSet::new(), 100, 100),
            RecommendationReason::Popular
        );
    }

    #[test]
    fn test_pool_ranks_reputation_then_id() {
        let mut pool = CandidatePool::new();
        let mut a = user(3, None, "member");
        a.reputation = 10;
        let mut b = user(1, None, "member");
        b.reputation = 10;
        let mut c = user(2, None, "member");
        c.reputation = 80;
        pool.extend(vec![a, b, c]);

        let ranked = pool.into_ranked();
        let ids: Vec<u128> = ranked.iter().map(|u| u.id.as_u128()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
