//! Follow-graph traversals
//!
//! The two traversal-based recommenders ("users you may know", "similar
//! accounts") plus the exclusion-set utility they and the affinity
//! recommender share.
//!
//! Both traversals are fixed at exactly two hops and accumulate into flat
//! id-keyed maps, so mutual follows (A→B and B→A are both valid edges) can
//! never loop them. The first hop is always walked in id-ascending order:
//! that is what makes the capped "through" sample reproducible for a fixed
//! snapshot.

use std::collections::{HashMap, HashSet};

use crate::error::Result;

use super::model::{MutualSuggestion, RecommendationReason, SimilarAccount, User, UserId};
use super::store::GraphStore;

/// Ids that must never be recommended to `user`: the user plus everyone they
/// already follow.
pub(crate) async fn exclusion_set<S: GraphStore>(store: &S, user: UserId) -> Result<HashSet<UserId>> {
    let mut set = store.following(user).await?;
    set.insert(user);
    Ok(set)
}

/// Two-hop candidate accumulation shared by the mutual finder and the
/// affinity recommender's network pool.
pub(crate) struct MutualCandidates {
    /// candidate -> number of first-hop accounts that follow it
    pub counts: HashMap<UserId, usize>,
    /// candidate -> capped first-seen sample of the first-hop accounts
    pub through: HashMap<UserId, Vec<UserId>>,
}

pub(crate) async fn mutual_candidates<S: GraphStore>(
    store: &S,
    user: UserId,
    through_cap: usize,
) -> Result<MutualCandidates> {
    let first_hop = store.following(user).await?;

    let mut excluded: HashSet<UserId> = first_hop.iter().copied().collect();
    excluded.insert(user);

    let mut first_hop: Vec<UserId> = first_hop.into_iter().collect();
    first_hop.sort_unstable();

    let mut counts: HashMap<UserId, usize> = HashMap::new();
    let mut through: HashMap<UserId, Vec<UserId>> = HashMap::new();

    for via in first_hop {
        for candidate in store.following(via).await? {
            if excluded.contains(&candidate) {
                continue;
            }
            *counts.entry(candidate).or_insert(0) += 1;
            if through_cap > 0 {
                let sample = through.entry(candidate).or_default();
                if sample.len() < through_cap {
                    sample.push(via);
                }
            }
        }
    }

    Ok(MutualCandidates { counts, through })
}

/// Rank an id-keyed counter map: count descending, then id ascending.
pub(crate) fn rank_by_count(counts: &HashMap<UserId, usize>) -> Vec<(UserId, usize)> {
    let mut ranked: Vec<(UserId, usize)> = counts.iter().map(|(id, c)| (*id, *c)).collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Batch-hydrate user records, keyed by id. Ids whose record has vanished
/// between the traversal and the lookup are simply absent.
pub(crate) async fn hydrate_users<S: GraphStore>(
    store: &S,
    ids: &[UserId],
) -> Result<HashMap<UserId, User>> {
    let users = store.users_by_ids(ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// "Users you may know": accounts followed by the accounts `user` follows,
/// ranked by how many distinct paths lead to them.
pub(crate) async fn find_mutual_connections<S: GraphStore>(
    store: &S,
    user: UserId,
    through_cap: usize,
    limit: usize,
) -> Result<Vec<MutualSuggestion>> {
    let mut candidates = mutual_candidates(store, user, through_cap).await?;

    let top: Vec<(UserId, usize)> = rank_by_count(&candidates.counts)
        .into_iter()
        .take(limit)
        .collect();

    let ids: Vec<UserId> = top.iter().map(|(id, _)| *id).collect();
    let mut users = hydrate_users(store, &ids).await?;

    Ok(top
        .into_iter()
        .filter_map(|(id, count)| {
            let user = users.remove(&id)?;
            let through = candidates.through.remove(&id).unwrap_or_default();
            Some(MutualSuggestion {
                user,
                mutual_count: count,
                through,
                reason: RecommendationReason::MutualConnections { count },
            })
        })
        .collect())
}

/// "Similar accounts": co-following overlap against `target`'s following set.
///
/// Item-based collaborative filtering where the items are followed accounts:
/// a candidate scores one point per member of the reference set it follows.
/// Accounts the target already follows are excluded along with the target
/// itself, so the output honors the same exclusion contract as every other
/// recommender.
pub(crate) async fn find_similar_accounts<S: GraphStore>(
    store: &S,
    target: UserId,
    limit: usize,
) -> Result<Vec<SimilarAccount>> {
    let reference = store.following(target).await?;
    if reference.is_empty() {
        return Ok(Vec::new());
    }

    let mut excluded: HashSet<UserId> = reference.iter().copied().collect();
    excluded.insert(target);

    let mut reference: Vec<UserId> = reference.into_iter().collect();
    reference.sort_unstable();

    let mut overlap: HashMap<UserId, usize> = HashMap::new();
    for item in reference {
        for candidate in store.followers(item).await? {
            if excluded.contains(&candidate) {
                continue;
            }
            *overlap.entry(candidate).or_insert(0) += 1;
        }
    }

    let top: Vec<(UserId, usize)> = rank_by_count(&overlap)
        .into_iter()
        .take(limit)
        .collect();

    let ids: Vec<UserId> = top.iter().map(|(id, _)| *id).collect();
    let mut users = hydrate_users(store, &ids).await?;

    Ok(top
        .into_iter()
        .filter_map(|(id, count)| {
            let user = users.remove(&id)?;
            Some(SimilarAccount {
                user,
                overlap: count,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn id(n: u128) -> UserId {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_rank_by_count_orders_by_count_then_id() {
        let mut counts = HashMap::new();
        counts.insert(id(3), 2);
        counts.insert(id(1), 1);
        counts.insert(id(2), 2);

        let ranked = rank_by_count(&counts);
        assert_eq!(ranked, vec![(id(2), 2), (id(3), 2), (id(1), 1)]);
    }
}
