//! In-memory GraphStore
//!
//! A self-contained snapshot of the graph, used by the test suite and for
//! local development without a database. Mutating helpers build the snapshot
//! up front; the trait implementation is strictly read-only, mirroring the
//! production boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::Result;

use super::model::{Hashtag, Interaction, Post, PostId, User, UserId};
use super::store::GraphStore;

/// GraphStore over plain in-process collections
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    users: HashMap<UserId, User>,
    /// follower -> following set
    following: HashMap<UserId, BTreeSet<UserId>>,
    /// following -> follower set
    followers: HashMap<UserId, BTreeSet<UserId>>,
    posts: BTreeMap<PostId, Post>,
    interactions: Vec<Interaction>,
    /// tag -> registry post count
    hashtags: BTreeMap<String, i64>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Record a follow edge. Self-loops are rejected to keep the snapshot
    /// consistent with the store's edge invariant.
    pub fn follow(&mut self, follower: UserId, following: UserId) {
        if follower == following {
            return;
        }
        self.following.entry(follower).or_default().insert(following);
        self.followers.entry(following).or_default().insert(follower);
    }

    /// Record a post and bump the denormalized registry counts for its tags,
    /// the way the platform's write path does.
    pub fn add_post(&mut self, post: Post) {
        for tag in &post.hashtags {
            *self.hashtags.entry(tag.clone()).or_insert(0) += 1;
        }
        self.posts.insert(post.id, post);
    }

    /// Record an engagement-log entry. The denormalized post counters are not
    /// touched: tests set those directly on the `Post`.
    pub fn add_interaction(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    /// Seed a registry entry directly (without any backing post)
    pub fn seed_hashtag(&mut self, tag: impl Into<String>, post_count: i64) {
        self.hashtags.insert(tag.into(), post_count);
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn following(&self, user: UserId) -> Result<HashSet<UserId>> {
        Ok(self
            .following
            .get(&user)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn followers(&self, user: UserId) -> Result<HashSet<UserId>> {
        Ok(self
            .followers
            .get(&user)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn follower_counts(&self, ids: &[UserId]) -> Result<HashMap<UserId, u64>> {
        Ok(ids
            .iter()
            .map(|id| {
                let count = self.followers.get(id).map(|s| s.len() as u64).unwrap_or(0);
                (*id, count)
            })
            .collect())
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).cloned())
            .collect())
    }

    async fn users_by_location(&self, location: &str) -> Result<Vec<User>> {
        Ok(self
            .users
            .values()
            .filter(|u| u.location.as_deref() == Some(location))
            .cloned()
            .collect())
    }

    async fn users_by_role(&self, role: &str) -> Result<Vec<User>> {
        Ok(self
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn users_with_min_reputation(&self, min: i64) -> Result<Vec<User>> {
        Ok(self
            .users
            .values()
            .filter(|u| u.reputation >= min)
            .cloned()
            .collect())
    }

    async fn posts_by_authors(
        &self,
        authors: &[UserId],
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>> {
        let authors: HashSet<UserId> = authors.iter().copied().collect();
        Ok(self
            .posts
            .values()
            .filter(|p| authors.contains(&p.author_id))
            .filter(|p| since.map(|s| p.created_at > s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn posts_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .values()
            .filter(|p| p.created_at > since)
            .cloned()
            .collect())
    }

    async fn posts_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.posts.get(id).cloned())
            .collect())
    }

    async fn interactions_by_user(&self, user: UserId, limit: usize) -> Result<Vec<Interaction>> {
        let mut own: Vec<Interaction> = self
            .interactions
            .iter()
            .filter(|i| i.user_id == user)
            .cloned()
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        own.truncate(limit);
        Ok(own)
    }

    async fn hashtags_by_post_count(&self, limit: usize) -> Result<Vec<Hashtag>> {
        let mut tags: Vec<Hashtag> = self
            .hashtags
            .iter()
            .map(|(tag, count)| Hashtag {
                tag: tag.clone(),
                post_count: *count,
            })
            .collect();
        tags.sort_by(|a, b| b.post_count.cmp(&a.post_count).then_with(|| a.tag.cmp(&b.tag)));
        tags.truncate(limit);
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(n: u128) -> User {
        User {
            id: Uuid::from_u128(n),
            username: format!("user{}", n),
            location: None,
            role: "member".to_string(),
            reputation: 0,
        }
    }

    #[tokio::test]
    async fn test_follow_rejects_self_loop() {
        let mut store = MemoryGraphStore::new();
        let a = user(1);
        let id = a.id;
        store.add_user(a);
        store.follow(id, id);

        assert!(store.following(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_registry_counts_follow_posts() {
        let mut store = MemoryGraphStore::new();
        store.add_post(Post {
            id: Uuid::from_u128(10),
            author_id: Uuid::from_u128(1),
            created_at: Utc::now(),
            hashtags: vec!["paris".to_string(), "housing".to_string()],
            interaction_count: 0,
            comment_count: 0,
        });
        store.add_post(Post {
            id: Uuid::from_u128(11),
            author_id: Uuid::from_u128(1),
            created_at: Utc::now(),
            hashtags: vec!["paris".to_string()],
            interaction_count: 0,
            comment_count: 0,
        });

        let ranked = store.hashtags_by_post_count(10).await.unwrap();
        assert_eq!(ranked[0].tag, "paris");
        assert_eq!(ranked[0].post_count, 2);
        assert_eq!(ranked[1].tag, "housing");
    }
}
