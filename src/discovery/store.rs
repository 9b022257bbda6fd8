//! GraphStore boundary
//!
//! The discovery engine consumes the platform's relational data exclusively
//! through this read-only trait. Every method is a snapshot read: the engine
//! never writes, and a single recommendation computation treats all returned
//! data as immutable.
//!
//! Counter defaulting happens once, at the implementations' row-to-model
//! conversions: scoring code never sees an optional counter.
//!
//! Implementations: [`super::pg_store::PgGraphStore`] for production,
//! [`super::memory::MemoryGraphStore`] for tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::error::Result;

use super::model::{Hashtag, Interaction, Post, PostId, User, UserId};

/// Read-only queries over the social graph, content graph and engagement log
#[async_trait]
pub trait GraphStore: Send + Sync + 'static {
    /// Accounts `user` follows
    async fn following(&self, user: UserId) -> Result<HashSet<UserId>>;

    /// Accounts following `user`
    async fn followers(&self, user: UserId) -> Result<HashSet<UserId>>;

    /// Follower counts for a batch of accounts; absent ids count as zero
    async fn follower_counts(&self, ids: &[UserId]) -> Result<HashMap<UserId, u64>>;

    /// Single account lookup
    async fn user(&self, id: UserId) -> Result<Option<User>>;

    /// Batch account lookup; ids with no record are silently absent
    async fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>>;

    /// Accounts with the exact location label
    async fn users_by_location(&self, location: &str) -> Result<Vec<User>>;

    /// Accounts with the exact role label
    async fn users_by_role(&self, role: &str) -> Result<Vec<User>>;

    /// Accounts at or above the reputation floor
    async fn users_with_min_reputation(&self, min: i64) -> Result<Vec<User>>;

    /// Posts by the given authors, optionally restricted to `created_at > since`
    async fn posts_by_authors(
        &self,
        authors: &[UserId],
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>>;

    /// All posts with `created_at > since`
    async fn posts_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>>;

    /// Batch post lookup
    async fn posts_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>>;

    /// Most recent interactions of `user`, newest first
    async fn interactions_by_user(&self, user: UserId, limit: usize) -> Result<Vec<Interaction>>;

    /// Hashtag registry ranked by post count descending (ties by tag ascending)
    async fn hashtags_by_post_count(&self, limit: usize) -> Result<Vec<Hashtag>>;
}
