//! PostgreSQL GraphStore implementation
//!
//! Read-only sqlx queries against the platform schema. The schema itself is
//! owned by the platform's CRUD services; this module only selects.
//!
//! This is the single place where the store's nullable counters are defaulted
//! to zero: every row type keeps the counter optional and the conversion into
//! the model applies the default, so the scoring code upstream never handles
//! an `Option`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::Result;

use super::model::{Hashtag, Interaction, InteractionKind, Post, PostId, User, UserId};
use super::store::GraphStore;

/// GraphStore backed by the platform's PostgreSQL database
#[derive(Clone)]
pub struct PgGraphStore {
    pool: PgPool,
}

impl PgGraphStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Row types (the counter-defaulting boundary)
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    location: Option<String>,
    role: String,
    reputation: Option<i64>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            location: row.location,
            role: row.role,
            reputation: row.reputation.unwrap_or(0),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    created_at: DateTime<Utc>,
    hashtags: Option<Vec<String>>,
    interaction_count: Option<i64>,
    comment_count: Option<i64>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            author_id: row.author_id,
            created_at: row.created_at,
            hashtags: row.hashtags.unwrap_or_default(),
            interaction_count: row.interaction_count.unwrap_or(0),
            comment_count: row.comment_count.unwrap_or(0),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HashtagRow {
    tag: String,
    post_count: Option<i64>,
}

impl From<HashtagRow> for Hashtag {
    fn from(row: HashtagRow) -> Self {
        Hashtag {
            tag: row.tag,
            post_count: row.post_count.unwrap_or(0),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InteractionRow {
    user_id: Uuid,
    post_id: Uuid,
    interaction_type: String,
    created_at: DateTime<Utc>,
}

const POST_SELECT: &str = r#"
    SELECT p.id, p.author_id, p.created_at,
           p.interaction_count, p.comment_count,
           array_agg(h.tag) FILTER (WHERE h.tag IS NOT NULL) AS hashtags
    FROM posts p
    LEFT JOIN post_hashtags h ON h.post_id = p.id
"#;

#[async_trait]
impl GraphStore for PgGraphStore {
    async fn following(&self, user: UserId) -> Result<HashSet<UserId>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT following_id FROM follows WHERE follower_id = $1",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn followers(&self, user: UserId) -> Result<HashSet<UserId>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT follower_id FROM follows WHERE following_id = $1",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn follower_counts(&self, ids: &[UserId]) -> Result<HashMap<UserId, u64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT following_id, COUNT(*)
            FROM follows
            WHERE following_id = ANY($1)
            GROUP BY following_id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect())
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, location, role, reputation FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, location, role, reputation FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn users_by_location(&self, location: &str) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, location, role, reputation FROM users WHERE location = $1",
        )
        .bind(location)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn users_by_role(&self, role: &str) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, location, role, reputation FROM users WHERE role = $1",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn users_with_min_reputation(&self, min: i64) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, location, role, reputation FROM users WHERE reputation >= $1",
        )
        .bind(min)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn posts_by_authors(
        &self,
        authors: &[UserId],
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let rows = if let Some(since) = since {
            sqlx::query_as::<_, PostRow>(&format!(
                "{POST_SELECT} WHERE p.author_id = ANY($1) AND p.created_at > $2 GROUP BY p.id"
            ))
            .bind(authors)
            .bind(since)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, PostRow>(&format!(
                "{POST_SELECT} WHERE p.author_id = ANY($1) GROUP BY p.id"
            ))
            .bind(authors)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn posts_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE p.created_at > $1 GROUP BY p.id"
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn posts_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE p.id = ANY($1) GROUP BY p.id"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn interactions_by_user(&self, user: UserId, limit: usize) -> Result<Vec<Interaction>> {
        let rows = sqlx::query_as::<_, InteractionRow>(
            r#"
            SELECT user_id, post_id, interaction_type, created_at
            FROM interactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        // Rows with an interaction type this engine does not know about are
        // dropped here rather than failing the whole read.
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let kind = InteractionKind::parse(&row.interaction_type)?;
                Some(Interaction {
                    user_id: row.user_id,
                    post_id: row.post_id,
                    kind,
                    created_at: row.created_at,
                })
            })
            .collect())
    }

    async fn hashtags_by_post_count(&self, limit: usize) -> Result<Vec<Hashtag>> {
        let rows = sqlx::query_as::<_, HashtagRow>(
            r#"
            SELECT tag, post_count
            FROM hashtags
            ORDER BY post_count DESC NULLS LAST, tag ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Hashtag::from).collect())
    }
}
