//! Discovery & Recommendation Module
//!
//! Read-only ranking algorithms over the platform's social graph (users,
//! follow edges), content graph (posts, hashtags) and engagement log.
//! Everything here is graph traversal, counting and time-windowed scoring;
//! there is no learned model and no persisted index, and results are
//! recomputed from the current snapshot on every call.
//!
//! ## Components
//!
//! 1. **Graph** - exclusion set, two-hop "users you may know", co-following
//!    similarity
//! 2. **Affinity** - multi-signal account suggestions with a single
//!    deterministic reason per candidate
//! 3. **Trends** - registry popularity, rate-normalized burst detection,
//!    location-scoped engagement trends
//! 4. **Feed** - engagement-ranked explore feed and recency-ranked interest
//!    feed
//! 5. **Topics** - unexplored hashtags classified into coarse categories
//!
//! ## Contracts
//!
//! - Deterministic: for a fixed snapshot and fixed inputs the ordered output
//!   is identical across calls; ties always break by id (or tag) ascending.
//! - Exclusion: no recommender ever returns the caller or an account the
//!   caller already follows.
//! - Degrade-safe: a failed store read yields an empty result (or the fixed
//!   trending fallback), never an error to the caller.

pub mod affinity;
pub mod engine;
pub mod feed;
pub mod graph;
pub mod memory;
pub mod metrics;
pub mod model;
pub mod pg_store;
pub mod store;
pub mod topics;
pub mod trends;

// Re-export the types that are actually used externally
pub use engine::DiscoveryEngine;
pub use memory::MemoryGraphStore;
pub use model::{
    BurstingTag, FeedPost, Hashtag, Interaction, InteractionKind, LocalTrend, MutualSuggestion,
    Post, PostId, RecommendationReason, SimilarAccount, SuggestedUser, TopicSuggestion,
    TrendingTag, User, UserId,
};
pub use pg_store::PgGraphStore;
pub use store::GraphStore;
