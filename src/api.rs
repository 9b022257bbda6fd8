//! HTTP API Server for Discovery
//!
//! REST endpoints the frontend uses to fetch account suggestions, trends,
//! feeds and topic suggestions. Every list endpoint always answers 200 with
//! a possibly-empty list: the engine degrades internally on store failures,
//! so a broken recommendation path never breaks page rendering.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::discovery::{DiscoveryEngine, PgGraphStore};

/// Shared application state
pub struct AppState {
    pub engine: DiscoveryEngine<PgGraphStore>,
}

/// Query params for list endpoints
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

/// Response envelope for list endpoints
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

fn list<T>(items: Vec<T>) -> Json<ListResponse<T>> {
    let total = items.len();
    Json(ListResponse { items, total })
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Start the API server
pub async fn start_server(pool: PgPool, config: Arc<Config>) -> Result<()> {
    let store = Arc::new(PgGraphStore::new(pool));
    let engine = DiscoveryEngine::new(store, config.discovery.clone());

    let state = Arc::new(AppState { engine });

    let mut app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Account suggestions
        .route(
            "/api/v1/users/:id/suggestions/mutual",
            get(mutual_suggestions),
        )
        .route(
            "/api/v1/users/:id/suggestions/affinity",
            get(affinity_suggestions),
        )
        .route(
            "/api/v1/users/:id/suggestions/similar",
            get(similar_accounts),
        )
        // Feeds
        .route("/api/v1/users/:id/feed/explore", get(explore_feed))
        .route("/api/v1/users/:id/feed/interests", get(interest_feed))
        // Topics
        .route("/api/v1/users/:id/topics", get(topic_suggestions))
        // Trends
        .route("/api/v1/trends/popular", get(popular_trends))
        .route("/api/v1/trends/bursting", get(bursting_trends))
        .route("/api/v1/trends/local/:location", get(local_trends))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.api.request_timeout))
        .with_state(state);

    if config.api.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    let addr = format!("{}:{}", config.api.host, config.api.port);
    info!("Starting discovery API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// "Users you may know" suggestions
async fn mutual_suggestions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse<crate::discovery::MutualSuggestion>> {
    list(state.engine.suggest_mutual_connections(id, query.limit).await)
}

/// Multi-signal affinity suggestions
async fn affinity_suggestions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse<crate::discovery::SuggestedUser>> {
    list(state.engine.suggest_by_affinity(id, query.limit).await)
}

/// Co-following similarity
async fn similar_accounts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse<crate::discovery::SimilarAccount>> {
    list(state.engine.similar_accounts(id, query.limit).await)
}

/// Globally-ranked explore feed
async fn explore_feed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse<crate::discovery::FeedPost>> {
    list(state.engine.explore_feed(id, query.limit).await)
}

/// Personalized interest feed (explore fallback inside the engine)
async fn interest_feed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse<crate::discovery::FeedPost>> {
    list(state.engine.interest_feed(id, query.limit).await)
}

/// Unexplored topic suggestions
async fn topic_suggestions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse<crate::discovery::TopicSuggestion>> {
    list(state.engine.suggest_topics(id, query.limit).await)
}

/// Registry-ranked trending hashtags
async fn popular_trends(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse<crate::discovery::TrendingTag>> {
    list(state.engine.trending_hashtags(query.limit).await)
}

/// Bursting hashtags ranked by velocity
async fn bursting_trends(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse<crate::discovery::BurstingTag>> {
    list(state.engine.bursting_hashtags(query.limit).await)
}

/// Location-scoped engagement trends
async fn local_trends(
    State(state): State<Arc<AppState>>,
    Path(location): Path<String>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse<crate::discovery::LocalTrend>> {
    list(state.engine.local_trends(&location, query.limit).await)
}
