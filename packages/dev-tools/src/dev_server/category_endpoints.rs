//! Category Endpoints for HTTP Dev Server
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/categories` - All categories, shallowest level first
//! - `GET /api/categories/tree?withCounts=` - Nested forest
//! - `GET /api/categories/:id` - One category
//! - `GET /api/categories/:id/children` - Direct children
//! - `GET /api/categories/:id/descendants` - Whole subtree below the category
//! - `GET /api/categories/:id/ancestors` - Root-first ancestor chain
//! - `POST /api/categories` - Create a category
//! - `PATCH /api/categories/:id` - Sparse update (may include a parent change)
//! - `POST /api/categories/:id/move` - Re-parent a category
//! - `DELETE /api/categories/:id?children=&content=` - Delete under a policy

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use folio_core::models::{
    CategoryId, CategoryNode, CategoryTreeNode, CategoryUpdate, ChildrenPolicy, ContentPolicy,
    DeletePolicy,
};
use folio_core::services::ContentLookup;
use serde::{Deserialize, Serialize};

use crate::dev_server::{AppState, HttpError};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Body of `POST /api/categories/:id/move`; a missing or null `parentId` moves to root
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCategoryInput {
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeQuery {
    #[serde(default)]
    pub with_counts: bool,
}

/// Delete policies; both default to `PREVENT`
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub children: ChildrenPolicy,
    #[serde(default)]
    pub content: ContentPolicy,
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryNode>>, HttpError> {
    Ok(Json(state.manager.list_flat().await?))
}

async fn get_tree(
    State(state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<Vec<CategoryTreeNode>>, HttpError> {
    let counts: Option<&dyn ContentLookup> = if query.with_counts {
        Some(state.content.as_ref())
    } else {
        None
    };
    Ok(Json(state.manager.build_tree(counts).await?))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<CategoryNode>, HttpError> {
    Ok(Json(state.manager.get(id).await?))
}

async fn get_children(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<CategoryNode>>, HttpError> {
    Ok(Json(state.manager.get_children(id).await?))
}

async fn get_descendants(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<CategoryNode>>, HttpError> {
    Ok(Json(state.manager.get_descendants(id).await?))
}

async fn get_ancestors(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<CategoryNode>>, HttpError> {
    Ok(Json(state.manager.get_ancestors(id).await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> Result<(StatusCode, Json<CategoryNode>), HttpError> {
    let node = state
        .manager
        .create(input.name, input.description, input.parent_id, input.sort_order)
        .await?;
    Ok((StatusCode::CREATED, Json(node)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(update): Json<CategoryUpdate>,
) -> Result<Json<CategoryNode>, HttpError> {
    Ok(Json(state.manager.update(id, update).await?))
}

async fn move_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(input): Json<MoveCategoryInput>,
) -> Result<Json<CategoryNode>, HttpError> {
    Ok(Json(state.manager.move_category(id, input.parent_id).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, HttpError> {
    let policy = DeletePolicy::new(query.children, query.content);
    tracing::debug!("DELETE category {} with {:?}", id, policy);
    state.manager.delete(id, policy).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create the category router
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/categories", get(list_categories).post(create_category))
        .route("/api/categories/tree", get(get_tree))
        .route(
            "/api/categories/:id",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route("/api/categories/:id/children", get(get_children))
        .route("/api/categories/:id/descendants", get(get_descendants))
        .route("/api/categories/:id/ancestors", get(get_ancestors))
        .route("/api/categories/:id/move", post(move_category))
        .with_state(state)
}
