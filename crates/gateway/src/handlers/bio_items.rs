//! Bio item handlers
//!
//! One bio per candidate; the create path surfaces the uniqueness rule
//! as a validation failure before anything is written.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::handlers::{ListResponse, Pagination};
use crate::AppState;
use cvforge_common::{
    auth::AuthContext,
    db::{models::BioItem, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBioItemRequest {
    pub candidate_id: Uuid,

    #[validate(length(min = 1, max = 20000))]
    pub bio: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBioItemRequest {
    #[validate(length(min = 1, max = 20000))]
    pub bio: String,
}

#[derive(Serialize)]
pub struct BioItemResponse {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub bio: String,
    pub created_at: String,
}

impl From<BioItem> for BioItemResponse {
    fn from(item: BioItem) -> Self {
        Self {
            id: item.id,
            candidate_id: item.candidate_id,
            bio: item.bio,
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

/// Create a bio for a candidate
pub async fn create_bio_item(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(request): Json<CreateBioItemRequest>,
) -> Result<(StatusCode, Json<BioItemResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let item = repo.create_bio_item(request.candidate_id, request.bio).await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// List bio items
pub async fn list_bio_items(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListResponse<BioItemResponse>>> {
    let repo = Repository::new(state.db.clone());
    let (items, total) = repo
        .list_bio_items(pagination.offset, pagination.limit())
        .await?;

    Ok(Json(ListResponse {
        items: items.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a bio item by ID
pub async fn get_bio_item(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<BioItemResponse>> {
    let repo = Repository::new(state.db.clone());
    let item = repo
        .find_bio_item_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "bio_item".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(item.into()))
}

/// Update a bio item's text
pub async fn update_bio_item(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBioItemRequest>,
) -> Result<Json<BioItemResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let item = repo.update_bio_item(id, request.bio).await?;

    Ok(Json(item.into()))
}

/// Delete a bio item
pub async fn delete_bio_item(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());

    if !repo.delete_bio_item(id).await? {
        return Err(AppError::NotFound {
            resource_type: "bio_item".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
