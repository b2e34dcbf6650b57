//! Candidate management handlers

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
    db::{models::Candidate, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CandidateInput {
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
}

#[derive(Serialize)]
pub struct CandidateResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub created_by: Option<Uuid>,
    pub created_at: String,
}

impl From<Candidate> for CandidateResponse {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            first_name: candidate.first_name,
            last_name: candidate.last_name,
            created_by: candidate.created_by,
            created_at: candidate.created_at.to_rfc3339(),
        }
    }
}

/// Create a new candidate
pub async fn create_candidate(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CandidateInput>,
) -> Result<(StatusCode, Json<CandidateResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let candidate = repo
        .create_candidate(request.first_name, request.last_name, Some(auth.user_id))
        .await?;

    tracing::info!(
        candidate_id = %candidate.id,
        created_by = %auth.user_id,
        "Candidate created"
    );

    Ok((StatusCode::CREATED, Json(candidate.into())))
}

/// List candidates
pub async fn list_candidates(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListResponse<CandidateResponse>>> {
    let repo = Repository::new(state.db.clone());
    let (candidates, total) = repo
        .list_candidates(pagination.offset, pagination.limit())
        .await?;

    Ok(Json(ListResponse {
        items: candidates.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a candidate by ID
pub async fn get_candidate(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateResponse>> {
    let repo = Repository::new(state.db.clone());
    let candidate = repo.get_candidate(id).await?;

    Ok(Json(candidate.into()))
}

/// Update a candidate's name
pub async fn update_candidate(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<CandidateInput>,
) -> Result<Json<CandidateResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let candidate = repo
        .update_candidate(id, request.first_name, request.last_name)
        .await?;

    Ok(Json(candidate.into()))
}

/// Delete a candidate
pub async fn delete_candidate(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());

    if !repo.delete_candidate(id).await? {
        return Err(AppError::CandidateNotFound { id: id.to_string() });
    }

    tracing::info!(candidate_id = %id, "Candidate deleted");

    Ok(StatusCode::NO_CONTENT)
}
