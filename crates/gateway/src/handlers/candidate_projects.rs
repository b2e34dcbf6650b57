//! Candidate-project association handlers
//!
//! Same contract as candidate-skill links: create/read/delete with
//! orphan cleanup on delete, 405 on any update attempt.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::{ListResponse, Pagination};
use crate::AppState;
use cvforge_common::{
    auth::AuthContext,
    db::{models::CandidateProject, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct CreateCandidateProjectRequest {
    pub candidate_id: Uuid,
    pub project_id: Uuid,
}

#[derive(Serialize)]
pub struct CandidateProjectResponse {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub project_id: Uuid,
}

impl From<CandidateProject> for CandidateProjectResponse {
    fn from(link: CandidateProject) -> Self {
        Self {
            id: link.id,
            candidate_id: link.candidate_id,
            project_id: link.project_id,
        }
    }
}

#[derive(Serialize)]
pub struct DeleteCandidateProjectResponse {
    pub detail: String,
    pub project_removed: bool,
}

/// Link a candidate to a project
pub async fn create_candidate_project(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(request): Json<CreateCandidateProjectRequest>,
) -> Result<(StatusCode, Json<CandidateProjectResponse>)> {
    let repo = Repository::new(state.db.clone());
    let link = repo
        .create_candidate_project(request.candidate_id, request.project_id)
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// List candidate-project links
pub async fn list_candidate_projects(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListResponse<CandidateProjectResponse>>> {
    let repo = Repository::new(state.db.clone());
    let (links, total) = repo
        .list_candidate_projects(pagination.offset, pagination.limit())
        .await?;

    Ok(Json(ListResponse {
        items: links.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a candidate-project link by ID
pub async fn get_candidate_project(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateProjectResponse>> {
    let repo = Repository::new(state.db.clone());
    let link = repo
        .find_candidate_project_by_id(id)
        .await?
        .ok_or_else(|| AppError::AssociationNotFound { id: id.to_string() })?;

    Ok(Json(link.into()))
}

/// Delete a candidate-project link, cascading to an orphaned project
pub async fn delete_candidate_project(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteCandidateProjectResponse>> {
    let repo = Repository::new(state.db.clone());
    let project_removed = repo.delete_candidate_project(id).await?;

    Ok(Json(DeleteCandidateProjectResponse {
        detail: "CandidateProject and orphaned Project (if any) deleted.".to_string(),
        project_removed,
    }))
}

/// Associations are append/delete-only; replacement is never supported
pub async fn update_not_allowed(_auth: AuthContext) -> Result<StatusCode> {
    Err(AppError::MethodNotAllowed {
        resource: "candidate_projects".to_string(),
    })
}
