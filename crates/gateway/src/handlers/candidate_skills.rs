//! Candidate-skill association handlers
//!
//! Create/read/delete only. Deleting a link applies the orphan-cleanup
//! policy; update-style requests are a contract violation and answer
//! 405 in all cases.

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
    db::{models::CandidateSkill, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct CreateCandidateSkillRequest {
    pub candidate_id: Uuid,
    pub skill_id: Uuid,
}

#[derive(Serialize)]
pub struct CandidateSkillResponse {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub skill_id: Uuid,
}

impl From<CandidateSkill> for CandidateSkillResponse {
    fn from(link: CandidateSkill) -> Self {
        Self {
            id: link.id,
            candidate_id: link.candidate_id,
            skill_id: link.skill_id,
        }
    }
}

#[derive(Serialize)]
pub struct DeleteCandidateSkillResponse {
    pub detail: String,
    pub skill_removed: bool,
}

/// Link a candidate to a skill
pub async fn create_candidate_skill(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(request): Json<CreateCandidateSkillRequest>,
) -> Result<(StatusCode, Json<CandidateSkillResponse>)> {
    let repo = Repository::new(state.db.clone());
    let link = repo
        .create_candidate_skill(request.candidate_id, request.skill_id)
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// List candidate-skill links
pub async fn list_candidate_skills(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListResponse<CandidateSkillResponse>>> {
    let repo = Repository::new(state.db.clone());
    let (links, total) = repo
        .list_candidate_skills(pagination.offset, pagination.limit())
        .await?;

    Ok(Json(ListResponse {
        items: links.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a candidate-skill link by ID
pub async fn get_candidate_skill(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateSkillResponse>> {
    let repo = Repository::new(state.db.clone());
    let link = repo
        .find_candidate_skill_by_id(id)
        .await?
        .ok_or_else(|| AppError::AssociationNotFound { id: id.to_string() })?;

    Ok(Json(link.into()))
}

/// Delete a candidate-skill link, cascading to an orphaned skill
pub async fn delete_candidate_skill(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteCandidateSkillResponse>> {
    let repo = Repository::new(state.db.clone());
    let skill_removed = repo.delete_candidate_skill(id).await?;

    Ok(Json(DeleteCandidateSkillResponse {
        detail: "CandidateSkill and orphaned Skill (if any) deleted.".to_string(),
        skill_removed,
    }))
}

/// Associations are append/delete-only; replacement is never supported
pub async fn update_not_allowed(_auth: AuthContext) -> Result<StatusCode> {
    Err(AppError::MethodNotAllowed {
        resource: "candidate_skills".to_string(),
    })
}
