//! Skill handlers

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
    db::{models::Skill, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct SkillInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Serialize)]
pub struct SkillResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Skill> for SkillResponse {
    fn from(skill: Skill) -> Self {
        Self {
            id: skill.id,
            name: skill.name,
        }
    }
}

/// Create a skill
pub async fn create_skill(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(request): Json<SkillInput>,
) -> Result<(StatusCode, Json<SkillResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let skill = repo.create_skill(request.name).await?;

    Ok((StatusCode::CREATED, Json(skill.into())))
}

/// List skills
pub async fn list_skills(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListResponse<SkillResponse>>> {
    let repo = Repository::new(state.db.clone());
    let (skills, total) = repo
        .list_skills(pagination.offset, pagination.limit())
        .await?;

    Ok(Json(ListResponse {
        items: skills.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a skill by ID
pub async fn get_skill(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<SkillResponse>> {
    let repo = Repository::new(state.db.clone());
    let skill = repo
        .find_skill_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "skill".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(skill.into()))
}

/// Rename a skill
pub async fn update_skill(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<SkillInput>,
) -> Result<Json<SkillResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let skill = repo.update_skill(id, request.name).await?;

    Ok(Json(skill.into()))
}

/// Delete a skill
pub async fn delete_skill(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());

    if !repo.delete_skill(id).await? {
        return Err(AppError::NotFound {
            resource_type: "skill".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
