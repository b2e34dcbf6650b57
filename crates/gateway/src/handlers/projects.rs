//! Project handlers

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
    db::{models::Project, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 1, max = 20000))]
    pub description: String,
}

#[derive(Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
        }
    }
}

/// Create a project
pub async fn create_project(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(request): Json<ProjectInput>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let project = repo.create_project(request.name, request.description).await?;

    Ok((StatusCode::CREATED, Json(project.into())))
}

/// List projects
pub async fn list_projects(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListResponse<ProjectResponse>>> {
    let repo = Repository::new(state.db.clone());
    let (projects, total) = repo
        .list_projects(pagination.offset, pagination.limit())
        .await?;

    Ok(Json(ListResponse {
        items: projects.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a project by ID
pub async fn get_project(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectResponse>> {
    let repo = Repository::new(state.db.clone());
    let project = repo
        .find_project_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "project".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(project.into()))
}

/// Update a project
pub async fn update_project(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<ProjectInput>,
) -> Result<Json<ProjectResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let project = repo
        .update_project(id, request.name, request.description)
        .await?;

    Ok(Json(project.into()))
}

/// Delete a project
pub async fn delete_project(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());

    if !repo.delete_project(id).await? {
        return Err(AppError::NotFound {
            resource_type: "project".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
