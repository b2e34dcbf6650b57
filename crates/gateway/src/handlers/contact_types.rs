//! Contact type handlers

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
    db::{models::ContactType, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct ContactTypeInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[derive(Serialize)]
pub struct ContactTypeResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<ContactType> for ContactTypeResponse {
    fn from(contact_type: ContactType) -> Self {
        Self {
            id: contact_type.id,
            name: contact_type.name,
        }
    }
}

/// Create a contact type
pub async fn create_contact_type(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(request): Json<ContactTypeInput>,
) -> Result<(StatusCode, Json<ContactTypeResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let contact_type = repo.create_contact_type(request.name).await?;

    Ok((StatusCode::CREATED, Json(contact_type.into())))
}

/// List contact types
pub async fn list_contact_types(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListResponse<ContactTypeResponse>>> {
    let repo = Repository::new(state.db.clone());
    let (types, total) = repo
        .list_contact_types(pagination.offset, pagination.limit())
        .await?;

    Ok(Json(ListResponse {
        items: types.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a contact type by ID
pub async fn get_contact_type(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactTypeResponse>> {
    let repo = Repository::new(state.db.clone());
    let contact_type = repo
        .find_contact_type_by_id(id)
        .await?
        .ok_or_else(|| AppError::ContactTypeNotFound { id: id.to_string() })?;

    Ok(Json(contact_type.into()))
}

/// Rename a contact type
pub async fn update_contact_type(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<ContactTypeInput>,
) -> Result<Json<ContactTypeResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let contact_type = repo.update_contact_type(id, request.name).await?;

    Ok(Json(contact_type.into()))
}

/// Delete a contact type
pub async fn delete_contact_type(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());

    if !repo.delete_contact_type(id).await? {
        return Err(AppError::ContactTypeNotFound { id: id.to_string() });
    }

    Ok(StatusCode::NO_CONTENT)
}
