//! Contact handlers
//!
//! Values are validated against the semantics of their contact type
//! (email address, phone number, profile URL) inside the repository.

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
    db::{models::Contact, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    pub candidate_id: Uuid,
    pub contact_type_id: Uuid,

    #[validate(length(min = 1, max = 255))]
    pub value: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContactRequest {
    #[validate(length(min = 1, max = 255))]
    pub value: String,
}

#[derive(Serialize)]
pub struct ContactResponse {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub contact_type_id: Uuid,
    pub value: String,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            candidate_id: contact.candidate_id,
            contact_type_id: contact.contact_type_id,
            value: contact.value,
        }
    }
}

/// Create a contact
pub async fn create_contact(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(request): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let contact = repo
        .create_contact(request.candidate_id, request.contact_type_id, request.value)
        .await?;

    Ok((StatusCode::CREATED, Json(contact.into())))
}

/// List contacts
pub async fn list_contacts(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListResponse<ContactResponse>>> {
    let repo = Repository::new(state.db.clone());
    let (contacts, total) = repo
        .list_contacts(pagination.offset, pagination.limit())
        .await?;

    Ok(Json(ListResponse {
        items: contacts.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a contact by ID
pub async fn get_contact(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactResponse>> {
    let repo = Repository::new(state.db.clone());
    let contact = repo
        .find_contact_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "contact".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(contact.into()))
}

/// Update a contact's value
pub async fn update_contact(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateContactRequest>,
) -> Result<Json<ContactResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let contact = repo.update_contact(id, request.value).await?;

    Ok(Json(contact.into()))
}

/// Delete a contact
pub async fn delete_contact(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());

    if !repo.delete_contact(id).await? {
        return Err(AppError::NotFound {
            resource_type: "contact".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
