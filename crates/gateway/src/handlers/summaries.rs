//! Candidate summary handlers
//!
//! Read-only consolidated view: identity, bio, deduplicated skills and
//! projects, and typed contacts.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::handlers::Pagination;
use crate::AppState;
use cvforge_common::{
    auth::AuthContext,
    db::{CandidateSummary, ContactSummary, ProjectSummary, Repository},
    errors::Result,
};

#[derive(Serialize)]
pub struct CandidateSummaryResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub projects: Vec<ProjectSummary>,
    pub contacts: Vec<ContactSummary>,
}

impl From<CandidateSummary> for CandidateSummaryResponse {
    fn from(summary: CandidateSummary) -> Self {
        Self {
            id: summary.id,
            first_name: summary.first_name,
            last_name: summary.last_name,
            bio: summary.bio,
            skills: summary.skills,
            projects: summary.projects,
            contacts: summary.contacts,
        }
    }
}

#[derive(Serialize)]
pub struct SummaryListResponse {
    pub items: Vec<CandidateSummaryResponse>,
    pub total: u64,
}

/// List candidate summaries
pub async fn list_candidate_summaries(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<SummaryListResponse>> {
    let repo = Repository::new(state.db.clone());
    let (candidates, total) = repo
        .list_candidates(pagination.offset, pagination.limit())
        .await?;

    let mut items = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        items.push(repo.candidate_summary(candidate.id).await?.into());
    }

    Ok(Json(SummaryListResponse { items, total }))
}

/// Get the summary for one candidate
pub async fn get_candidate_summary(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateSummaryResponse>> {
    let repo = Repository::new(state.db.clone());
    let summary = repo.candidate_summary(id).await?;

    Ok(Json(summary.into()))
}
