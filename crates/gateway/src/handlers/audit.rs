//! Request audit log handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::handlers::{ListResponse, Pagination};
use crate::AppState;
use cvforge_common::{
    auth::AuthContext,
    db::{models::RequestLog, Repository},
    errors::Result,
};

#[derive(Serialize)]
pub struct RequestLogResponse {
    pub id: Uuid,
    pub timestamp: String,
    pub method: String,
    pub path: String,
    pub query_string: Option<String>,
    pub remote_ip: Option<String>,
    pub user_agent: Option<String>,
    pub user_id: Option<Uuid>,
}

impl From<RequestLog> for RequestLogResponse {
    fn from(log: RequestLog) -> Self {
        Self {
            id: log.id,
            timestamp: log.timestamp.to_rfc3339(),
            method: log.method,
            path: log.path,
            query_string: log.query_string,
            remote_ip: log.remote_ip,
            user_agent: log.user_agent,
            user_id: log.user_id,
        }
    }
}

/// List request logs, newest first
pub async fn list_request_logs(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListResponse<RequestLogResponse>>> {
    let repo = Repository::new(state.db.clone());
    let (logs, total) = repo
        .list_request_logs(pagination.offset, pagination.limit())
        .await?;

    Ok(Json(ListResponse {
        items: logs.into_iter().map(Into::into).collect(),
        total,
    }))
}
