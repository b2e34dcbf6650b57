//! CV detail, PDF export, and email delivery handlers
//!
//! The detail and PDF endpoints accept an optional `?language=` and
//! degrade gracefully when translation fails: the original-language
//! context is served with an error notice instead of failing the
//! request. Email delivery is enqueued and never blocks the request.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::AppState;
use cvforge_common::{
    auth::AuthContext,
    cv::CvContext,
    db::Repository,
    errors::{AppError, Result},
    metrics::{record_translation, METRICS_PREFIX},
    pdf::render_cv_pdf,
    queue::CvEmailJobMessage,
};
use metrics::counter;

#[derive(Debug, Deserialize)]
pub struct CvQuery {
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendCvEmailRequest {
    pub email: String,
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct SendCvEmailResponse {
    pub detail: String,
}

/// Assemble the display context, applying best-effort translation
async fn assemble_context(
    state: &AppState,
    candidate_id: Uuid,
    language: Option<&str>,
) -> Result<CvContext> {
    let repo = Repository::new(state.db.clone());
    let summary = repo.candidate_summary(candidate_id).await?;
    let mut ctx = CvContext::build(summary, &state.config.translation);

    let Some(language) = language else {
        return Ok(ctx);
    };

    match &state.translator {
        Some(pipeline) => match pipeline.translate_context(language, &ctx).await {
            Ok(translated) => ctx = translated,
            Err(e) if e.is_translation_failure() => {
                record_translation(0.0, &state.config.translation.model, false);
                tracing::warn!(
                    candidate_id = %candidate_id,
                    language,
                    error = %e,
                    "Translation failed, serving original content"
                );
                ctx.error_message = Some(format!(
                    "Translation to {} failed; showing original content.",
                    language
                ));
            }
            Err(e) => return Err(e),
        },
        None => {
            ctx.error_message = Some("Translation is not configured.".to_string());
        }
    }

    Ok(ctx)
}

/// Get the CV display context, optionally translated
pub async fn cv_detail(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Query(query): Query<CvQuery>,
) -> Result<Json<CvContext>> {
    let ctx = assemble_context(&state, id, query.language.as_deref()).await?;
    Ok(Json(ctx))
}

/// Render the CV as a PDF download, optionally translated
pub async fn cv_pdf(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Query(query): Query<CvQuery>,
) -> Result<impl IntoResponse> {
    let ctx = assemble_context(&state, id, query.language.as_deref()).await?;
    let rendered = render_cv_pdf(&ctx)?;

    counter!(format!("{}_pdfs_rendered_total", METRICS_PREFIX)).increment(1);

    let disposition = format!("inline; filename=\"{}\"", rendered.filename);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered.bytes,
    ))
}

/// Enqueue email delivery of the rendered CV
///
/// The candidate lookup must succeed before anything is enqueued; the
/// worker recomputes the context and PDF out-of-band.
pub async fn send_cv_email(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<SendCvEmailRequest>,
) -> Result<(StatusCode, Json<SendCvEmailResponse>)> {
    if !request.email.validate_email() {
        return Err(AppError::Validation {
            message: "Please provide a valid email address.".to_string(),
            field: Some("email".to_string()),
        });
    }

    let repo = Repository::new(state.db.clone());
    let candidate = repo.get_candidate(id).await?;

    let queue = state.queue.as_ref().ok_or_else(|| AppError::ServiceUnavailable {
        message: "Email queue is not configured".to_string(),
    })?;

    let job = CvEmailJobMessage {
        candidate_id: candidate.id,
        first_name: candidate.first_name.clone(),
        last_name: candidate.last_name.clone(),
        recipient: request.email.clone(),
        language: request.language,
    };

    let message_id = queue.send(&job).await?;

    counter!(format!("{}_emails_enqueued_total", METRICS_PREFIX)).increment(1);

    tracing::info!(
        candidate_id = %candidate.id,
        message_id = %message_id,
        recipient = %request.email,
        "CV email job enqueued"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SendCvEmailResponse {
            detail: format!(
                "PDF for {} {} is being sent to {}.",
                candidate.first_name, candidate.last_name, request.email
            ),
        }),
    ))
}
