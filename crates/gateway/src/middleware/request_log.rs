//! Request audit middleware
//!
//! Records every inbound request to the append-only audit log after the
//! response is produced. The insert runs on a spawned task; a failed
//! write warns and never fails the request.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use metrics::counter;

use crate::AppState;
use cvforge_common::{
    auth,
    db::Repository,
    metrics::METRICS_PREFIX,
};

/// Resolve the client IP: first X-Forwarded-For entry, else X-Real-IP
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        })
}

/// Audit middleware: capture request metadata, run the request, append
pub async fn request_log_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query_string = request.uri().query().map(String::from);

    let headers = request.headers();
    let remote_ip = client_ip(headers);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let user_id = auth::decode_user(headers).map(|(id, _)| id);

    let response = next.run(request).await;

    let repo = Repository::new(state.db.clone());
    tokio::spawn(async move {
        match repo
            .insert_request_log(method, path, query_string, remote_ip, user_agent, user_id)
            .await
        {
            Ok(_) => {
                counter!(format!("{}_request_logs_total", METRICS_PREFIX)).increment(1);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to write request log");
            }
        }
    });

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_client_ip_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_client_ip_absent() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);
    }
}
