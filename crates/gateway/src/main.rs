//! CVForge API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Authentication and registration
//! - REST resources for candidates, bios, skills, projects, contacts
//! - CV detail, PDF export, and email delivery
//! - Request audit logging
//! - Rate limiting and observability

mod handlers;
mod middleware;

use axum::{
    routing::{get, post},
    Router,
};
use cvforge_common::{
    auth::{install_jwt_manager, JwtManager},
    config::AppConfig,
    db::DbPool,
    metrics,
    queue::{Queue, QueueConfig},
    translation::TranslationPipeline,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn, Level};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub queue: Option<Arc<Queue>>,
    pub translator: Option<Arc<TranslationPipeline>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting CVForge API Gateway v{}", cvforge_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();

    if config.observability.metrics_port > 0 {
        let exporter = PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], config.observability.metrics_port))
            .install();
        if let Err(e) = exporter {
            warn!(error = %e, "Failed to install Prometheus exporter");
        }
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Install the token manager
    match config.auth.jwt_secret.as_deref() {
        Some(secret) => {
            install_jwt_manager(JwtManager::new(secret, config.auth.jwt_expiration_secs))
        }
        None => warn!("auth.jwt_secret not set; authenticated endpoints will refuse requests"),
    }

    // Initialize the email queue
    let queue = match config.queue.email_queue_url.clone() {
        Some(url) => {
            info!(url = %url, "Connecting to email queue...");
            let queue_config = QueueConfig {
                url,
                dlq_url: config.queue.dlq_url.clone(),
                visibility_timeout: config.queue.visibility_timeout_secs as i32,
                wait_time_seconds: config.queue.poll_timeout_secs as i32,
                max_messages: config.queue.batch_size as i32,
            };
            Some(Arc::new(Queue::new(queue_config).await?))
        }
        None => {
            warn!("queue.email_queue_url not set; CV email delivery is disabled");
            None
        }
    };

    // Initialize the translation pipeline
    let translator = match TranslationPipeline::from_config(&config.translation) {
        Ok(pipeline) => Some(Arc::new(pipeline)),
        Err(e) => {
            warn!(error = %e, "Translation disabled");
            None
        }
    };

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        queue,
        translator,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Registration and token issuance (no auth)
        .route("/register", post(handlers::auth::register))
        .route("/token", post(handlers::auth::token))

        // Candidate endpoints
        .route(
            "/candidates",
            get(handlers::candidates::list_candidates).post(handlers::candidates::create_candidate),
        )
        .route(
            "/candidates/{id}",
            get(handlers::candidates::get_candidate)
                .put(handlers::candidates::update_candidate)
                .delete(handlers::candidates::delete_candidate),
        )

        // Bio endpoints
        .route(
            "/bio_items",
            get(handlers::bio_items::list_bio_items).post(handlers::bio_items::create_bio_item),
        )
        .route(
            "/bio_items/{id}",
            get(handlers::bio_items::get_bio_item)
                .put(handlers::bio_items::update_bio_item)
                .delete(handlers::bio_items::delete_bio_item),
        )

        // Skill endpoints
        .route(
            "/skills",
            get(handlers::skills::list_skills).post(handlers::skills::create_skill),
        )
        .route(
            "/skills/{id}",
            get(handlers::skills::get_skill)
                .put(handlers::skills::update_skill)
                .delete(handlers::skills::delete_skill),
        )

        // Candidate-skill associations: no update, delete cascades to orphans
        .route(
            "/candidate_skills",
            get(handlers::candidate_skills::list_candidate_skills)
                .post(handlers::candidate_skills::create_candidate_skill),
        )
        .route(
            "/candidate_skills/{id}",
            get(handlers::candidate_skills::get_candidate_skill)
                .delete(handlers::candidate_skills::delete_candidate_skill)
                .put(handlers::candidate_skills::update_not_allowed)
                .patch(handlers::candidate_skills::update_not_allowed),
        )

        // Project endpoints
        .route(
            "/projects",
            get(handlers::projects::list_projects).post(handlers::projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::projects::get_project)
                .put(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )

        // Candidate-project associations: same contract as candidate_skills
        .route(
            "/candidate_projects",
            get(handlers::candidate_projects::list_candidate_projects)
                .post(handlers::candidate_projects::create_candidate_project),
        )
        .route(
            "/candidate_projects/{id}",
            get(handlers::candidate_projects::get_candidate_project)
                .delete(handlers::candidate_projects::delete_candidate_project)
                .put(handlers::candidate_projects::update_not_allowed)
                .patch(handlers::candidate_projects::update_not_allowed),
        )

        // Contact type endpoints
        .route(
            "/contact_types",
            get(handlers::contact_types::list_contact_types)
                .post(handlers::contact_types::create_contact_type),
        )
        .route(
            "/contact_types/{id}",
            get(handlers::contact_types::get_contact_type)
                .put(handlers::contact_types::update_contact_type)
                .delete(handlers::contact_types::delete_contact_type),
        )

        // Contact endpoints
        .route(
            "/contacts",
            get(handlers::contacts::list_contacts).post(handlers::contacts::create_contact),
        )
        .route(
            "/contacts/{id}",
            get(handlers::contacts::get_contact)
                .put(handlers::contacts::update_contact)
                .delete(handlers::contacts::delete_contact),
        )

        // Read-only candidate summaries
        .route(
            "/candidate_summaries",
            get(handlers::summaries::list_candidate_summaries),
        )
        .route(
            "/candidate_summaries/{id}",
            get(handlers::summaries::get_candidate_summary),
        )

        // CV detail, PDF export, email delivery
        .route("/cv/{id}", get(handlers::cv::cv_detail))
        .route("/cv/{id}/pdf", get(handlers::cv::cv_pdf))
        .route("/cv/{id}/email", post(handlers::cv::send_cv_email))

        // Audit log
        .route("/audit/logs", get(handlers::audit::list_request_logs));

    // Rate limiting
    let limiter = middleware::rate_limit::create_rate_limiter(
        state.config.rate_limit.requests_per_second,
        state.config.rate_limit.burst,
    );
    let rate_limit_enabled = state.config.rate_limit.enabled;

    // Compose the app
    let mut app = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_log::request_log_middleware,
        ));

    if rate_limit_enabled {
        app = app.layer(axum::middleware::from_fn(
            move |request: axum::extract::Request, next: axum::middleware::Next| {
                let limiter = limiter.clone();
                middleware::rate_limit::rate_limit_middleware(request, next, limiter)
            },
        ));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
