//! CVForge Common Library
//!
//! Shared code for the CVForge services including:
//! - Database models and repository patterns
//! - CV domain services (summary assembly, display context)
//! - Translation pipeline
//! - PDF rendering
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod cv;
pub mod db;
pub mod errors;
pub mod mailer;
pub mod metrics;
pub mod pdf;
pub mod queue;
pub mod translation;

// Re-export commonly used types
pub use config::AppConfig;
pub use cv::CvContext;
pub use db::{CandidateSummary, Repository};
pub use errors::{AppError, Result};
pub use translation::TranslationPipeline;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default translation model
pub const DEFAULT_TRANSLATION_MODEL: &str = "gpt-4o";
