//! API handlers module

pub mod audit;
pub mod auth;
pub mod bio_items;
pub mod candidate_projects;
pub mod candidate_skills;
pub mod candidates;
pub mod contact_types;
pub mod contacts;
pub mod cv;
pub mod health;
pub mod projects;
pub mod skills;
pub mod summaries;

use serde::{Deserialize, Serialize};

/// Common pagination query parameters
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: u64,

    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    50
}

impl Pagination {
    /// Clamp the page size to something sane
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, 200)
    }
}

/// Envelope for paginated list responses
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
}
