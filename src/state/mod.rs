pub mod factory;
pub mod sled_store;
pub mod store;

pub use factory::create_store;
pub use sled_store::SledStore;
pub use store::InMemoryStore;

use crate::error::Result;
use crate::models::{Complaint, ComplaintStatus};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for complaint storage operations
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// Save a complaint
    async fn save_complaint(&self, complaint: &Complaint) -> Result<()>;

    /// Get a complaint by ID
    async fn get_complaint(&self, id: &Uuid) -> Result<Option<Complaint>>;

    /// Get a complaint by its human-facing reference
    async fn get_by_reference(&self, reference: &str) -> Result<Option<Complaint>>;

    /// Update a complaint
    async fn update_complaint(&self, complaint: &Complaint) -> Result<()>;

    /// List complaints with filtering
    async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Complaint>>;

    /// Count complaints matching filter
    async fn count_complaints(&self, filter: &ComplaintFilter) -> Result<u64>;
}

/// Filter for querying complaints
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub statuses: Vec<ComplaintStatus>,
    pub ministry: Option<String>,
    pub open_only: bool,
}

impl ComplaintFilter {
    /// Whether a complaint passes this filter
    pub fn matches(&self, complaint: &Complaint) -> bool {
        let status_match = self.statuses.is_empty() || self.statuses.contains(&complaint.status);

        let ministry_match = self
            .ministry
            .as_ref()
            .map(|m| complaint.ministries.iter().any(|c| c.contains(m.as_str())))
            .unwrap_or(true);

        let open_match = !self.open_only || complaint.is_open();

        status_match && ministry_match && open_match
    }
}
