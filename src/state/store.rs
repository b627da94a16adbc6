use crate::error::{AppError, Result};
use crate::models::Complaint;
use crate::state::{ComplaintFilter, ComplaintStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory complaint store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    complaints: Arc<DashMap<Uuid, Complaint>>,
    reference_index: Arc<DashMap<String, Uuid>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            complaints: Arc::new(DashMap::new()),
            reference_index: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComplaintStore for InMemoryStore {
    async fn save_complaint(&self, complaint: &Complaint) -> Result<()> {
        self.complaints.insert(complaint.id, complaint.clone());
        self.reference_index
            .insert(complaint.reference.clone(), complaint.id);

        tracing::debug!(complaint_id = %complaint.id, reference = %complaint.reference, "Complaint saved");
        Ok(())
    }

    async fn get_complaint(&self, id: &Uuid) -> Result<Option<Complaint>> {
        Ok(self.complaints.get(id).map(|entry| entry.clone()))
    }

    async fn get_by_reference(&self, reference: &str) -> Result<Option<Complaint>> {
        match self.reference_index.get(reference) {
            Some(id) => Ok(self.complaints.get(&id).map(|entry| entry.clone())),
            None => Ok(None),
        }
    }

    async fn update_complaint(&self, complaint: &Complaint) -> Result<()> {
        if self.complaints.contains_key(&complaint.id) {
            self.complaints.insert(complaint.id, complaint.clone());
            tracing::debug!(complaint_id = %complaint.id, "Complaint updated");
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Complaint {} not found",
                complaint.id
            )))
        }
    }

    async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Complaint>> {
        let mut complaints: Vec<Complaint> = self
            .complaints
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|complaint| filter.matches(complaint))
            .collect();

        // Sort by creation time (newest first)
        complaints.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let start = (page as usize).saturating_mul(page_size as usize);

        Ok(complaints
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect())
    }

    async fn count_complaints(&self, filter: &ComplaintFilter) -> Result<u64> {
        Ok(self
            .complaints
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count() as u64)
    }
}
