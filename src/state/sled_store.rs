use crate::error::{AppError, Result};
use crate::models::Complaint;
use crate::state::{ComplaintFilter, ComplaintStore};
use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Persistent complaint store using the Sled embedded database
#[derive(Clone)]
pub struct SledStore {
    _db: Arc<Db>,
    complaints_tree: sled::Tree,
    reference_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(&path)
            .map_err(|e| AppError::Database(format!("Failed to open Sled database: {}", e)))?;

        let complaints_tree = db
            .open_tree("complaints")
            .map_err(|e| AppError::Database(format!("Failed to open complaints tree: {}", e)))?;

        let reference_tree = db
            .open_tree("references")
            .map_err(|e| AppError::Database(format!("Failed to open references tree: {}", e)))?;

        tracing::info!("Initialized Sled store at {:?}", path.as_ref());

        Ok(Self {
            _db: Arc::new(db),
            complaints_tree,
            reference_tree,
        })
    }

    fn serialize_complaint(complaint: &Complaint) -> Result<Vec<u8>> {
        bincode::serialize(complaint)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize complaint: {}", e)))
    }

    fn deserialize_complaint(bytes: &[u8]) -> Result<Complaint> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to deserialize complaint: {}", e)))
    }

    fn complaint_key(id: &Uuid) -> Vec<u8> {
        id.as_bytes().to_vec()
    }

    fn iter_complaints(&self) -> impl Iterator<Item = Result<Complaint>> + '_ {
        self.complaints_tree.iter().map(|entry| {
            let (_, value) =
                entry.map_err(|e| AppError::Database(format!("Sled iteration failed: {}", e)))?;
            Self::deserialize_complaint(&value)
        })
    }
}

#[async_trait]
impl ComplaintStore for SledStore {
    async fn save_complaint(&self, complaint: &Complaint) -> Result<()> {
        let serialized = Self::serialize_complaint(complaint)?;

        self.complaints_tree
            .insert(Self::complaint_key(&complaint.id), serialized)
            .map_err(|e| AppError::Database(format!("Failed to save complaint: {}", e)))?;

        self.reference_tree
            .insert(
                complaint.reference.as_bytes(),
                complaint.id.as_bytes().to_vec(),
            )
            .map_err(|e| AppError::Database(format!("Failed to update reference index: {}", e)))?;

        tracing::debug!(complaint_id = %complaint.id, reference = %complaint.reference, "Complaint saved");
        Ok(())
    }

    async fn get_complaint(&self, id: &Uuid) -> Result<Option<Complaint>> {
        let bytes = self
            .complaints_tree
            .get(Self::complaint_key(id))
            .map_err(|e| AppError::Database(format!("Failed to read complaint: {}", e)))?;

        bytes
            .map(|b| Self::deserialize_complaint(&b))
            .transpose()
    }

    async fn get_by_reference(&self, reference: &str) -> Result<Option<Complaint>> {
        let id_bytes = self
            .reference_tree
            .get(reference.as_bytes())
            .map_err(|e| AppError::Database(format!("Failed to read reference index: {}", e)))?;

        match id_bytes {
            Some(bytes) => {
                let id = Uuid::from_slice(&bytes).map_err(|e| {
                    AppError::Database(format!("Corrupt reference index entry: {}", e))
                })?;
                self.get_complaint(&id).await
            }
            None => Ok(None),
        }
    }

    async fn update_complaint(&self, complaint: &Complaint) -> Result<()> {
        let key = Self::complaint_key(&complaint.id);

        let exists = self
            .complaints_tree
            .contains_key(&key)
            .map_err(|e| AppError::Database(format!("Failed to read complaint: {}", e)))?;

        if !exists {
            return Err(AppError::NotFound(format!(
                "Complaint {} not found",
                complaint.id
            )));
        }

        let serialized = Self::serialize_complaint(complaint)?;
        self.complaints_tree
            .insert(key, serialized)
            .map_err(|e| AppError::Database(format!("Failed to update complaint: {}", e)))?;

        tracing::debug!(complaint_id = %complaint.id, "Complaint updated");
        Ok(())
    }

    async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Complaint>> {
        let mut complaints = Vec::new();
        for complaint in self.iter_complaints() {
            let complaint = complaint?;
            if filter.matches(&complaint) {
                complaints.push(complaint);
            }
        }

        complaints.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let start = (page as usize).saturating_mul(page_size as usize);

        Ok(complaints
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect())
    }

    async fn count_complaints(&self, filter: &ComplaintFilter) -> Result<u64> {
        let mut count = 0u64;
        for complaint in self.iter_complaints() {
            if filter.matches(&complaint?) {
                count += 1;
            }
        }
        Ok(count)
    }
}
