use crate::ml::ClassificationResult;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// A citizen complaint registered with the triage system
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Complaint {
    /// Unique identifier
    pub id: Uuid,

    /// Human-facing reference, e.g. CPL-2026-3FA9B1
    pub reference: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Current status
    pub status: ComplaintStatus,

    /// Short title
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    /// Full complaint text
    pub text: String,

    /// Predicted ministries, most probable first
    pub ministries: Vec<String>,

    /// Predicted departments, most probable first
    pub departments: Vec<String>,

    /// Primary category (first predicted ministry)
    pub category: Option<String>,

    /// Primary sub-category (first predicted department)
    pub sub_category: Option<String>,

    /// Classification confidence (0-100)
    pub confidence: Option<u32>,

    /// Audit timeline
    pub timeline: Vec<TimelineEntry>,
}

impl Complaint {
    /// Register a new complaint
    pub fn new(title: String, text: String) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();

        Self {
            id,
            reference: Self::generate_reference(now),
            created_at: now,
            updated_at: now,
            status: ComplaintStatus::Registered,
            title,
            text,
            ministries: Vec::new(),
            departments: Vec::new(),
            category: None,
            sub_category: None,
            confidence: None,
            timeline: vec![TimelineEntry {
                timestamp: now,
                step: "Complaint Registered".to_string(),
                status: ComplaintStatus::Registered,
                note: "Complaint received by the triage system".to_string(),
                performed_by: "System".to_string(),
            }],
        }
    }

    /// Build a CPL-<year>-<6 hex> reference
    fn generate_reference(now: DateTime<Utc>) -> String {
        let suffix: String = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
        format!("CPL-{}-{}", now.year(), suffix)
    }

    /// Record a classification result: primary category fields come from the
    /// first (most probable) label of each stage.
    pub fn apply_classification(&mut self, result: &ClassificationResult) {
        self.ministries = result.ministries.clone();
        self.departments = result.departments.clone();
        self.category = result.ministries.first().cloned();
        self.sub_category = result.departments.first().cloned();
        self.confidence = Some(result.confidence);
        self.status = ComplaintStatus::Pending;
        self.updated_at = Utc::now();

        self.timeline.push(TimelineEntry {
            timestamp: self.updated_at,
            step: "AI Classification Completed".to_string(),
            status: ComplaintStatus::Pending,
            note: "Complaint automatically classified by ML system".to_string(),
            performed_by: "System".to_string(),
        });
    }

    /// Move the complaint to a new status, recording who did it
    pub fn update_status(&mut self, new_status: ComplaintStatus, actor: String, note: String) {
        let old_status = self.status.clone();
        self.status = new_status.clone();
        self.updated_at = Utc::now();

        self.timeline.push(TimelineEntry {
            timestamp: self.updated_at,
            step: format!("Status changed from {} to {}", old_status, new_status),
            status: new_status,
            note,
            performed_by: actor,
        });
    }

    /// Whether the complaint still needs handling
    pub fn is_open(&self) -> bool {
        !matches!(
            self.status,
            ComplaintStatus::Resolved | ComplaintStatus::Rejected
        )
    }
}

/// Complaint lifecycle status
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComplaintStatus {
    /// Received, not yet classified
    Registered,
    /// Classified, awaiting assignment
    Pending,
    /// Being handled by the responsible department
    InProgress,
    /// Closed successfully
    Resolved,
    /// Closed without action
    Rejected,
}

/// One audit timeline entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: DateTime<Utc>,
    pub step: String,
    pub status: ComplaintStatus,
    pub note: String,
    pub performed_by: String,
}
