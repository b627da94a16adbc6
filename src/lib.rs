//! Complaint triage service.
//!
//! Classifies free-text citizen complaints into responsible government
//! ministries and departments with a two-stage multi-label classifier, serves
//! predictions over HTTP, and persists registered complaints with an audit
//! timeline.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod state;
