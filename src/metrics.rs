//! Prometheus metrics for the triage service.
//!
//! All metrics live in a dedicated registry so the exposition endpoint only
//! reports what this service owns.

use crate::error::{AppError, Result};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Histogram, HistogramOpts, Opts, Registry};

lazy_static! {
    /// Registry for all triage metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Total classification attempts
    ///
    /// Labels: outcome (ok, invalid_input, encoding_error, inference_error)
    pub static ref CLASSIFICATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("classifications_total", "Total classification attempts")
            .namespace("complaint_triage"),
        &["outcome"]
    ).expect("Failed to create CLASSIFICATIONS_TOTAL metric");

    /// End-to-end pipeline latency (both stages plus augmentation)
    pub static ref CLASSIFICATION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "classification_duration_seconds",
            "Two-stage classification duration in seconds"
        )
        .namespace("complaint_triage")
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0])
    ).expect("Failed to create CLASSIFICATION_DURATION_SECONDS metric");

    /// Complaints persisted through the submit endpoint
    pub static ref COMPLAINTS_SUBMITTED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("complaints_submitted_total", "Complaints registered and classified")
            .namespace("complaint_triage"),
        &["primary_ministry"]
    ).expect("Failed to create COMPLAINTS_SUBMITTED_TOTAL metric");
}

/// Register all metrics with the registry. Call once at startup.
pub fn init_metrics() -> Result<()> {
    PROMETHEUS_REGISTRY
        .register(Box::new(CLASSIFICATIONS_TOTAL.clone()))
        .map_err(|e| AppError::Internal(format!("Failed to register metric: {}", e)))?;
    PROMETHEUS_REGISTRY
        .register(Box::new(CLASSIFICATION_DURATION_SECONDS.clone()))
        .map_err(|e| AppError::Internal(format!("Failed to register metric: {}", e)))?;
    PROMETHEUS_REGISTRY
        .register(Box::new(COMPLAINTS_SUBMITTED_TOTAL.clone()))
        .map_err(|e| AppError::Internal(format!("Failed to register metric: {}", e)))?;

    Ok(())
}

/// Render all registered metrics in the Prometheus text format
pub fn gather() -> Result<String> {
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();
    let encoder = prometheus::TextEncoder::new();
    prometheus::Encoder::encode(&encoder, &metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;

    String::from_utf8(buffer)
        .map_err(|e| AppError::Internal(format!("Metrics are not valid UTF-8: {}", e)))
}

/// Outcome label for a classification result
pub fn outcome_label(result: &crate::error::Result<crate::ml::ClassificationResult>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(AppError::InvalidInput(_)) => "invalid_input",
        Err(AppError::Encoding(_)) => "encoding_error",
        Err(AppError::ModelInference(_)) => "inference_error",
        Err(_) => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_after_recording() {
        // Registration may already have happened in another test
        let _ = init_metrics();

        CLASSIFICATIONS_TOTAL.with_label_values(&["ok"]).inc();
        CLASSIFICATION_DURATION_SECONDS.observe(0.002);

        let text = gather().unwrap();
        assert!(text.contains("complaint_triage_classifications_total"));
        assert!(text.contains("complaint_triage_classification_duration_seconds"));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(
            outcome_label(&Err(AppError::InvalidInput("x".to_string()))),
            "invalid_input"
        );
        assert_eq!(
            outcome_label(&Err(AppError::Encoding("x".to_string()))),
            "encoding_error"
        );
        assert_eq!(
            outcome_label(&Err(AppError::Internal("x".to_string()))),
            "error"
        );
    }
}
