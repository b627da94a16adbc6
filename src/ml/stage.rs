use crate::error::{AppError, Result};
use crate::ml::artifacts::{ArtifactSet, MultiLabelModel, TextEncoder};
use crate::ml::topk::top_k;

/// Number of labels each stage selects
pub const STAGE_TOP_K: usize = 2;

/// One stage's prediction: the selected labels (most probable first) and the
/// stage confidence as a 0-100 percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePrediction {
    pub labels: Vec<String>,
    pub confidence: f64,
}

/// A classification stage: text in, label selection plus confidence out.
///
/// Implemented by `StagePipeline` for real inference; tests substitute stubs.
pub trait Stage: Send + Sync {
    fn predict(&self, text: &str) -> Result<StagePrediction>;
}

/// Wraps one artifact set behind the `Stage` contract.
///
/// Stateless across calls; encode and predict run to completion with no
/// suspension points, so concurrent requests share the artifacts freely.
pub struct StagePipeline {
    name: &'static str,
    artifacts: ArtifactSet,
}

impl StagePipeline {
    pub fn new(name: &'static str, artifacts: ArtifactSet) -> Self {
        Self { name, artifacts }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Stage for StagePipeline {
    fn predict(&self, text: &str) -> Result<StagePrediction> {
        let features = self.artifacts.encoder.encode(text)?;
        let probs = self.artifacts.model.predict_proba(&features)?;

        if probs.len() != self.artifacts.labels.len() {
            return Err(AppError::ModelInference(format!(
                "{} stage produced {} probabilities for {} labels",
                self.name,
                probs.len(),
                self.artifacts.labels.len()
            )));
        }

        let ranked = top_k(&probs, STAGE_TOP_K)?;
        let labels: Vec<String> = ranked
            .selected
            .iter()
            .map(|&(idx, _)| self.artifacts.labels[idx].clone())
            .collect();

        tracing::debug!(
            stage = self.name,
            labels = ?labels,
            confidence = ranked.confidence,
            "Stage prediction"
        );

        Ok(StagePrediction {
            labels,
            confidence: ranked.confidence,
        })
    }
}
