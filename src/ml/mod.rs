/// Two-stage complaint classification.
///
/// Stage 1 predicts the responsible ministries from the raw complaint text;
/// stage 2 re-encodes the text augmented with the stage-1 labels and predicts
/// the departments. Trained artifacts (vectorizer, classifier, label index
/// per stage) are loaded once at startup and shared read-only.
pub mod artifacts;
pub mod pipeline;
pub mod stage;
pub mod topk;

pub use artifacts::{ArtifactSet, LogisticOvr, MultiLabelModel, TextEncoder, TfidfEncoder};
pub use pipeline::{ClassificationResult, ComplaintClassifier};
pub use stage::{Stage, StagePipeline, StagePrediction, STAGE_TOP_K};
pub use topk::{top_k, TopK};
