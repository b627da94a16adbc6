use crate::config::StageArtifactPaths;
use crate::error::{AppError, Result};
use ndarray::{Array1, Array2};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Token pattern matching the training pipeline's vectorizer (two or more
/// word characters).
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("invalid token pattern"));

/// Turns raw text into a dense feature vector.
pub trait TextEncoder: Send + Sync {
    /// Encode text; fails with `AppError::Encoding` for unusable input
    fn encode(&self, text: &str) -> Result<Array1<f64>>;

    /// Dimensionality of the produced feature vectors
    fn n_features(&self) -> usize;
}

/// Produces one probability per label for an encoded input.
pub trait MultiLabelModel: Send + Sync {
    /// Probability vector, positionally indexed against the stage's label index
    fn predict_proba(&self, features: &Array1<f64>) -> Result<Vec<f64>>;

    /// Number of labels this model scores
    fn n_labels(&self) -> usize;
}

/// TF-IDF text encoder with a fixed vocabulary and idf weights.
///
/// The vocabulary and idf values come from the training pipeline's fitted
/// vectorizer; encoding is lowercase tokenization, term counting, tf * idf,
/// then l2 normalization. Out-of-vocabulary tokens contribute nothing; a
/// document with no in-vocabulary tokens yields the zero vector (the
/// classifier then scores its intercepts only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfEncoder {
    /// Term -> column index
    vocabulary: HashMap<String, usize>,

    /// Inverse document frequency per column
    idf: Vec<f64>,
}

impl TfidfEncoder {
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Result<Self> {
        if idf.len() != vocabulary.len() {
            return Err(AppError::ArtifactLoad(format!(
                "Vectorizer idf length {} does not match vocabulary size {}",
                idf.len(),
                vocabulary.len()
            )));
        }
        Ok(Self { vocabulary, idf })
    }

    fn tokenize(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl TextEncoder for TfidfEncoder {
    fn encode(&self, text: &str) -> Result<Array1<f64>> {
        if text.trim().is_empty() {
            return Err(AppError::Encoding(
                "Cannot encode empty or whitespace-only text".to_string(),
            ));
        }

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in Self::tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut features = Array1::zeros(self.vocabulary.len());
        for (idx, tf) in counts {
            features[idx] = tf * self.idf[idx];
        }

        // l2 normalize; a zero vector (no known tokens) is left as-is
        let norm = features.dot(&features).sqrt();
        if norm > 0.0 {
            features.mapv_inplace(|v| v / norm);
        }

        Ok(features)
    }

    fn n_features(&self) -> usize {
        self.vocabulary.len()
    }
}

/// One-vs-rest logistic regression over TF-IDF features.
///
/// One weight row and intercept per label; probabilities are independent
/// per-label sigmoids, exactly as the training pipeline's
/// OneVsRestClassifier(LogisticRegression) produces them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticOvr {
    /// (n_labels, n_features) weight matrix
    weights: Array2<f64>,

    /// Per-label intercept
    intercepts: Array1<f64>,
}

impl LogisticOvr {
    pub fn new(weights: Array2<f64>, intercepts: Array1<f64>) -> Result<Self> {
        if weights.nrows() != intercepts.len() {
            return Err(AppError::ArtifactLoad(format!(
                "Classifier has {} weight rows but {} intercepts",
                weights.nrows(),
                intercepts.len()
            )));
        }
        Ok(Self {
            weights,
            intercepts,
        })
    }

    pub fn n_features(&self) -> usize {
        self.weights.ncols()
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }
}

impl MultiLabelModel for LogisticOvr {
    fn predict_proba(&self, features: &Array1<f64>) -> Result<Vec<f64>> {
        if features.len() != self.weights.ncols() {
            return Err(AppError::ModelInference(format!(
                "Feature vector has {} dimensions, classifier expects {}",
                features.len(),
                self.weights.ncols()
            )));
        }

        let scores = self.weights.dot(features) + &self.intercepts;
        let probs: Vec<f64> = scores.iter().map(|&z| Self::sigmoid(z)).collect();

        if probs.iter().any(|p| !p.is_finite()) {
            return Err(AppError::ModelInference(
                "Classifier produced non-finite probabilities".to_string(),
            ));
        }

        Ok(probs)
    }

    fn n_labels(&self) -> usize {
        self.weights.nrows()
    }
}

/// On-disk shape of a fitted vectorizer
#[derive(Debug, Serialize, Deserialize)]
struct VectorizerFile {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

/// On-disk shape of a fitted classifier
#[derive(Debug, Serialize, Deserialize)]
struct ModelFile {
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

/// On-disk shape of a fitted multi-label binarizer
#[derive(Debug, Serialize, Deserialize)]
struct LabelsFile {
    classes: Vec<String>,
}

/// One stage's trained artifacts: encoder, classifier and ordered label index.
///
/// Loaded exactly once at process start and never mutated afterwards; every
/// in-flight request reads the same instance concurrently without locking.
#[derive(Debug)]
pub struct ArtifactSet {
    pub encoder: TfidfEncoder,
    pub model: LogisticOvr,
    pub labels: Vec<String>,
}

impl ArtifactSet {
    /// Load and cross-check one stage's artifact triple.
    ///
    /// Fails with `AppError::ArtifactLoad` if any file is missing or corrupt,
    /// or if the three artifacts disagree on their shapes (which means they
    /// were not exported from the same training run).
    pub fn load(paths: &StageArtifactPaths) -> Result<Self> {
        let vectorizer: VectorizerFile = read_artifact(&paths.vectorizer)?;
        let model: ModelFile = read_artifact(&paths.model)?;
        let labels: LabelsFile = read_artifact(&paths.labels)?;

        let encoder = TfidfEncoder::new(vectorizer.vocabulary, vectorizer.idf)?;

        let n_labels = model.weights.len();
        let n_features = model.weights.first().map(|row| row.len()).unwrap_or(0);
        let flat: Vec<f64> = model.weights.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((n_labels, n_features), flat).map_err(|e| {
            AppError::ArtifactLoad(format!("Classifier weight matrix is ragged: {}", e))
        })?;
        let model = LogisticOvr::new(weights, Array1::from(model.intercepts))?;

        if labels.classes.is_empty() {
            return Err(AppError::ArtifactLoad(format!(
                "Label binarizer at {:?} has no classes",
                paths.labels
            )));
        }
        if model.n_labels() != labels.classes.len() {
            return Err(AppError::ArtifactLoad(format!(
                "Classifier scores {} labels but binarizer has {} classes",
                model.n_labels(),
                labels.classes.len()
            )));
        }
        if model.n_features() != encoder.n_features() {
            return Err(AppError::ArtifactLoad(format!(
                "Classifier expects {} features but vectorizer produces {}",
                model.n_features(),
                encoder.n_features()
            )));
        }

        tracing::info!(
            labels = labels.classes.len(),
            features = encoder.n_features(),
            "Artifact set loaded"
        );

        Ok(Self {
            encoder,
            model,
            labels: labels.classes,
        })
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| AppError::ArtifactLoad(format!("Cannot open {:?}: {}", path, e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::ArtifactLoad(format!("Cannot parse {:?}: {}", path, e)))
}
