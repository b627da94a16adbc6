use crate::error::{AppError, Result};
use crate::ml::stage::{Stage, StagePrediction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Separator token placed between the complaint text and the stage-1 labels.
///
/// The department vectorizer was trained on text carrying this token, so the
/// augmented string must be built exactly as `{text} ministries {labels}`;
/// any other order degrades department accuracy without raising an error.
const AUGMENTATION_TOKEN: &str = "ministries";

/// Full two-stage classification result for one complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Predicted ministries, most probable first
    pub ministries: Vec<String>,

    /// Predicted departments, most probable first
    pub departments: Vec<String>,

    /// Ministry stage confidence (0-100)
    pub ministry_confidence: f64,

    /// Department stage confidence (0-100)
    pub department_confidence: f64,

    /// max(ministry, department) truncated to an integer percentage
    pub confidence: u32,
}

/// Sequences the ministry and department stages with label-conditioned text
/// augmentation in between.
///
/// Holds both stages behind `Arc<dyn Stage>`; constructed once at startup and
/// shared read-only across requests. A single `classify` call is synchronous
/// and CPU-bound; the department stage strictly follows the ministry stage
/// (hard data dependency, never parallelized). Stage failures propagate
/// unchanged; nothing here is transient, so there are no retries.
pub struct ComplaintClassifier {
    ministry_stage: Arc<dyn Stage>,
    department_stage: Arc<dyn Stage>,
}

impl ComplaintClassifier {
    pub fn new(ministry_stage: Arc<dyn Stage>, department_stage: Arc<dyn Stage>) -> Self {
        Self {
            ministry_stage,
            department_stage,
        }
    }

    /// Classify a complaint into ministries and departments.
    pub fn classify(&self, text: &str) -> Result<ClassificationResult> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput("complaint text required".to_string()));
        }

        let StagePrediction {
            labels: ministries,
            confidence: ministry_confidence,
        } = self.ministry_stage.predict(text)?;

        let augmented = Self::augment(text, &ministries);

        let StagePrediction {
            labels: departments,
            confidence: department_confidence,
        } = self.department_stage.predict(&augmented)?;

        let confidence = ministry_confidence.max(department_confidence).trunc() as u32;

        tracing::debug!(
            ministries = ?ministries,
            departments = ?departments,
            confidence,
            "Complaint classified"
        );

        Ok(ClassificationResult {
            ministries,
            departments,
            ministry_confidence,
            department_confidence,
            confidence,
        })
    }

    /// Build the stage-2 input: original text, separator token, then the
    /// space-joined ministry labels, in that exact order.
    fn augment(text: &str, ministries: &[String]) -> String {
        format!("{} {} {}", text, AUGMENTATION_TOKEN, ministries.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::stage::StagePrediction;
    use std::sync::Mutex;

    /// Stub stage returning a fixed prediction and recording the text it saw.
    struct StubStage {
        labels: Vec<String>,
        confidence: f64,
        received: Mutex<Option<String>>,
    }

    impl StubStage {
        fn new(labels: &[&str], confidence: f64) -> Arc<Self> {
            Arc::new(Self {
                labels: labels.iter().map(|s| s.to_string()).collect(),
                confidence,
                received: Mutex::new(None),
            })
        }

        fn received(&self) -> Option<String> {
            self.received.lock().unwrap().clone()
        }
    }

    impl Stage for StubStage {
        fn predict(&self, text: &str) -> crate::error::Result<StagePrediction> {
            *self.received.lock().unwrap() = Some(text.to_string());
            Ok(StagePrediction {
                labels: self.labels.clone(),
                confidence: self.confidence,
            })
        }
    }

    #[test]
    fn test_empty_text_rejected() {
        let classifier = ComplaintClassifier::new(
            StubStage::new(&["A"], 50.0),
            StubStage::new(&["B"], 50.0),
        );

        for text in ["", "   ", "\t\n"] {
            let err = classifier.classify(text).unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)), "text: {:?}", text);
        }
    }

    #[test]
    fn test_department_stage_sees_augmented_text() {
        let ministry = StubStage::new(&["Home Affairs", "Federal Affairs"], 80.0);
        let department = StubStage::new(&["Police"], 60.0);
        let classifier = ComplaintClassifier::new(ministry.clone(), department.clone());

        classifier.classify("Police refusing to file FIR").unwrap();

        assert_eq!(
            ministry.received().unwrap(),
            "Police refusing to file FIR"
        );
        assert_eq!(
            department.received().unwrap(),
            "Police refusing to file FIR ministries Home Affairs Federal Affairs"
        );
    }

    #[test]
    fn test_overall_confidence_is_truncated_max() {
        let cases = [
            (92.3, 81.0, 92u32),
            (40.9, 75.5, 75),
            (50.0, 50.0, 50),
            (0.4, 0.9, 0),
            (100.0, 99.9, 100),
        ];

        for (m, d, expected) in cases {
            let classifier = ComplaintClassifier::new(
                StubStage::new(&["M"], m),
                StubStage::new(&["D"], d),
            );
            let result = classifier.classify("some complaint").unwrap();
            assert_eq!(result.confidence, expected, "({}, {})", m, d);
            assert_eq!(result.ministry_confidence, m);
            assert_eq!(result.department_confidence, d);
        }
    }

    #[test]
    fn test_end_to_end_stub_scenario() {
        let classifier = ComplaintClassifier::new(
            StubStage::new(&["Home Affairs"], 92.3),
            StubStage::new(&["Police", "FIR Bureau"], 81.0),
        );

        let result = classifier.classify("Police refusing to file FIR").unwrap();

        assert_eq!(result.ministries, vec!["Home Affairs"]);
        assert_eq!(result.departments, vec!["Police", "FIR Bureau"]);
        assert_eq!(result.confidence, 92);
    }

    #[test]
    fn test_stage_errors_propagate_unchanged() {
        struct FailingStage;
        impl Stage for FailingStage {
            fn predict(&self, _text: &str) -> crate::error::Result<StagePrediction> {
                Err(AppError::ModelInference("boom".to_string()))
            }
        }

        let classifier = ComplaintClassifier::new(
            Arc::new(FailingStage),
            StubStage::new(&["D"], 50.0),
        );

        let err = classifier.classify("anything").unwrap_err();
        assert!(matches!(err, AppError::ModelInference(_)));
    }
}
