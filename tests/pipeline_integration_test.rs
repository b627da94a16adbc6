use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use complaint_triage::{
    api::{build_router, AppState},
    ml::{ArtifactSet, ComplaintClassifier, StagePipeline},
    models::ComplaintStatus,
    state::{ComplaintFilter, ComplaintStore, InMemoryStore},
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Write a small but realistic artifact pair to disk: the ministry stage
/// distinguishes water-supply complaints from law-and-order complaints; the
/// department stage keys off both the complaint text and the ministry labels
/// appended by the augmentation step.
fn write_artifacts(dir: &TempDir) -> (complaint_triage::config::StageArtifactPaths, complaint_triage::config::StageArtifactPaths) {
    let write = |name: &str, json: &str| {
        let path = dir.path().join(name);
        fs::write(&path, json).unwrap();
        path
    };

    let ministry_vectorizer = write(
        "vectorizer_ministry.json",
        r#"{
            "vocabulary": {"water": 0, "pipe": 1, "police": 2, "fir": 3},
            "idf": [1.0, 1.2, 1.0, 1.5]
        }"#,
    );
    let ministry_model = write(
        "model_ministry.json",
        r#"{
            "weights": [
                [5.0, 5.0, -5.0, -5.0],
                [-5.0, -5.0, 5.0, 5.0]
            ],
            "intercepts": [-1.0, -1.0]
        }"#,
    );
    let ministry_labels = write(
        "mlb_ministry.json",
        r#"{"classes": ["Ministry of Water Supply", "Ministry of Home Affairs"]}"#,
    );

    let department_vectorizer = write(
        "vectorizer_department.json",
        r#"{
            "vocabulary": {"police": 0, "fir": 1, "water": 2, "home": 3, "affairs": 4},
            "idf": [1.0, 1.5, 1.0, 1.1, 1.1]
        }"#,
    );
    let department_model = write(
        "model_department.json",
        r#"{
            "weights": [
                [4.0, 2.0, -4.0, 2.0, 2.0],
                [2.0, 4.0, -4.0, 1.0, 1.0],
                [-4.0, -4.0, 5.0, -2.0, -2.0]
            ],
            "intercepts": [-1.0, -1.0, -1.0]
        }"#,
    );
    let department_labels = write(
        "mlb_department.json",
        r#"{"classes": ["Police", "FIR Bureau", "Water Supply Department"]}"#,
    );

    (
        complaint_triage::config::StageArtifactPaths {
            vectorizer: ministry_vectorizer,
            model: ministry_model,
            labels: ministry_labels,
        },
        complaint_triage::config::StageArtifactPaths {
            vectorizer: department_vectorizer,
            model: department_model,
            labels: department_labels,
        },
    )
}

fn build_classifier(dir: &TempDir) -> Arc<ComplaintClassifier> {
    let (ministry_paths, department_paths) = write_artifacts(dir);

    let ministry = ArtifactSet::load(&ministry_paths).unwrap();
    let department = ArtifactSet::load(&department_paths).unwrap();

    Arc::new(ComplaintClassifier::new(
        Arc::new(StagePipeline::new("ministry", ministry)),
        Arc::new(StagePipeline::new("department", department)),
    ))
}

#[test]
fn test_classify_law_and_order_complaint() {
    let dir = TempDir::new().unwrap();
    let classifier = build_classifier(&dir);

    let result = classifier.classify("Police refusing to file FIR").unwrap();

    assert!(!result.ministries.is_empty() && result.ministries.len() <= 2);
    assert!(!result.departments.is_empty() && result.departments.len() <= 2);
    assert_eq!(result.ministries[0], "Ministry of Home Affairs");
    assert_ne!(result.departments[0], "Water Supply Department");
    assert!((0.0..=100.0).contains(&result.ministry_confidence));
    assert!((0.0..=100.0).contains(&result.department_confidence));
    assert!(result.confidence <= 100);
}

#[test]
fn test_classify_water_complaint() {
    let dir = TempDir::new().unwrap();
    let classifier = build_classifier(&dir);

    let result = classifier
        .classify("Broken water pipe flooding the street")
        .unwrap();

    assert_eq!(result.ministries[0], "Ministry of Water Supply");
    assert_eq!(result.departments[0], "Water Supply Department");
}

#[test]
fn test_classification_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let classifier = build_classifier(&dir);

    let a = classifier.classify("water pipe burst near the police post").unwrap();
    let b = classifier.classify("water pipe burst near the police post").unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_concurrent_classification_shares_artifacts() {
    let dir = TempDir::new().unwrap();
    let classifier = build_classifier(&dir);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let classifier = classifier.clone();
            std::thread::spawn(move || classifier.classify("no water in the tap").unwrap())
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_submit_complaint_persists_with_timeline() {
    let dir = TempDir::new().unwrap();
    let classifier = build_classifier(&dir);
    let store: Arc<dyn ComplaintStore> = Arc::new(InMemoryStore::new());

    let mut complaint = complaint_triage::models::Complaint::new(
        "FIR refused".to_string(),
        "Police refusing to file FIR".to_string(),
    );
    let result = classifier.classify(&complaint.text).unwrap();
    complaint.apply_classification(&result);
    store.save_complaint(&complaint).await.unwrap();

    let fetched = store.get_by_reference(&complaint.reference).await.unwrap().unwrap();
    assert_eq!(fetched.status, ComplaintStatus::Pending);
    assert_eq!(fetched.category.as_deref(), Some("Ministry of Home Affairs"));
    assert!(fetched.sub_category.is_some());
    assert_eq!(fetched.timeline.len(), 2);
    assert_eq!(fetched.timeline[1].step, "AI Classification Completed");

    let open = store
        .list_complaints(
            &ComplaintFilter {
                open_only: true,
                ..Default::default()
            },
            0,
            10,
        )
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn test_http_classify_endpoint() {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(build_classifier(&dir), Arc::new(InMemoryStore::new()));
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/classify")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"complaint": "water pipe leaking"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        json["ministries"][0].as_str().unwrap(),
        "Ministry of Water Supply"
    );
    assert!(json["confidence"].as_u64().unwrap() <= 100);
}

#[tokio::test]
async fn test_http_rejects_blank_complaint() {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(build_classifier(&dir), Arc::new(InMemoryStore::new()));
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/classify")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"complaint": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_http_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(build_classifier(&dir), Arc::new(InMemoryStore::new()));
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
