pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::{ml::ComplaintClassifier, state::ComplaintStore};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<ComplaintClassifier>,
    pub store: Arc<dyn ComplaintStore>,
}

impl AppState {
    pub fn new(classifier: Arc<ComplaintClassifier>, store: Arc<dyn ComplaintStore>) -> Self {
        Self { classifier, store }
    }
}
