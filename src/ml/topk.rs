use crate::error::{AppError, Result};

/// Result of selecting the k most probable labels from a probability vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TopK {
    /// Selected (label index, probability) pairs, most probable first
    pub selected: Vec<(usize, f64)>,

    /// Highest probability anywhere in the vector, scaled to 0-100.
    ///
    /// Deliberately the maximum over the whole vector rather than an
    /// aggregate of the selected set; this matches the shipped behavior the
    /// rest of the system was tuned against.
    pub confidence: f64,
}

/// Select the `k` highest-probability label indices.
///
/// Ordering is probability descending; equal probabilities keep their
/// original index order, so the selection is fully deterministic. If the
/// vector has fewer than `k` entries, all of them are returned; `confidence`
/// reflects the global maximum regardless of `k`.
pub fn top_k(probs: &[f64], k: usize) -> Result<TopK> {
    if probs.is_empty() {
        return Err(AppError::EmptyLabelSpace(
            "Probability vector has no labels".to_string(),
        ));
    }

    let mut ranked: Vec<(usize, f64)> = probs.iter().copied().enumerate().collect();
    // Stable sort keeps first-found index order on ties
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    // Global maximum, taken before the cut so k = 0 cannot index out of range
    let confidence = ranked[0].1 * 100.0;
    ranked.truncate(k);

    Ok(TopK {
        selected: ranked,
        confidence,
    })
}
