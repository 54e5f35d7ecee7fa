//! Cosine similarity of one text embedding against the whole catalog.

use crate::catalog::{norm, unit, SymptomCatalog};
use crate::error::{DiagnosisError, Result, Stage};
use crate::models::SimilarityScores;

/// Scores `text` against every catalog entry in one pass over the
/// pre-normalized catalog matrix.
pub fn score(text: &[f32], catalog: &SymptomCatalog) -> Result<SimilarityScores> {
    if text.len() != catalog.dimension() {
        return Err(DiagnosisError::prediction(
            Stage::Matcher,
            format!(
                "text embedding has dimension {}, catalog expects {}",
                text.len(),
                catalog.dimension()
            ),
        ));
    }
    if text.iter().any(|v| !v.is_finite()) {
        return Err(DiagnosisError::prediction(
            Stage::Matcher,
            "text embedding has non-finite values",
        ));
    }

    let query = unit(text);
    let scores: Vec<f32> = catalog
        .unit_rows()
        .iter()
        .map(|row| dot(&query, row).clamp(-1.0, 1.0))
        .collect();
    Ok(SimilarityScores::new(scores))
}

/// Plain pairwise cosine similarity.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (na, nb) = (norm(a), norm(b));
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let ab: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    (ab / (na * nb)) as f32
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
