use crate::error::{DiagnosisError, Result, Stage};
use crate::models::{SimilarityScores, SymptomVector};

/// Thresholds similarity scores into a symptom indicator vector.
///
/// An entry is present only when its score is strictly greater than
/// `threshold`; a score equal to the threshold is absent.
pub fn vectorize(scores: &SimilarityScores, threshold: f32) -> Result<SymptomVector> {
    check_threshold(threshold)?;
    let bits = scores
        .as_slice()
        .iter()
        .map(|s| u8::from(*s > threshold))
        .collect();
    Ok(SymptomVector::from_bits(bits))
}

pub fn check_threshold(threshold: f32) -> Result<()> {
    if threshold.is_finite() {
        Ok(())
    } else {
        Err(DiagnosisError::validation(
            Stage::Vectorizer,
            format!("threshold must be a finite number, got {threshold}"),
        ))
    }
}
