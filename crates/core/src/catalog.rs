//! Symptom catalog: ordered symptom identifiers with one embedding each.

use crate::error::{DiagnosisError, Result, Stage};
use std::collections::HashSet;
use tracing::info;

/// Norm floor used when normalizing vectors, matching the usual
/// `x / max(|x|, eps)` convention so zero vectors score 0.
pub(crate) const NORM_EPS: f32 = 1e-12;

#[derive(Debug, Clone)]
pub struct SymptomCatalog {
    identifiers: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    // Row-normalized copy of `embeddings`, computed once at load.
    unit_rows: Vec<Vec<f32>>,
    dimension: usize,
}

impl SymptomCatalog {
    pub fn new(identifiers: Vec<String>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if identifiers.len() != embeddings.len() {
            return Err(DiagnosisError::configuration(
                Stage::Catalog,
                format!(
                    "{} symptom identifiers but {} embedding rows",
                    identifiers.len(),
                    embeddings.len()
                ),
            ));
        }
        if identifiers.is_empty() {
            return Err(DiagnosisError::configuration(
                Stage::Catalog,
                "symptom catalog is empty",
            ));
        }

        let mut seen = HashSet::with_capacity(identifiers.len());
        for id in &identifiers {
            if !seen.insert(id.as_str()) {
                return Err(DiagnosisError::configuration(
                    Stage::Catalog,
                    format!("duplicate symptom identifier {id:?}"),
                ));
            }
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(DiagnosisError::configuration(
                Stage::Catalog,
                "symptom embeddings have zero dimension",
            ));
        }
        for (i, row) in embeddings.iter().enumerate() {
            if row.len() != dimension {
                return Err(DiagnosisError::configuration(
                    Stage::Catalog,
                    format!(
                        "embedding for {:?} has dimension {}, expected {}",
                        identifiers[i],
                        row.len(),
                        dimension
                    ),
                ));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(DiagnosisError::configuration(
                    Stage::Catalog,
                    format!("embedding for {:?} has non-finite values", identifiers[i]),
                ));
            }
        }

        let unit_rows = embeddings.iter().map(|row| unit(row)).collect();
        info!(
            symptoms = identifiers.len(),
            dimension, "symptom catalog loaded"
        );
        Ok(Self {
            identifiers,
            embeddings,
            unit_rows,
            dimension,
        })
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn position(&self, identifier: &str) -> Option<usize> {
        self.identifiers.iter().position(|id| id == identifier)
    }

    pub(crate) fn unit_rows(&self) -> &[Vec<f32>] {
        &self.unit_rows
    }
}

// Squares are summed in f64 so large finite components cannot overflow the norm.
pub(crate) fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt()
}

pub(crate) fn unit(v: &[f32]) -> Vec<f32> {
    let norm = norm(v).max(f64::from(NORM_EPS));
    v.iter().map(|x| (f64::from(*x) / norm) as f32).collect()
}
