use crate::error::{DiagnosisError, Result, Stage};
use crate::models::SymptomVector;
use std::sync::Arc;
use storage::ClassifierParams;
use thiserror::Error;
use tracing::debug;

/// Failure inside a model's own inference call.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// A pretrained model mapping indicator vectors to diagnosis labels.
pub trait DiagnosisModel: Send + Sync {
    /// Number of input features the model was trained on.
    fn n_features(&self) -> usize;
    fn labels(&self) -> &[String];
    fn predict(&self, features: &[u8]) -> std::result::Result<String, ModelError>;
}

/// Linear model with sklearn `LogisticRegression.predict` semantics.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    n_features: usize,
}

impl LogisticRegression {
    pub fn new(classes: Vec<String>, coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> Result<Self> {
        let config_err = |msg: String| DiagnosisError::configuration(Stage::Classifier, msg);
        if classes.len() < 2 {
            return Err(config_err(format!(
                "classifier needs at least 2 classes, got {}",
                classes.len()
            )));
        }
        let expected_rows = if classes.len() == 2 { 1 } else { classes.len() };
        if coef.len() != expected_rows {
            return Err(config_err(format!(
                "{} classes require {} coefficient rows, got {}",
                classes.len(),
                expected_rows,
                coef.len()
            )));
        }
        if intercept.len() != coef.len() {
            return Err(config_err(format!(
                "{} intercepts for {} coefficient rows",
                intercept.len(),
                coef.len()
            )));
        }
        let n_features = coef[0].len();
        if coef.iter().any(|row| row.len() != n_features) {
            return Err(config_err("coefficient rows differ in width".into()));
        }
        let finite = coef.iter().flatten().chain(intercept.iter()).all(|v| v.is_finite());
        if !finite {
            return Err(config_err("classifier parameters are not finite".into()));
        }
        Ok(Self {
            classes,
            coef,
            intercept,
            n_features,
        })
    }

    pub fn from_params(params: ClassifierParams) -> Result<Self> {
        match params {
            ClassifierParams::LogisticRegression {
                classes,
                coef,
                intercept,
            } => Self::new(classes, coef, intercept),
        }
    }

    fn decision(&self, features: &[u8]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| {
                row.iter()
                    .zip(features)
                    .map(|(w, x)| w * f64::from(*x))
                    .sum::<f64>()
                    + b
            })
            .collect()
    }
}

impl DiagnosisModel for LogisticRegression {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn labels(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &[u8]) -> std::result::Result<String, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }
        let scores = self.decision(features);
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(ModelError("decision function is not finite".into()));
        }
        let idx = if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            // First maximum wins ties.
            let mut best = 0;
            for (i, s) in scores.iter().enumerate() {
                if *s > scores[best] {
                    best = i;
                }
            }
            best
        };
        Ok(self.classes[idx].clone())
    }
}

/// Guards a model behind the fixed-length indicator vector contract.
#[derive(Clone)]
pub struct ClassifierAdapter {
    model: Arc<dyn DiagnosisModel>,
    n_features: usize,
}

impl ClassifierAdapter {
    pub fn new(model: Arc<dyn DiagnosisModel>) -> Self {
        let n_features = model.n_features();
        Self { model, n_features }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn labels(&self) -> &[String] {
        self.model.labels()
    }

    pub fn predict(&self, vector: &SymptomVector) -> Result<String> {
        if vector.len() != self.n_features {
            return Err(DiagnosisError::validation(
                Stage::Classifier,
                format!(
                    "symptom vector has length {}, classifier expects {}",
                    vector.len(),
                    self.n_features
                ),
            ));
        }
        let label = self
            .model
            .predict(vector.as_slice())
            .map_err(|e| DiagnosisError::prediction(Stage::Classifier, e.to_string()))?;
        debug!(label = %label, present = vector.count_present(), "classified");
        Ok(label)
    }
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("n_features", &self.n_features)
            .field("labels", &self.model.labels())
            .finish()
    }
}
