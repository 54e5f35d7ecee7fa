use serde::{Deserialize, Serialize};

/// Default similarity cutoff. Kept as a tuned policy value, not derived.
pub const DEFAULT_THRESHOLD: f32 = 0.45;

/// Per-request text embedding.
pub type TextEmbedding = Vec<f32>;

/// One cosine score per catalog entry, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityScores(Vec<f32>);

impl SimilarityScores {
    pub fn new(scores: Vec<f32>) -> Self {
        Self(scores)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Binary symptom indicator vector aligned with the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomVector(Vec<u8>);

impl SymptomVector {
    pub fn from_bits(bits: Vec<u8>) -> Self {
        Self(bits.into_iter().map(|b| u8::from(b != 0)).collect())
    }

    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn count_present(&self) -> usize {
        self.0.iter().filter(|b| **b == 1).count()
    }

    pub fn present_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == 1)
            .map(|(i, _)| i)
    }
}

/// Core input. A missing threshold falls back to the configured default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub text: String,
    #[serde(default)]
    pub threshold: Option<f32>,
}

impl PredictionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymptomMatch {
    pub symptom: String,
    pub score: f32,
}

/// Prediction plus the symptoms that drove it.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub label: String,
    pub threshold: f32,
    pub matches: Vec<SymptomMatch>,
    pub vector: SymptomVector,
}
