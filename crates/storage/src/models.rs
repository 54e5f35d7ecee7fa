use serde::{Deserialize, Serialize};

/// On-disk pipeline bundle: symptom catalog plus serialized classifier.
///
/// Field names follow the training export so bundles produced there load
/// without a conversion step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineBundle {
    pub symptom_columns: Vec<String>,
    pub symptom_embeddings: Vec<Vec<f32>>,
    pub classifier_model: ClassifierParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierParams {
    LogisticRegression {
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
}
