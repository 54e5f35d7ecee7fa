use crate::catalog::SymptomCatalog;
use crate::classifier::{ClassifierAdapter, DiagnosisModel, LogisticRegression};
use crate::config::ClassificationConfig;
use crate::encoder::TextEncoder;
use crate::error::{DiagnosisError, Result, Stage};
use crate::vectorizer;
use std::sync::Arc;
use storage::PipelineBundle;
use tracing::info;

/// Everything a request needs, built once at startup and never mutated.
///
/// Share it behind an `Arc`; all methods take `&self`.
pub struct DiagnosisContext {
    catalog: SymptomCatalog,
    encoder: Arc<dyn TextEncoder>,
    classifier: ClassifierAdapter,
    policy: ClassificationConfig,
}

impl DiagnosisContext {
    pub fn new(
        catalog: SymptomCatalog,
        encoder: Arc<dyn TextEncoder>,
        model: Arc<dyn DiagnosisModel>,
        policy: ClassificationConfig,
    ) -> Result<Self> {
        vectorizer::check_threshold(policy.threshold).map_err(|_| {
            DiagnosisError::configuration(
                Stage::Vectorizer,
                format!("default threshold {} is not finite", policy.threshold),
            )
        })?;
        if encoder.dimension() != catalog.dimension() {
            return Err(DiagnosisError::configuration(
                Stage::Encoder,
                format!(
                    "encoder {} produces dimension {}, catalog embeddings have {}",
                    encoder.model_name(),
                    encoder.dimension(),
                    catalog.dimension()
                ),
            ));
        }
        let classifier = ClassifierAdapter::new(model);
        if classifier.n_features() != catalog.len() {
            return Err(DiagnosisError::configuration(
                Stage::Classifier,
                format!(
                    "classifier expects {} features, catalog has {} symptoms",
                    classifier.n_features(),
                    catalog.len()
                ),
            ));
        }
        info!(
            symptoms = catalog.len(),
            labels = classifier.labels().len(),
            encoder = encoder.model_name(),
            threshold = policy.threshold,
            "diagnosis context ready"
        );
        Ok(Self {
            catalog,
            encoder,
            classifier,
            policy,
        })
    }

    /// Builds the context from a loaded bundle and an encoder.
    pub fn from_bundle(
        bundle: PipelineBundle,
        encoder: Arc<dyn TextEncoder>,
        policy: ClassificationConfig,
    ) -> Result<Self> {
        let catalog = SymptomCatalog::new(bundle.symptom_columns, bundle.symptom_embeddings)?;
        let model = LogisticRegression::from_params(bundle.classifier_model)?;
        Self::new(catalog, encoder, Arc::new(model), policy)
    }

    pub fn catalog(&self) -> &SymptomCatalog {
        &self.catalog
    }

    pub fn encoder(&self) -> &dyn TextEncoder {
        self.encoder.as_ref()
    }

    pub fn classifier(&self) -> &ClassifierAdapter {
        &self.classifier
    }

    pub fn policy(&self) -> &ClassificationConfig {
        &self.policy
    }

    pub fn default_threshold(&self) -> f32 {
        self.policy.threshold
    }
}

impl std::fmt::Debug for DiagnosisContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosisContext")
            .field("symptoms", &self.catalog.len())
            .field("dimension", &self.catalog.dimension())
            .field("encoder", &self.encoder.model_name())
            .field("classifier", &self.classifier)
            .field("policy", &self.policy)
            .finish()
    }
}
