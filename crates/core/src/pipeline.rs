use crate::config::AppConfig;
use crate::context::DiagnosisContext;
use crate::encoder::TextEncoder;
use crate::error::{DiagnosisError, Result, Stage};
use crate::models::{Analysis, Prediction, PredictionRequest, SimilarityScores, SymptomMatch, SymptomVector};
use crate::{matcher, vectorizer};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Encodes `text` and scores it against the catalog.
pub fn similarity_scores(ctx: &DiagnosisContext, text: &str) -> Result<SimilarityScores> {
    let embedding = ctx.encoder().encode(text)?;
    matcher::score(&embedding, ctx.catalog())
}

pub fn symptom_vector(ctx: &DiagnosisContext, text: &str, threshold: f32) -> Result<SymptomVector> {
    let scores = similarity_scores(ctx, text)?;
    vectorizer::vectorize(&scores, threshold)
}

pub fn predict(ctx: &DiagnosisContext, req: &PredictionRequest) -> Result<Prediction> {
    let threshold = req.threshold.unwrap_or_else(|| ctx.default_threshold());
    let vector = symptom_vector(ctx, &req.text, threshold)?;
    let label = classify(ctx, &vector)?;
    Ok(Prediction { label })
}

/// Like [`predict`], but also reports which symptoms matched and how well.
pub fn analyze(ctx: &DiagnosisContext, req: &PredictionRequest) -> Result<Analysis> {
    let threshold = req.threshold.unwrap_or_else(|| ctx.default_threshold());
    let scores = similarity_scores(ctx, &req.text)?;
    let vector = vectorizer::vectorize(&scores, threshold)?;
    let label = classify(ctx, &vector)?;

    let ids = ctx.catalog().identifiers();
    let mut matches: Vec<SymptomMatch> = vector
        .present_indices()
        .map(|i| SymptomMatch {
            symptom: ids[i].clone(),
            score: scores.as_slice()[i],
        })
        .collect();
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(Analysis {
        label,
        threshold,
        matches,
        vector,
    })
}

fn classify(ctx: &DiagnosisContext, vector: &SymptomVector) -> Result<String> {
    if ctx.policy().reject_empty_vector && vector.count_present() == 0 {
        return Err(DiagnosisError::validation(
            Stage::Input,
            "text matched no known symptoms",
        ));
    }
    debug!(present = vector.count_present(), "symptom vector built");
    ctx.classifier().predict(vector)
}

/// Loads the bundle named in `config` and assembles the context around
/// `encoder`.
pub fn build_context_with(
    config: &AppConfig,
    encoder: Arc<dyn TextEncoder>,
) -> Result<DiagnosisContext> {
    info!(path = %config.bundle.path, "loading pipeline bundle");
    let bundle = storage::read_bundle(Path::new(&config.bundle.path))?;
    DiagnosisContext::from_bundle(bundle, encoder, config.classification.clone())
}

/// Builds the production context: bundle from disk plus the local encoder.
pub fn build_context(config: &AppConfig) -> Result<DiagnosisContext> {
    let encoder = build_encoder(config)?;
    build_context_with(config, encoder)
}

#[cfg(feature = "local-encoder")]
pub fn build_encoder(config: &AppConfig) -> Result<Arc<dyn TextEncoder>> {
    let encoder = crate::encoder::FastEmbedEncoder::load(&config.encoder)?;
    Ok(Arc::new(encoder))
}

#[cfg(not(feature = "local-encoder"))]
pub fn build_encoder(config: &AppConfig) -> Result<Arc<dyn TextEncoder>> {
    Err(DiagnosisError::configuration(
        Stage::Encoder,
        format!(
            "encoder {} requested but this build lacks the local-encoder feature",
            config.encoder.model
        ),
    ))
}
