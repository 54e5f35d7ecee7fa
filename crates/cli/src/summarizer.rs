use doctext_core::config::SummarizerConfig;
use providers::gemini::{GeminiConfig, GeminiProvider};
use providers::noop::NoopProvider;
use providers::summary::Summarizer;
use providers::ProviderRegistry;
use std::sync::Arc;
use tracing::{info, warn};

pub fn build_registry(config: &SummarizerConfig) -> ProviderRegistry {
    let mut reg = ProviderRegistry::new().with_generator("noop", Arc::new(NoopProvider));

    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => {
            let provider = GeminiProvider::new(GeminiConfig {
                api_key: key,
                base_url: config.base_url.clone(),
                model: config.model.clone(),
            });
            reg = reg.with_generator("gemini", Arc::new(provider));
            info!(model = %config.model, "GEMINI_API_KEY loaded");
        }
        _ => warn!("GEMINI_API_KEY not set; summarization requests will fail"),
    }

    reg.set_preferred(&config.provider)
}

/// Summarizer for the configured provider, falling back to the noop
/// provider when it is not available.
pub fn build_summarizer(config: &SummarizerConfig) -> Summarizer {
    let registry = build_registry(config);
    let provider = match registry.generator(None) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "summarizer falling back to noop provider");
            Arc::new(NoopProvider)
        }
    };
    Summarizer::new(provider)
}
