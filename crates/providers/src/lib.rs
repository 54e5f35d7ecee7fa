//! Provider abstractions for generative document models.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod gemini;
pub mod noop;
pub mod summary;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not implemented")]
    NotImplemented,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// One piece of a multimodal prompt.
#[derive(Debug, Clone)]
pub enum ContentPart {
    Text(String),
    InlineData { mime_type: String, data: Bytes },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Convenience text, when the provider returned a plain text answer.
    pub text: Option<String>,
    /// Full provider payload.
    pub raw: serde_json::Value,
}

#[async_trait::async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn generate(&self, parts: &[ContentPart]) -> Result<GenerateResponse, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    generators: HashMap<String, Arc<dyn GenerativeProvider>>,
    pub preferred: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator(mut self, name: &str, provider: Arc<dyn GenerativeProvider>) -> Self {
        self.generators.insert(name.to_string(), provider);
        self
    }

    pub fn set_preferred(mut self, name: &str) -> Self {
        self.preferred = Some(name.to_string());
        self
    }

    pub fn generator(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<dyn GenerativeProvider>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred.clone())
            .ok_or_else(|| {
                ProviderError::UnknownProvider("no generative provider configured".into())
            })?;
        self.generators
            .get(&key)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownProvider(key))
    }
}
