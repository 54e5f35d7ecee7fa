use crate::{ContentPart, GenerateResponse, GenerativeProvider, ProviderError};

/// Stand-in used when no API credentials are configured.
#[derive(Debug, Default)]
pub struct NoopProvider;

#[async_trait::async_trait]
impl GenerativeProvider for NoopProvider {
    async fn generate(&self, _parts: &[ContentPart]) -> Result<GenerateResponse, ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}
