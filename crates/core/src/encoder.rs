//! Text encoders turning free text into fixed-dimension embeddings.

use crate::error::Result;

/// Maps text to an embedding of `dimension()` values.
///
/// Implementations must be deterministic for a fixed model and input, and
/// must not keep per-call state. Empty text is valid input.
pub trait TextEncoder: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<f32>>;
    fn dimension(&self) -> usize;
    fn model_name(&self) -> &str;
}

#[cfg(feature = "local-encoder")]
pub use local::FastEmbedEncoder;

#[cfg(feature = "local-encoder")]
mod local {
    use super::TextEncoder;
    use crate::config::EncoderConfig;
    use crate::error::{DiagnosisError, Result, Stage};
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use std::path::PathBuf;
    use tracing::{debug, info};

    /// Sentence embedding model run through ONNX runtime.
    ///
    /// No execution providers are registered, so inference stays on the CPU
    /// for the life of the process.
    pub struct FastEmbedEncoder {
        model: TextEmbedding,
        name: String,
        dimension: usize,
    }

    impl FastEmbedEncoder {
        pub fn load(cfg: &EncoderConfig) -> Result<Self> {
            let (variant, dimension) = resolve(&cfg.model)?;
            let mut opts = InitOptions::new(variant).with_show_download_progress(false);
            if let Some(dir) = &cfg.cache_dir {
                opts = opts.with_cache_dir(PathBuf::from(dir));
            }
            if let Some(max_length) = cfg.max_length {
                opts = opts.with_max_length(max_length);
            }
            let model = TextEmbedding::try_new(opts).map_err(|e| {
                DiagnosisError::configuration(
                    Stage::Encoder,
                    format!("failed to load encoder {}: {e}", cfg.model),
                )
            })?;
            info!(model = %cfg.model, dimension, "text encoder ready");
            Ok(Self {
                model,
                name: cfg.model.clone(),
                dimension,
            })
        }
    }

    fn resolve(name: &str) -> Result<(EmbeddingModel, usize)> {
        let resolved = match name {
            "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
                (EmbeddingModel::AllMiniLML6V2, 384)
            }
            "all-MiniLM-L12-v2" | "sentence-transformers/all-MiniLM-L12-v2" => {
                (EmbeddingModel::AllMiniLML12V2, 384)
            }
            "bge-small-en-v1.5" | "BAAI/bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384),
            "bge-base-en-v1.5" | "BAAI/bge-base-en-v1.5" => (EmbeddingModel::BGEBaseENV15, 768),
            other => {
                return Err(DiagnosisError::configuration(
                    Stage::Encoder,
                    format!("unsupported encoder model {other:?}"),
                ))
            }
        };
        Ok(resolved)
    }

    impl TextEncoder for FastEmbedEncoder {
        fn encode(&self, text: &str) -> Result<Vec<f32>> {
            let mut out = self
                .model
                .embed(vec![text], None)
                .map_err(|e| DiagnosisError::prediction(Stage::Encoder, e.to_string()))?;
            let vector = out.pop().ok_or_else(|| {
                DiagnosisError::prediction(Stage::Encoder, "encoder returned no embedding")
            })?;
            if vector.len() != self.dimension {
                return Err(DiagnosisError::prediction(
                    Stage::Encoder,
                    format!(
                        "encoder returned dimension {}, expected {}",
                        vector.len(),
                        self.dimension
                    ),
                ));
            }
            debug!(chars = text.len(), "text encoded");
            Ok(vector)
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn model_name(&self) -> &str {
            &self.name
        }
    }
}
