use crate::models::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bundle: BundleConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    pub path: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            path: "DoctorTextPipeline.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub model: String,
    pub cache_dir: Option<String>,
    pub max_length: Option<usize>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            cache_dir: None,
            max_length: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub threshold: f32,
    /// Reject all-zero symptom vectors instead of classifying them.
    pub reject_empty_vector: bool,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            reject_empty_vector: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub request_timeout_secs: u64,
    /// Allow cross-origin browser calls from any origin.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
            cors: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::with_prefix("DOCTEXT").separator("__"));
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("doctext.toml");
        std::fs::write(
            &path,
            "[bundle]\npath = \"/srv/pipeline.json\"\n\n[classification]\nthreshold = 0.5\n",
        )
        .unwrap();

        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.bundle.path, "/srv/pipeline.json");
        assert_eq!(cfg.classification.threshold, 0.5);
        assert!(!cfg.classification.reject_empty_vector);
        assert_eq!(cfg.encoder.model, "all-MiniLM-L6-v2");
        assert_eq!(cfg.server.request_timeout_secs, 30);
    }

    #[test]
    fn partial_sections_fill_missing_keys() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("doctext.toml");
        std::fs::write(
            &path,
            "[server]\nbind = \"0.0.0.0:9000\"\n\n[classification]\nreject_empty_vector = true\n",
        )
        .unwrap();

        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert_eq!(cfg.server.request_timeout_secs, 30);
        assert!(cfg.server.cors);
        assert!(cfg.classification.reject_empty_vector);
        assert_eq!(cfg.classification.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn default_threshold_is_policy_value() {
        assert_eq!(AppConfig::default().classification.threshold, 0.45);
    }
}
