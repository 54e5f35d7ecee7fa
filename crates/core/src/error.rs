use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Pipeline stage a failure originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Bundle,
    Catalog,
    Encoder,
    Matcher,
    Vectorizer,
    Classifier,
    Input,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Bundle => "bundle",
            Stage::Catalog => "catalog",
            Stage::Encoder => "encoder",
            Stage::Matcher => "matcher",
            Stage::Vectorizer => "vectorizer",
            Stage::Classifier => "classifier",
            Stage::Input => "input",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    Prediction,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Validation => "validation",
            ErrorKind::Prediction => "prediction",
        }
    }
}

/// Failures surfaced by the diagnosis pipeline.
///
/// Configuration errors are fatal at startup; validation and prediction
/// errors fail only the request that caused them.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("configuration error in {stage}: {message}")]
    Configuration { stage: Stage, message: String },
    #[error("invalid input at {stage}: {message}")]
    Validation { stage: Stage, message: String },
    #[error("prediction failed in {stage}: {message}")]
    Prediction { stage: Stage, message: String },
}

impl DiagnosisError {
    pub fn configuration(stage: Stage, message: impl Into<String>) -> Self {
        Self::Configuration {
            stage,
            message: message.into(),
        }
    }

    pub fn validation(stage: Stage, message: impl Into<String>) -> Self {
        Self::Validation {
            stage,
            message: message.into(),
        }
    }

    pub fn prediction(stage: Stage, message: impl Into<String>) -> Self {
        Self::Prediction {
            stage,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Prediction { .. } => ErrorKind::Prediction,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Configuration { stage, .. }
            | Self::Validation { stage, .. }
            | Self::Prediction { stage, .. } => *stage,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message, .. }
            | Self::Validation { message, .. }
            | Self::Prediction { message, .. } => message,
        }
    }
}

impl From<storage::StorageError> for DiagnosisError {
    fn from(e: storage::StorageError) -> Self {
        DiagnosisError::configuration(Stage::Bundle, e.to_string())
    }
}

pub type Result<T, E = DiagnosisError> = std::result::Result<T, E>;
