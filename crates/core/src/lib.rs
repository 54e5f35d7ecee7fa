//! Core library: symptom catalog, text encoding, similarity matching,
//! thresholding and diagnosis classification.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod context;
pub mod encoder;
pub mod error;
pub mod matcher;
pub mod models;
pub mod pipeline;
pub mod vectorizer;

pub use context::DiagnosisContext;
pub use error::{DiagnosisError, ErrorKind, Stage};
