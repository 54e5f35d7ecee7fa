//! Storage layer: persisted pipeline bundle format.
//!
//! Holds the bundle schema and the JSON reader/writer used at startup.

pub mod models;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub use models::{ClassifierParams, PipelineBundle};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed bundle {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn read_bundle(path: &Path) -> Result<PipelineBundle, StorageError> {
    let raw = fs::read(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bundle: PipelineBundle =
        serde_json::from_slice(&raw).map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        path = %path.display(),
        symptoms = bundle.symptom_columns.len(),
        "bundle read"
    );
    Ok(bundle)
}

pub fn write_bundle(path: &Path, bundle: &PipelineBundle) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let body = serde_json::to_vec(bundle).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}
