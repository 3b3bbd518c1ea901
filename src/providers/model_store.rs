//! Model Store
//!
//! Persists a `LogisticModel` as pretty-printed JSON at a caller-chosen
//! location. Floats round-trip exactly (serde_json `float_roundtrip`).
//! Saves go through a sibling `.tmp` file and a rename, so a failed write
//! leaves any earlier artifact intact. Concurrent saves to one location:
//! last successful rename wins.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::model::LogisticModel;
use crate::models::errors::{AppError, AppResult, ErrorCode};

/// Artifact location handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an artifact is present
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the model, creating missing parent directories
    pub fn save(&self, model: &LogisticModel) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(model)
            .map_err(|e| AppError::with_source(ErrorCode::Unknown, "model serialization failed", e))?;
        // write a sibling file then rename, so readers never see a partial artifact
        let tmp_path = self.path.with_extension("tmp");
        if let Err(err) = fs::write(&tmp_path, json).and_then(|_| fs::rename(&tmp_path, &self.path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(AppError::with_source(
                ErrorCode::StoreIo,
                format!("failed to write model artifact {}", self.path.display()),
                err,
            ));
        }
        info!("💾 Model saved to {}", self.path.display());
        Ok(())
    }

    /// Read and validate the model; `MODEL_NOT_FOUND` if absent
    pub fn load(&self) -> AppResult<LogisticModel> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::model_not_found(self.path.display()));
            }
            Err(e) => return Err(e.into()),
        };
        // deserialization runs LogisticModel::validate
        let model: LogisticModel = serde_json::from_str(&raw)?;
        debug!("📂 Model loaded from {}", self.path.display());
        Ok(model)
    }
}

/// Save `model` to `path`
pub fn save_model(model: &LogisticModel, path: impl AsRef<Path>) -> AppResult<()> {
    ModelStore::new(path.as_ref()).save(model)
}

/// Load a model from `path`
pub fn load_model(path: impl AsRef<Path>) -> AppResult<LogisticModel> {
    ModelStore::new(path.as_ref()).load()
}
