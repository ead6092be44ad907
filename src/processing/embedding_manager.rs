//! Embedding model management for downloading and locating Model2Vec models

use crate::config::AvailableModel;
use crate::error::{Result, RankerError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files Model2Vec needs to load a model from disk
const REQUIRED_FILES: [&str; 3] = ["tokenizer.json", "model.safetensors", "config.json"];
const OPTIONAL_FILES: [&str; 1] = ["README.md"];

/// Manager for embedding models - handles download and lookup
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: BTreeMap<String, AvailableModel>,
    downloaded_models: HashSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf, available: &[AvailableModel]) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                RankerError::Configuration(format!("Failed to create models directory: {}", e))
            })?;
        }

        let mut manager = Self {
            models_dir,
            available_models: available
                .iter()
                .map(|m| (m.name.clone(), m.clone()))
                .collect(),
            downloaded_models: HashSet::new(),
        };

        manager.scan_downloaded_models().await?;
        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && Self::is_valid_model_directory(&entry.path()).await {
                self.downloaded_models
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    async fn is_valid_model_directory(path: &Path) -> bool {
        for file in REQUIRED_FILES {
            if fs::metadata(path.join(file)).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Download an embedding model from Hugging Face Hub
    pub async fn download_model(&mut self, model_id: &str) -> Result<PathBuf> {
        let model_info = self
            .available_models
            .get(model_id)
            .cloned()
            .ok_or_else(|| RankerError::ModelUnavailable(format!("Unknown embedding model: {}", model_id)))?;

        let model_dir = self.models_dir.join(model_id);
        if self.downloaded_models.contains(model_id) {
            return Ok(model_dir);
        }

        info!(
            "Downloading embedding model {} ({} MB) from {}",
            model_info.name, model_info.size_mb, model_info.repo_id
        );

        fs::create_dir_all(&model_dir).await?;

        let api = Api::new()
            .map_err(|e| RankerError::ModelUnavailable(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.repo(hf_hub::Repo::model(model_info.repo_id.clone()));

        for file in REQUIRED_FILES.iter().chain(OPTIONAL_FILES.iter()) {
            match repo.get(file).await {
                Ok(cached_path) => {
                    fs::copy(&cached_path, model_dir.join(file)).await?;
                    info!("  downloaded {}", file);
                }
                Err(e) if OPTIONAL_FILES.contains(file) => {
                    warn!("Optional file {} not found: {}", file, e);
                }
                Err(e) => {
                    return Err(RankerError::ModelUnavailable(format!(
                        "Failed to download required file {}: {}",
                        file, e
                    )));
                }
            }
        }

        self.downloaded_models.insert(model_id.to_string());
        Ok(model_dir)
    }

    /// Get path to a downloaded model
    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.downloaded_models
            .contains(model_id)
            .then(|| self.models_dir.join(model_id))
    }

    /// Resolve a model to a local directory, downloading it when needed.
    ///
    /// An existing directory path is accepted as-is.
    pub async fn ensure_model_available(&mut self, model: &str) -> Result<PathBuf> {
        let as_path = Path::new(model);
        if as_path.is_dir() {
            return Ok(as_path.to_path_buf());
        }

        let model_id = self
            .resolve_model_id(model)
            .ok_or_else(|| RankerError::ModelUnavailable(format!("Unknown embedding model: {}", model)))?;

        if let Some(path) = self.get_model_path(&model_id) {
            return Ok(path);
        }

        self.download_model(&model_id).await
    }

    pub fn list_available_models(&self) -> Vec<&AvailableModel> {
        self.available_models.values().collect()
    }

    pub fn get_model_info(&self, model_id: &str) -> Option<&AvailableModel> {
        self.resolve_model_id(model_id)
            .and_then(|id| self.available_models.get(&id))
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded_models.contains(model_id)
    }

    /// Resolve model ID from a name or a repo id
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if self.available_models.contains_key(input) {
            return Some(input.to_string());
        }

        self.available_models
            .iter()
            .find(|(_, info)| info.repo_id == input || info.name.eq_ignore_ascii_case(input))
            .map(|(id, _)| id.clone())
    }
}
