//! Embedding model wrapper for fastembed.
//!
//! Provides a high-level interface for generating embeddings:
//! - Lazy model loading with configurable cache directory
//! - Batch embedding generation

use fastembed::{InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Mutex;

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Invalid model name: {0}")]
    InvalidModel(String),
}

/// Anything that turns texts into vectors, one per input, in input order.
pub trait Embedder: Send + Sync {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn name(&self) -> &str;
}

/// Wrapper around fastembed's TextEmbedding model.
/// Uses a Mutex because fastembed's embed() requires &mut self.
pub struct EmbeddingModel {
    model: Mutex<TextEmbedding>,
    model_name: String,
}

impl EmbeddingModel {
    /// Create a new embedding model with the given name.
    ///
    /// The model will be downloaded into `cache_dir` on first use if not cached.
    pub fn new(model_name: &str, cache_dir: PathBuf) -> Result<Self, EmbeddingError> {
        let model_enum = parse_model_name(model_name)?;

        std::fs::create_dir_all(&cache_dir).map_err(|e| {
            EmbeddingError::InitFailed(format!("Failed to create models directory: {}", e))
        })?;

        log::info!("initializing embedding model {model_name}");

        let options = InitOptions::new(model_enum)
            .with_cache_dir(cache_dir)
            .with_show_download_progress(false);

        let model = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        log::info!("embedding model {model_name} initialized");

        Ok(Self {
            model: Mutex::new(model),
            model_name: model_name.to_string(),
        })
    }
}

impl Embedder for EmbeddingModel {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut model = self.model.lock().map_err(|e| {
            EmbeddingError::EmbeddingFailed(format!("Failed to acquire model lock: {}", e))
        })?;

        model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Loads the model on the first embedding request and keeps it afterwards.
///
/// Checks that end before scoring (no search results) never pay for the
/// model download.
pub struct LazyEmbeddingModel {
    model_name: String,
    cache_dir: PathBuf,
    /// Mutex<Option<_>> because OnceLock::get_or_try_init is unstable.
    state: Mutex<Option<EmbeddingModel>>,
}

impl LazyEmbeddingModel {
    pub fn new(model_name: &str, cache_dir: PathBuf) -> Self {
        Self {
            model_name: model_name.to_string(),
            cache_dir,
            state: Mutex::new(None),
        }
    }

    #[allow(dead_code)]
    pub fn is_loaded(&self) -> bool {
        self.state.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl Embedder for LazyEmbeddingModel {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut guard = self.state.lock().map_err(|e| {
            EmbeddingError::EmbeddingFailed(format!("Failed to acquire model lock: {}", e))
        })?;

        if guard.is_none() {
            *guard = Some(EmbeddingModel::new(&self.model_name, self.cache_dir.clone())?);
        }

        match guard.as_ref() {
            Some(model) => model.embed_batch(texts),
            None => Err(EmbeddingError::InitFailed("model not loaded".to_string())),
        }
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Parse model name string to fastembed enum.
pub fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel, EmbeddingError> {
    match name.to_lowercase().as_str() {
        "all-minilm-l6-v2" | "allminiml6v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l6-v2-q" | "allminiml6v2q" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2Q),
        "bge-small-en-v1.5" | "bgesmallenv15" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" | "bgebaseenv15" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "bge-large-en-v1.5" | "bgelargeenv15" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
        _ => Err(EmbeddingError::InvalidModel(format!(
            "Unknown model: {}. Supported models: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5",
            name
        ))),
    }
}
