//! Local text embeddings using fastembed.
//!
//! Backs both the long-term memory store and the knowledge base. The
//! default model is all-MiniLM-L6-v2 (384 dimensions).

use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use once_cell::sync::OnceCell;
use researchbot_common::{Embedder, ResearchError, Result};
use thiserror::Error;
use tokio::task;
use tracing::{debug, info, instrument};

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    ModelInit(String),

    #[error("Failed to generate embeddings: {0}")]
    Generation(String),

    #[error("Blocking task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl From<EmbeddingError> for ResearchError {
    fn from(e: EmbeddingError) -> Self {
        ResearchError::Embedding(e.to_string())
    }
}

/// Lazily loaded fastembed model shared across all embedding calls.
pub struct EmbeddingService {
    model_name: EmbeddingModel,
    dimension: usize,
    model: OnceCell<Arc<TextEmbedding>>,
}

impl EmbeddingService {
    /// Create a service for a model name such as `all-MiniLM-L6-v2`.
    ///
    /// The model is not loaded until the first embedding call.
    pub fn from_model_str(model_name: &str) -> std::result::Result<Self, EmbeddingError> {
        let (model_name, dimension) = match model_name {
            "all-MiniLM-L6-v2" | "AllMiniLML6V2" => (EmbeddingModel::AllMiniLML6V2, 384),
            "all-MiniLM-L12-v2" | "AllMiniLML12V2" => (EmbeddingModel::AllMiniLML12V2, 384),
            "bge-small-en-v1.5" | "BGESmallENV15" => (EmbeddingModel::BGESmallENV15, 384),
            "bge-base-en-v1.5" | "BGEBaseENV15" => (EmbeddingModel::BGEBaseENV15, 768),
            "bge-large-en-v1.5" | "BGELargeENV15" => (EmbeddingModel::BGELargeENV15, 1024),
            "nomic-embed-text-v1.5" | "NomicEmbedTextV15" => {
                (EmbeddingModel::NomicEmbedTextV15, 768)
            }
            "multilingual-e5-small" | "MultilingualE5Small" => {
                (EmbeddingModel::MultilingualE5Small, 384)
            }
            _ => {
                return Err(EmbeddingError::ModelInit(format!(
                    "Unknown embedding model: '{}'. Supported models: all-MiniLM-L6-v2, \
                     all-MiniLM-L12-v2, bge-small-en-v1.5, bge-base-en-v1.5, \
                     bge-large-en-v1.5, nomic-embed-text-v1.5, multilingual-e5-small",
                    model_name
                )));
            }
        };

        Ok(Self {
            model_name,
            dimension,
            model: OnceCell::new(),
        })
    }

    /// Create a service from config, validating that the dimension matches.
    pub fn from_config(
        model_name: &str,
        expected_dim: usize,
    ) -> std::result::Result<Self, EmbeddingError> {
        let service = Self::from_model_str(model_name)?;
        if service.dimension != expected_dim {
            return Err(EmbeddingError::ModelInit(format!(
                "Dimension mismatch: model '{}' produces {}-dim vectors but config specifies {}",
                model_name, service.dimension, expected_dim
            )));
        }
        Ok(service)
    }

    #[instrument(skip(self))]
    fn get_or_init_model(&self) -> std::result::Result<Arc<TextEmbedding>, EmbeddingError> {
        self.model
            .get_or_try_init(|| {
                info!(model = ?self.model_name, "Initializing embedding model");

                let mut options = InitOptions::new(self.model_name.clone());
                options.show_download_progress = false;
                let model = TextEmbedding::try_new(options)
                    .map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;

                info!(dimension = self.dimension, "Embedding model initialized");
                Ok(Arc::new(model))
            })
            .cloned()
    }
}

impl Default for EmbeddingService {
    fn default() -> Self {
        Self {
            model_name: EmbeddingModel::AllMiniLML6V2,
            dimension: 384,
            model: OnceCell::new(),
        }
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut batch = self.embed_batch(&[text.to_string()]).await?;
        batch
            .pop()
            .ok_or_else(|| EmbeddingError::Generation("Empty embedding result".into()).into())
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.get_or_init_model()?;
        let texts = texts.to_vec();

        // fastembed is synchronous
        let embeddings = task::spawn_blocking(move || {
            model
                .embed(texts, None)
                .map_err(|e| EmbeddingError::Generation(e.to_string()))
        })
        .await
        .map_err(EmbeddingError::from)??;

        debug!(batch_size = embeddings.len(), "Generated embeddings");
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity; 0.0 when either vector is zero or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
