//! Semantic similarity between documents and a job description using Model2Vec

use crate::error::{Result, RankerError};
use crate::processing::document::Document;
use anyhow::Context;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::cmp::Ordering;
use std::path::Path;
use std::time::Instant;

/// Something that turns texts into fixed-size vectors.
pub trait Embedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;
}

pub struct EmbeddingEngine {
    model: StaticModel,
    model_name: String,
}

impl EmbeddingEngine {
    /// Load a Model2Vec model from a local directory or a Hugging Face repo id
    pub fn load(model_path: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(model_path, None, None, None)
            .with_context(|| format!("Failed to load embedding model '{}'", model_name))?;

        info!("Embedding model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_name.to_string(),
        })
    }
}

impl Embedder for EmbeddingEngine {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.model.encode(texts);
        if embeddings.len() != texts.len() {
            return Err(RankerError::Embedding(format!(
                "Model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        Ok(embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Cosine similarity between two embeddings; 0 when either vector is all zeros
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(RankerError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok((dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0))
    }
}

pub struct SemanticScorer<'a> {
    embedder: &'a dyn Embedder,
}

impl<'a> SemanticScorer<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder }
    }

    /// Similarity of every document to the job description, highest first.
    ///
    /// Documents with equal similarity keep their input order.
    pub fn score(&self, job_description: &str, documents: &[Document]) -> Result<Vec<(String, f32)>> {
        let start_time = Instant::now();

        let job_embedding = self
            .embedder
            .encode(&[job_description.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| RankerError::Embedding("No embedding returned for the job description".to_string()))?;

        let texts: Vec<String> = documents.iter().map(|d| d.normalized_text.clone()).collect();
        let embeddings = self.embedder.encode(&texts)?;

        let mut scores = documents
            .iter()
            .zip(embeddings.iter())
            .map(|(doc, embedding)| Ok((doc.file_name.clone(), cosine_similarity(embedding, &job_embedding)?)))
            .collect::<Result<Vec<_>>>()?;

        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        debug!(
            "Scored {} documents with {} in {:.2?}",
            scores.len(),
            self.embedder.model_name(),
            start_time.elapsed()
        );
        Ok(scores)
    }
}
