//! Combines keyword, semantic and profile signals into the final ranking

use crate::classifier::{Classifier, Prediction, ProfileModel, ProfilePredictor, UNKNOWN_PROFILE};
use crate::config::{ClassifierBackend, ClassifierConfig, ScoringConfig};
use crate::error::{Result, RankerError};
use crate::input::InputManager;
use crate::processing::document::Document;
use crate::processing::embeddings::{Embedder, SemanticScorer};
use crate::processing::keyword_matcher::{KeywordMatchResult, KeywordMatcher};
use crate::processing::normalizer::normalize;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecord {
    /// 1-based position after sorting
    pub rank: usize,
    pub file_name: String,
    pub keyword_score: u32,
    pub matched_keywords: Vec<String>,
    pub semantic_score: f32,
    pub predicted_profile: String,
    pub profile_confidence: Option<f64>,
    pub total_score: f32,
}

/// Models used by one ranking run. Owned by the caller and dropped with it.
pub struct ModelHandles {
    pub embedder: Box<dyn Embedder>,
    pub classifier: Box<dyn Classifier>,
}

impl ModelHandles {
    pub fn new(embedder: Box<dyn Embedder>, classifier: Box<dyn Classifier>) -> Self {
        Self { embedder, classifier }
    }
}

/// Input checks that run before any model is loaded.
///
/// The documents directory is checked first, so a missing directory is
/// reported as `MissingInput` even when the classifier artifacts are
/// missing too.
pub async fn check_rank_inputs(
    input_manager: &InputManager,
    docs_dir: &Path,
    artifacts_dir: &Path,
    backend: ClassifierBackend,
) -> Result<()> {
    input_manager.list_documents(docs_dir).await?;

    if backend == ClassifierBackend::Logistic && !ProfileModel::artifacts_exist(artifacts_dir) {
        return Err(RankerError::ModelUnavailable(format!(
            "Profile model artifacts not found in {}. Run `cv-ranker train` first",
            artifacts_dir.display()
        )));
    }
    Ok(())
}

pub struct Ranker {
    keyword_weight: f32,
    semantic_weight: f32,
}

impl Ranker {
    pub fn new(scoring: &ScoringConfig) -> Self {
        Self {
            keyword_weight: scoring.keyword_weight,
            semantic_weight: scoring.semantic_weight,
        }
    }

    pub fn total_score(&self, keyword_score: u32, semantic_score: f32) -> f32 {
        self.keyword_weight * keyword_score as f32 + self.semantic_weight * semantic_score
    }

    /// One unranked record per document, in extraction order.
    ///
    /// A document missing from any signal map gets that signal's default.
    pub fn combine(
        &self,
        documents: &[Document],
        keyword_scores: &HashMap<String, KeywordMatchResult>,
        semantic_scores: &HashMap<String, f32>,
        profiles: &HashMap<String, Prediction>,
    ) -> Vec<RankedRecord> {
        let mut ordered: Vec<&Document> = documents.iter().collect();
        ordered.sort_by_key(|doc| doc.order);

        ordered
            .into_iter()
            .map(|doc| {
                let keywords = keyword_scores.get(&doc.file_name).cloned().unwrap_or_default();
                let semantic_score = semantic_scores.get(&doc.file_name).copied().unwrap_or(0.0);
                let (predicted_profile, profile_confidence) = match profiles.get(&doc.file_name) {
                    Some(prediction) => (prediction.label.clone(), prediction.confidence),
                    None => (UNKNOWN_PROFILE.to_string(), None),
                };

                RankedRecord {
                    rank: 0,
                    file_name: doc.file_name.clone(),
                    keyword_score: keywords.score,
                    matched_keywords: keywords.matched,
                    semantic_score,
                    predicted_profile,
                    profile_confidence,
                    total_score: self.total_score(keywords.score, semantic_score),
                }
            })
            .collect()
    }

    /// Stable sort by total score, keep the best `top_n` and number them
    pub fn rank(&self, mut records: Vec<RankedRecord>, top_n: usize) -> Vec<RankedRecord> {
        records.sort_by(|a, b| b.total_score.partial_cmp(&a.total_score).unwrap_or(Ordering::Equal));
        records.truncate(top_n.max(1));

        for (index, record) in records.iter_mut().enumerate() {
            record.rank = index + 1;
        }

        records
    }
}

/// Runs keyword scoring, embedding similarity and profile prediction over a
/// set of documents and ranks the result.
pub struct RankingPipeline<'a> {
    handles: &'a ModelHandles,
    ranker: Ranker,
    min_confidence: Option<f64>,
    fallback_label: String,
}

impl<'a> RankingPipeline<'a> {
    pub fn new(handles: &'a ModelHandles, scoring: &ScoringConfig) -> Self {
        Self {
            handles,
            ranker: Ranker::new(scoring),
            min_confidence: None,
            fallback_label: UNKNOWN_PROFILE.to_string(),
        }
    }

    pub fn with_classifier_config(mut self, config: &ClassifierConfig) -> Self {
        self.min_confidence = config.min_confidence;
        self.fallback_label = config.fallback_label.clone();
        self
    }

    /// Rank `documents` against normalized `keywords` and a raw job description
    pub fn run(
        &self,
        documents: &[Document],
        keywords: &[String],
        job_description: &str,
        top_n: usize,
    ) -> Result<Vec<RankedRecord>> {
        let start_time = Instant::now();

        if documents.is_empty() {
            return Err(RankerError::MissingInput("No documents to rank".to_string()));
        }
        if normalize(job_description).is_empty() {
            return Err(RankerError::MissingInput("Job description is empty".to_string()));
        }
        if keywords.is_empty() {
            warn!("No keywords given; every keyword score will be 0");
        }

        info!("Scoring {} documents against {} keywords", documents.len(), keywords.len());
        let keyword_scores = KeywordMatcher::new(keywords)?.score_documents(documents);

        info!("Computing semantic similarity with {}", self.handles.embedder.model_name());
        let semantic_scores: HashMap<String, f32> = SemanticScorer::new(self.handles.embedder.as_ref())
            .score(job_description.trim(), documents)?
            .into_iter()
            .collect();

        info!("Predicting profiles with {}", self.handles.classifier.name());
        let profiles = ProfilePredictor::new(self.handles.classifier.as_ref())
            .with_min_confidence(self.min_confidence, &self.fallback_label)
            .predict_documents(documents);

        let records = self
            .ranker
            .combine(documents, &keyword_scores, &semantic_scores, &profiles);
        let ranked = self.ranker.rank(records, top_n);

        debug!("Ranked {} documents in {:.2?}", ranked.len(), start_time.elapsed());
        Ok(ranked)
    }
}
