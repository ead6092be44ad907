//! Report structures for ranking and prediction runs

use crate::classifier::Prediction;
use crate::config::ScoringConfig;
use crate::input::manager::SkippedDocument;
use crate::processing::normalizer::truncate_text;
use crate::processing::ranker::RankedRecord;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

const JOB_EXCERPT_CHARS: usize = 160;

/// Everything needed to render the result of one ranking run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    /// Ranked records, best first
    pub records: Vec<RankedRecord>,

    /// Normalized keywords used for scoring
    pub keywords: Vec<String>,

    /// Start of the job description
    pub job_excerpt: String,

    /// Documents extracted successfully
    pub total_documents: usize,

    /// Documents that could not be read
    pub skipped: Vec<SkippedDocument>,

    pub models: ModelsUsed,

    pub weights: ScoringWeights,

    pub generated_at: SystemTime,

    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsUsed {
    pub embedding_model: String,
    pub classifier: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub keyword_weight: f32,
    pub semantic_weight: f32,
}

impl From<&ScoringConfig> for ScoringWeights {
    fn from(scoring: &ScoringConfig) -> Self {
        Self {
            keyword_weight: scoring.keyword_weight,
            semantic_weight: scoring.semantic_weight,
        }
    }
}

impl RankingReport {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        records: Vec<RankedRecord>,
        keywords: Vec<String>,
        job_description: &str,
        total_documents: usize,
        skipped: Vec<SkippedDocument>,
        models: ModelsUsed,
        scoring: &ScoringConfig,
        processing_time_ms: u64,
    ) -> Self {
        let job_excerpt = truncate_text(
            &job_description.split_whitespace().collect::<Vec<_>>().join(" "),
            JOB_EXCERPT_CHARS,
        );

        Self {
            records,
            keywords,
            job_excerpt,
            total_documents,
            skipped,
            models,
            weights: ScoringWeights::from(scoring),
            generated_at: SystemTime::now(),
            processing_time_ms,
        }
    }

    pub fn generated_at_utc(&self) -> String {
        chrono::DateTime::<chrono::Utc>::from(self.generated_at)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
    }

    pub fn best(&self) -> Option<&RankedRecord> {
        self.records.first()
    }
}

/// Profile predicted for one document by the `predict` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub file_name: String,
    pub label: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    pub classifier: String,
    pub entries: Vec<ProfileEntry>,
    pub skipped: Vec<SkippedDocument>,
}

impl PredictionReport {
    /// Entries follow `file_names` order; names without a prediction are left out
    pub fn new(
        classifier: &str,
        file_names: &[String],
        predictions: &std::collections::HashMap<String, Prediction>,
        skipped: Vec<SkippedDocument>,
    ) -> Self {
        let entries = file_names
            .iter()
            .filter_map(|name| {
                predictions.get(name).map(|prediction| ProfileEntry {
                    file_name: name.clone(),
                    label: prediction.label.clone(),
                    confidence: prediction.confidence,
                })
            })
            .collect();

        Self {
            classifier: classifier.to_string(),
            entries,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_job_excerpt_is_collapsed_and_truncated() {
        let job = format!("Buscamos\n\n  desarrollador {}", "backend ".repeat(50));
        let report = RankingReport::new(
            Vec::new(),
            vec!["python".to_string()],
            &job,
            0,
            Vec::new(),
            ModelsUsed {
                embedding_model: "m".to_string(),
                classifier: "c".to_string(),
            },
            &ScoringConfig::default(),
            12,
        );

        assert!(report.job_excerpt.starts_with("Buscamos desarrollador backend"));
        assert!(report.job_excerpt.chars().count() <= JOB_EXCERPT_CHARS + 3);
        assert_eq!(report.weights.keyword_weight, 1.0);
        assert!(report.best().is_none());
    }

    #[test]
    fn test_prediction_report_keeps_document_order() {
        let mut predictions = HashMap::new();
        predictions.insert(
            "b.pdf".to_string(),
            Prediction { label: "frontend".to_string(), confidence: Some(0.8) },
        );
        predictions.insert(
            "a.pdf".to_string(),
            Prediction { label: "backend".to_string(), confidence: None },
        );

        let names = vec!["a.pdf".to_string(), "b.pdf".to_string(), "c.pdf".to_string()];
        let report = PredictionReport::new("rules", &names, &predictions, Vec::new());

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].label, "backend");
        assert_eq!(report.entries[1].confidence, Some(0.8));
    }
}
