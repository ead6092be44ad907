//! Configuration management for the CV ranker

use crate::error::{Result, RankerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub paths: PathConfig,
    pub scoring: ScoringConfig,
    pub classifier: ClassifierConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub embedding_model: String,
    pub available_models: Vec<AvailableModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableModel {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub documents_dir: PathBuf,
    pub labels_file: PathBuf,
    pub artifacts_dir: PathBuf,
}

/// Weights applied to each signal when computing the total score.
///
/// With both weights at 1.0 the total is the plain sum of the keyword count
/// and the cosine similarity. The two signals live on different scales, so
/// the keyword count dominates unless the weights are tuned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    pub keyword_weight: f32,
    pub semantic_weight: f32,
    pub default_top_n: usize,
    pub max_top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub backend: ClassifierBackend,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub regularization: f64,
    /// Predictions below this probability become the fallback label.
    pub min_confidence: Option<f64>,
    pub fallback_label: String,
    pub rules: Vec<ProfileRule>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    Logistic,
    Rules,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileRule {
    pub label: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
    Csv,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            keyword_weight: 1.0,
            semantic_weight: 1.0,
            default_top_n: 5,
            max_top_n: 30,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::Logistic,
            max_iter: 200,
            learning_rate: 0.5,
            regularization: 1.0,
            min_confidence: None,
            fallback_label: "unknown".to_string(),
            rules: vec![
                ProfileRule {
                    label: "backend".to_string(),
                    keywords: ["python", "java", ".net", "sql", "docker", "api", "django", "spring"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                },
                ProfileRule {
                    label: "frontend".to_string(),
                    keywords: ["javascript", "typescript", "react", "angular", "vue", "css", "html"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                },
                ProfileRule {
                    label: "data".to_string(),
                    keywords: ["pandas", "machine learning", "spark", "tensorflow", "estadistica", "power bi"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                },
                ProfileRule {
                    label: "devops".to_string(),
                    keywords: ["kubernetes", "terraform", "aws", "azure", "ci/cd", "linux", "ansible"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                },
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cv-ranker")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "potion-multilingual-128M".to_string(),
                available_models: vec![
                    AvailableModel {
                        name: "potion-multilingual-128M".to_string(),
                        repo_id: "minishlab/potion-multilingual-128M".to_string(),
                        size_mb: 490,
                        description: "Multilingual Model2Vec embeddings (Spanish and English resumes)".to_string(),
                    },
                    AvailableModel {
                        name: "potion-base-8M".to_string(),
                        repo_id: "minishlab/potion-base-8M".to_string(),
                        size_mb: 33,
                        description: "Small English-only Model2Vec embeddings".to_string(),
                    },
                    AvailableModel {
                        name: "m2v-multilingual".to_string(),
                        repo_id: "minishlab/M2V_multilingual_output".to_string(),
                        size_mb: 470,
                        description: "Legacy multilingual Model2Vec embeddings".to_string(),
                    },
                ],
            },
            paths: PathConfig {
                documents_dir: PathBuf::from("data").join("cvs_pdfs"),
                labels_file: PathBuf::from("data").join("etiquetas.csv"),
                artifacts_dir: PathBuf::from("."),
            },
            scoring: ScoringConfig::default(),
            classifier: ClassifierConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from `config_path`, writing defaults on first use
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| RankerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RankerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-ranker")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scoring.keyword_weight.is_finite() || !self.scoring.semantic_weight.is_finite() {
            return Err(RankerError::Configuration("Scoring weights must be finite".to_string()));
        }
        if self.scoring.max_top_n == 0 {
            return Err(RankerError::Configuration("scoring.max_top_n must be at least 1".to_string()));
        }
        if self.classifier.max_iter == 0 {
            return Err(RankerError::Configuration("classifier.max_iter must be at least 1".to_string()));
        }
        if self.classifier.learning_rate <= 0.0 {
            return Err(RankerError::Configuration("classifier.learning_rate must be positive".to_string()));
        }
        if let Some(threshold) = self.classifier.min_confidence {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(RankerError::Configuration(
                    "classifier.min_confidence must be within [0, 1]".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Set a scalar value addressed as `section.key`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value
                .parse()
                .map_err(|_| RankerError::Configuration(format!("Invalid value for {}: {}", key, value)))
        }

        match key {
            "models.models_dir" => self.models.models_dir = PathBuf::from(value),
            "models.embedding_model" => self.models.embedding_model = value.to_string(),
            "paths.documents_dir" => self.paths.documents_dir = PathBuf::from(value),
            "paths.labels_file" => self.paths.labels_file = PathBuf::from(value),
            "paths.artifacts_dir" => self.paths.artifacts_dir = PathBuf::from(value),
            "scoring.keyword_weight" => self.scoring.keyword_weight = parse(key, value)?,
            "scoring.semantic_weight" => self.scoring.semantic_weight = parse(key, value)?,
            "scoring.default_top_n" => self.scoring.default_top_n = parse(key, value)?,
            "scoring.max_top_n" => self.scoring.max_top_n = parse(key, value)?,
            "classifier.backend" => {
                self.classifier.backend = match value.to_lowercase().as_str() {
                    "logistic" => ClassifierBackend::Logistic,
                    "rules" => ClassifierBackend::Rules,
                    _ => {
                        return Err(RankerError::Configuration(format!(
                            "Unknown classifier backend: {}. Supported: logistic, rules",
                            value
                        )))
                    }
                }
            }
            "classifier.max_iter" => self.classifier.max_iter = parse(key, value)?,
            "classifier.learning_rate" => self.classifier.learning_rate = parse(key, value)?,
            "classifier.regularization" => self.classifier.regularization = parse(key, value)?,
            "classifier.min_confidence" => {
                self.classifier.min_confidence = match value {
                    "" | "none" => None,
                    v => Some(parse(key, v)?),
                }
            }
            "classifier.fallback_label" => self.classifier.fallback_label = value.to_string(),
            "output.detailed" => self.output.detailed = parse(key, value)?,
            "output.color_output" => self.output.color_output = parse(key, value)?,
            _ => return Err(RankerError::Configuration(format!("Unknown configuration key: {}", key))),
        }

        self.validate()
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    /// Clamp a requested top-N into `1..=max_top_n`
    pub fn clamp_top_n(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.scoring.default_top_n)
            .clamp(1, self.scoring.max_top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_weights_reproduce_plain_sum() {
        let config = Config::default();
        assert_eq!(config.scoring.keyword_weight, 1.0);
        assert_eq!(config.scoring.semantic_weight, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_writes_defaults_then_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let first = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let second = Config::load_from(&path).unwrap();
        assert_eq!(first.scoring, second.scoring);
        assert_eq!(first.classifier.rules, second.classifier.rules);
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::default();
        config.set_value("scoring.semantic_weight", "2.5").unwrap();
        config.set_value("classifier.backend", "rules").unwrap();
        config.set_value("classifier.min_confidence", "0.4").unwrap();

        assert_eq!(config.scoring.semantic_weight, 2.5);
        assert_eq!(config.classifier.backend, ClassifierBackend::Rules);
        assert_eq!(config.classifier.min_confidence, Some(0.4));

        assert!(config.set_value("scoring.nope", "1").is_err());
        assert!(config.set_value("scoring.keyword_weight", "abc").is_err());
        assert!(config.set_value("classifier.min_confidence", "1.5").is_err());
    }

    #[test]
    fn test_clamp_top_n() {
        let config = Config::default();
        assert_eq!(config.clamp_top_n(None), 5);
        assert_eq!(config.clamp_top_n(Some(0)), 1);
        assert_eq!(config.clamp_top_n(Some(100)), 30);
        assert_eq!(config.clamp_top_n(Some(12)), 12);
    }
}
