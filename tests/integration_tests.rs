//! Integration tests for the CV ranker

use cv_ranker::classifier::logistic::TrainingParams;
use cv_ranker::classifier::training::{load_labels, train_from_directory};
use cv_ranker::classifier::{Classifier, ProfileModel, ProfilePredictor, RuleClassifier};
use cv_ranker::config::{ClassifierConfig, OutputFormat, ScoringConfig};
use cv_ranker::input::InputManager;
use cv_ranker::output::report::ModelsUsed;
use cv_ranker::output::{RankingReport, ReportGenerator};
use cv_ranker::processing::embeddings::Embedder;
use cv_ranker::processing::normalizer::parse_keywords;
use cv_ranker::processing::ranker::{ModelHandles, RankingPipeline};
use cv_ranker::{RankerError, Result};
use std::path::Path;
use tempfile::TempDir;

const CVS_DIR: &str = "tests/fixtures/cvs";
const LABELS: &str = "tests/fixtures/etiquetas.csv";

/// Counts a few terms per text so no model has to be downloaded
struct TermCountEmbedder;

impl Embedder for TermCountEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let terms = ["python", "docker", "backend", "frontend", "datos"];
        Ok(texts
            .iter()
            .map(|text| {
                let words: Vec<String> = text
                    .split(|c: char| !c.is_alphanumeric())
                    .map(|w| w.to_lowercase())
                    .collect();
                terms
                    .iter()
                    .map(|term| words.iter().filter(|w| w == term).count() as f32)
                    .collect()
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "term-count"
    }
}

#[tokio::test]
async fn test_markdown_cv_extraction() {
    let text = InputManager::new()
        .extract_text(Path::new("tests/fixtures/cvs/bruno_frontend.md"))
        .await
        .unwrap();

    assert!(text.contains("Bruno Díaz"));
    assert!(text.contains("React"));
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
}

#[tokio::test]
async fn test_pdf_text_spans_every_page() {
    let text = InputManager::new()
        .extract_text(Path::new("tests/fixtures/mixed/beatriz_devops.pdf"))
        .await
        .unwrap();

    // first page
    assert!(text.contains("Beatriz Soto"));
    assert!(text.contains("Kubernetes"));
    // second page
    assert!(text.contains("Docker"));
    assert!(text.contains("Ingles nativo"));
    assert!(text.find("Kubernetes") < text.find("Docker"));
}

#[tokio::test]
async fn test_pdf_ordered_among_text_documents() {
    let batch = InputManager::new()
        .load_documents(Path::new("tests/fixtures/mixed"))
        .await
        .unwrap();

    let names: Vec<&str> = batch.documents.iter().map(|d| d.file_name.as_str()).collect();
    assert_eq!(names, vec!["ana_backend.txt", "beatriz_devops.pdf", "carlos_frontend.md"]);
    assert!(batch.skipped.is_empty());

    let pdf = batch.get("beatriz_devops.pdf").unwrap();
    assert_eq!(pdf.order, 1);
    assert!(pdf.normalized_text.contains("kubernetes"));
    assert!(pdf.normalized_text.contains("python"));
}

#[tokio::test]
async fn test_documents_loaded_in_name_order() {
    let batch = InputManager::new().load_documents(Path::new(CVS_DIR)).await.unwrap();

    assert_eq!(batch.len(), 6);
    assert_eq!(batch.documents[0].file_name, "ana_backend.txt");
    assert_eq!(batch.documents[5].file_name, "fabio_datos.txt");
    assert!(batch.get("ana_backend.txt").unwrap().normalized_text.contains("ingles (nativo)"));
}

#[tokio::test]
async fn test_missing_documents_directory() {
    let temp_dir = TempDir::new().unwrap();
    let result = InputManager::new()
        .load_documents(&temp_dir.path().join("cvs_pdfs"))
        .await;
    assert!(matches!(result, Err(RankerError::MissingInput(_))));
}

#[tokio::test]
async fn test_missing_labels_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = train_from_directory(
        Path::new(CVS_DIR),
        &temp_dir.path().join("etiquetas.csv"),
        temp_dir.path(),
        &TrainingParams::default(),
        &InputManager::new(),
    )
    .await;

    assert!(matches!(result, Err(RankerError::MissingInput(_))));
    assert!(!ProfileModel::artifacts_exist(temp_dir.path()));
}

#[test]
fn test_fixture_labels() {
    let labels = load_labels(Path::new(LABELS)).unwrap();
    assert_eq!(labels.len(), 6);
    assert_eq!(labels[1].file_name, "bruno_frontend.md");
    assert_eq!(labels[1].label, "frontend");
}

#[tokio::test]
async fn test_train_save_load_predict_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let input_manager = InputManager::new();

    let (trained, summary) = train_from_directory(
        Path::new(CVS_DIR),
        Path::new(LABELS),
        temp_dir.path(),
        &TrainingParams::from(&ClassifierConfig::default()),
        &input_manager,
    )
    .await
    .unwrap();
    assert_eq!(summary.documents_used, 6);
    assert_eq!(summary.profiles.len(), 3);

    let loaded = ProfileModel::load(temp_dir.path()).unwrap();
    let batch = input_manager.load_documents(Path::new(CVS_DIR)).await.unwrap();

    let before = ProfilePredictor::new(&trained).predict_documents(&batch.documents);
    let after = ProfilePredictor::new(&loaded).predict_documents(&batch.documents);
    assert_eq!(before, after);

    for prediction in after.values() {
        assert!(loaded.labels().contains(&prediction.label));
    }
    assert_eq!(loaded.predict("frontend typescript css html"), "frontend");
}

#[tokio::test]
async fn test_end_to_end_ranking() {
    let temp_dir = TempDir::new().unwrap();
    let input_manager = InputManager::new();
    let (model, _) = train_from_directory(
        Path::new(CVS_DIR),
        Path::new(LABELS),
        temp_dir.path(),
        &TrainingParams::default(),
        &input_manager,
    )
    .await
    .unwrap();

    let batch = input_manager.load_documents(Path::new(CVS_DIR)).await.unwrap();
    let job = input_manager
        .extract_text(Path::new("tests/fixtures/job_backend.md"))
        .await
        .unwrap();
    let keywords = parse_keywords("python, docker, .net, Inglés(nativo), sql");
    let handles = ModelHandles::new(Box::new(TermCountEmbedder), Box::new(model));
    let scoring = ScoringConfig::default();

    let records = RankingPipeline::new(&handles, &scoring)
        .run(&batch.documents, &keywords, &job, 3)
        .unwrap();

    let order: Vec<&str> = records.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(order, vec!["ana_backend.txt", "diego_backend.txt", "carla_datos.txt"]);
    assert_eq!(records[0].keyword_score, 4);
    assert_eq!(
        records[0].matched_keywords,
        vec!["python", "docker", "ingles(nativo)", "sql"]
    );
    assert_eq!(records[1].matched_keywords, vec!["docker", ".net", "sql"]);
    assert_eq!(records[2].keyword_score, 2);
    for record in &records {
        let expected = record.keyword_score as f32 + record.semantic_score;
        assert!((record.total_score - expected).abs() < 1e-6);
    }

    let report = RankingReport::new(
        records,
        keywords,
        &job,
        batch.len(),
        batch.skipped,
        ModelsUsed {
            embedding_model: handles.embedder.model_name().to_string(),
            classifier: handles.classifier.name().to_string(),
        },
        &scoring,
        0,
    );
    let json = ReportGenerator::with_options(false, false, true, true, true)
        .generate_report(&report, &OutputFormat::Json)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["records"][0]["rank"], 1);
    assert_eq!(value["total_documents"], 6);
}

#[tokio::test]
async fn test_rule_classifier_substitutes_trained_model() {
    let batch = InputManager::new().load_documents(Path::new(CVS_DIR)).await.unwrap();
    let rules = RuleClassifier::new(&ClassifierConfig::default().rules).unwrap();
    let handles = ModelHandles::new(Box::new(TermCountEmbedder), Box::new(rules));

    let records = RankingPipeline::new(&handles, &ScoringConfig::default())
        .run(&batch.documents, &parse_keywords("react, typescript"), "Desarrollador frontend", 1)
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file_name, "bruno_frontend.md");
    assert_eq!(records[0].predicted_profile, "frontend");
}
