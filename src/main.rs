//! cv-ranker: rank PDF resumes against a job description

use clap::Parser;
use cv_ranker::classifier::logistic::TrainingParams;
use cv_ranker::classifier::training::train_from_directory;
use cv_ranker::classifier::{Classifier, ProfileModel, ProfilePredictor, RuleClassifier};
use cv_ranker::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use cv_ranker::config::{ClassifierBackend, Config, OutputFormat};
use cv_ranker::input::InputManager;
use cv_ranker::output::formatter::suggest_filename;
use cv_ranker::output::report::ModelsUsed;
use cv_ranker::output::{save_report_to_file, PredictionReport, RankingReport, ReportGenerator};
use cv_ranker::processing::embedding_manager::EmbeddingModelManager;
use cv_ranker::processing::embeddings::EmbeddingEngine;
use cv_ranker::processing::normalizer::parse_keywords;
use cv_ranker::processing::ranker::{check_rank_inputs, ModelHandles, RankingPipeline};
use cv_ranker::{RankerError, Result};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Rank {
            docs,
            keywords,
            job,
            job_text,
            top,
            output,
            save,
            embedding,
            artifacts,
            detailed,
        } => {
            let start_time = Instant::now();
            let docs_dir = docs.unwrap_or_else(|| config.paths.documents_dir.clone());
            let artifacts_dir = artifacts.unwrap_or_else(|| config.paths.artifacts_dir.clone());
            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(RankerError::InvalidInput)?,
                None => config.output.format,
            };
            let top_n = config.clamp_top_n(top);

            let input_manager = InputManager::new().with_progress(true);
            check_rank_inputs(&input_manager, &docs_dir, &artifacts_dir, config.classifier.backend).await?;

            let job_description = match job {
                Some(path) => {
                    cli::validate_file_extension(&path, &["pdf", "txt", "md"])
                        .map_err(|e| RankerError::InvalidInput(format!("Job description file: {}", e)))?;
                    input_manager.extract_text(&path).await?
                }
                None => job_text,
            };

            let batch = input_manager.load_documents(&docs_dir).await?;
            let keywords = parse_keywords(&keywords);
            info!("Normalized keywords: {}", keywords.join(", "));

            let embedding_model = embedding.unwrap_or_else(|| config.models.embedding_model.clone());
            let handles = load_models(&config, &embedding_model, &artifacts_dir).await?;

            let records = RankingPipeline::new(&handles, &config.scoring)
                .with_classifier_config(&config.classifier)
                .run(&batch.documents, &keywords, &job_description, top_n)?;

            let report = RankingReport::new(
                records,
                keywords,
                &job_description,
                batch.len(),
                batch.skipped,
                ModelsUsed {
                    embedding_model: handles.embedder.model_name().to_string(),
                    classifier: handles.classifier.name().to_string(),
                },
                &config.scoring,
                start_time.elapsed().as_millis() as u64,
            );

            let generator = ReportGenerator::with_options(
                config.output.color_output,
                detailed || config.output.detailed,
                true,
                true,
                true,
            );
            let content = generator.generate_report(&report, &output_format)?;
            println!("{}", content);

            if let Some(path) = save {
                save_output(&generator, &report, &path, &output_format)?;
            }
        }

        Commands::Train { docs, labels, artifacts } => {
            let docs_dir = docs.unwrap_or_else(|| config.paths.documents_dir.clone());
            let labels_path = labels.unwrap_or_else(|| config.paths.labels_file.clone());
            let artifacts_dir = artifacts.unwrap_or_else(|| config.paths.artifacts_dir.clone());

            info!("Training profile classifier from {}", labels_path.display());
            let input_manager = InputManager::new().with_progress(true);
            let (_, summary) = train_from_directory(
                &docs_dir,
                &labels_path,
                &artifacts_dir,
                &TrainingParams::from(&config.classifier),
                &input_manager,
            )
            .await?;

            println!("✅ Profile classifier trained on {} resumes", summary.documents_used);
            for (profile, count) in &summary.profiles {
                println!("  • {}: {}", profile, count);
            }
            println!("Vocabulary: {} terms", summary.vocabulary_size);
            if !summary.missing_files.is_empty() {
                println!("⚠️  Labeled but not found: {}", summary.missing_files.join(", "));
            }
            println!("📁 Artifacts: {}", artifacts_dir.display());
        }

        Commands::Predict { docs, artifacts, output } => {
            let docs_dir = docs.unwrap_or_else(|| config.paths.documents_dir.clone());
            let artifacts_dir = artifacts.unwrap_or_else(|| config.paths.artifacts_dir.clone());
            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(RankerError::InvalidInput)?,
                None => config.output.format,
            };

            let input_manager = InputManager::new().with_progress(true);
            input_manager.list_documents(&docs_dir).await?;
            let classifier = load_classifier(&config, &artifacts_dir)?;
            let batch = input_manager.load_documents(&docs_dir).await?;

            let predictions = ProfilePredictor::new(classifier.as_ref())
                .with_min_confidence(config.classifier.min_confidence, &config.classifier.fallback_label)
                .predict_documents(&batch.documents);
            let file_names: Vec<String> = batch.documents.iter().map(|d| d.file_name.clone()).collect();
            let report = PredictionReport::new(classifier.name(), &file_names, &predictions, batch.skipped);

            let generator = ReportGenerator::with_options(config.output.color_output, false, true, true, true);
            println!("{}", generator.generate_predictions(&report, &output_format)?);
        }

        Commands::Models { action } => {
            let mut manager =
                EmbeddingModelManager::new(config.models_dir().clone(), &config.models.available_models).await?;

            match action {
                ModelAction::List => {
                    println!("🧠 Embedding Models\n");
                    for model in manager.list_available_models() {
                        let status = if manager.is_model_downloaded(&model.name) {
                            "✅ Downloaded"
                        } else {
                            "⬇️  Available"
                        };
                        let default_marker = if model.name == config.models.embedding_model {
                            " (default)"
                        } else {
                            ""
                        };
                        println!(
                            "  • {}{} ({}) - {} MB [{}]",
                            model.name, default_marker, model.repo_id, model.size_mb, status
                        );
                        println!("    {}", model.description);
                    }
                }

                ModelAction::Download { model } => {
                    let model_id = manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| RankerError::ModelUnavailable(format!("Unknown embedding model: {}", model)))?;
                    if manager.is_model_downloaded(&model_id) {
                        println!("✅ Model '{}' is already downloaded!", model_id);
                        return Ok(());
                    }

                    println!("⬇️  Downloading model: {}", model_id);
                    let model_path = manager.download_model(&model_id).await?;
                    println!("✅ Model '{}' downloaded successfully!", model_id);
                    println!("📁 Location: {}", model_path.display());
                }

                ModelAction::Info { model } => {
                    let model_info = manager
                        .get_model_info(&model)
                        .cloned()
                        .ok_or_else(|| RankerError::ModelUnavailable(format!("Unknown embedding model: {}", model)))?;

                    println!("📋 Model Information for '{}'\n", model_info.name);
                    println!("Repository: {}", model_info.repo_id);
                    println!("Size: {} MB", model_info.size_mb);
                    println!("Description: {}", model_info.description);

                    match manager.get_model_path(&model_info.name) {
                        Some(path) => println!("Status: ✅ Downloaded ({})", path.display()),
                        None => {
                            println!("Status: ⬇️  Available for download");
                            println!("\n💡 To download this model, run:");
                            println!("   cv-ranker models download {}", model_info.name);
                        }
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration ({})\n", config_path.display());
                let content = toml::to_string_pretty(&config)
                    .map_err(|e| RankerError::Configuration(format!("Failed to serialize config: {}", e)))?;
                println!("{}", content);
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset to defaults");
            }

            Some(ConfigAction::Set { key, value }) => {
                config.set_value(&key, &value)?;
                config.save_to(config_path)?;
                println!("✅ {} = {}", key, value);
            }
        },
    }

    Ok(())
}

/// Load the embedding model and profile classifier for one ranking run
async fn load_models(config: &Config, embedding_model: &str, artifacts_dir: &Path) -> Result<ModelHandles> {
    let classifier = load_classifier(config, artifacts_dir)?;

    let mut manager =
        EmbeddingModelManager::new(config.models_dir().clone(), &config.models.available_models).await?;
    let model_path = manager.ensure_model_available(embedding_model).await?;
    let embedder = EmbeddingEngine::load(&model_path, embedding_model)?;

    Ok(ModelHandles::new(Box::new(embedder), classifier))
}

fn load_classifier(config: &Config, artifacts_dir: &Path) -> Result<Box<dyn Classifier>> {
    match config.classifier.backend {
        ClassifierBackend::Logistic => {
            info!("Loading profile model from {}", artifacts_dir.display());
            Ok(Box::new(ProfileModel::load(artifacts_dir)?))
        }
        ClassifierBackend::Rules => Ok(Box::new(
            RuleClassifier::new(&config.classifier.rules)?.with_fallback(&config.classifier.fallback_label),
        )),
    }
}

/// Save a report; the file extension picks the format, falling back to `format`.
///
/// A directory target gets a generated file name.
fn save_output(
    generator: &ReportGenerator,
    report: &RankingReport,
    path: &Path,
    format: &OutputFormat,
) -> Result<()> {
    let target: PathBuf = if path.is_dir() {
        path.join(suggest_filename(format, true))
    } else {
        path.to_path_buf()
    };

    let save_format = target
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| cli::parse_output_format(ext).ok())
        .unwrap_or(*format);

    let content = match save_format {
        OutputFormat::Console => ReportGenerator::with_options(false, true, true, true, true)
            .generate_report(report, &save_format)?,
        _ => generator.generate_report(report, &save_format)?,
    };

    save_report_to_file(&content, &target)?;
    println!("💾 Report saved to {}", target.display());
    Ok(())
}
