//! CLI interface for the CV ranker

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const DEFAULT_KEYWORDS: &str = "python, docker, .net, ingles(nativo), sql";
pub const DEFAULT_JOB_DESCRIPTION: &str =
    "Buscamos ingeniero backend con experiencia en Python, .NET, Docker, Linux y nivel de inglés nativo.";

#[derive(Parser)]
#[command(name = "cv-ranker")]
#[command(about = "Rank PDF resumes against a job description")]
#[command(long_about = "Rank candidate resumes by keyword matches, semantic similarity to a job description and a predicted technical profile")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank the resumes of a directory
    Rank {
        /// Directory with resumes (PDF, TXT, MD)
        #[arg(short, long)]
        docs: Option<PathBuf>,

        /// Comma-separated keywords
        #[arg(short, long, default_value = DEFAULT_KEYWORDS)]
        keywords: String,

        /// Job description file (TXT, MD, PDF)
        #[arg(short, long, conflicts_with = "job_text")]
        job: Option<PathBuf>,

        /// Job description text
        #[arg(long, default_value = DEFAULT_JOB_DESCRIPTION)]
        job_text: String,

        /// Number of candidates to show
        #[arg(short, long)]
        top: Option<usize>,

        /// Output format: console, json, markdown, html, csv
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Embedding model name, repo id or local directory
        #[arg(short, long)]
        embedding: Option<String>,

        /// Directory holding the profile classifier artifacts
        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Show matched keywords and profile per candidate
        #[arg(long)]
        detailed: bool,
    },

    /// Train the profile classifier from labeled resumes
    Train {
        /// Directory with resumes
        #[arg(short, long)]
        docs: Option<PathBuf>,

        /// CSV with file name and profile columns
        #[arg(short, long)]
        labels: Option<PathBuf>,

        /// Where to write vectorizer.json and classifier.json
        #[arg(short, long)]
        artifacts: Option<PathBuf>,
    },

    /// Predict the technical profile of every resume
    Predict {
        /// Directory with resumes
        #[arg(short, long)]
        docs: Option<PathBuf>,

        /// Directory holding the profile classifier artifacts
        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Output format: console, json, csv
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Embedding model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available embedding models
    List,

    /// Download an embedding model
    Download {
        /// Model name or HuggingFace repo ID
        model: String,
    },

    /// Show model information
    Info {
        /// Model name
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "scoring.semantic_weight")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        "csv" => Ok(OutputFormat::Csv),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, html, csv",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
