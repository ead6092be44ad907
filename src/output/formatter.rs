//! Output formatters for ranking results

use crate::config::OutputFormat;
use crate::error::{Result, RankerError};
use crate::output::report::{PredictionReport, RankingReport};
use crate::processing::ranker::RankedRecord;
use askama::Template;
use colored::{Color, Colorize};
use serde::Serialize;
use std::path::Path;

const FILE_COLUMN_WIDTH: usize = 32;

/// Trait for formatting ranking reports
pub trait OutputFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console table with optional colors and per-candidate details
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for scripting and structured data
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// One row per ranked record, for spreadsheets
pub struct CsvFormatter;

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
    csv_formatter: CsvFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>CV Ranking</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 1000px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        .header {
            border-bottom: 3px solid #007acc;
            margin-bottom: 20px;
        }
        table { border-collapse: collapse; width: 100%; }
        th, td { padding: 8px 10px; border-bottom: 1px solid #e9ecef; text-align: left; }
        th { color: #007acc; }
        tr.top { background: #e8f5e9; }
        .keywords { color: #6c757d; font-size: 0.9em; }
        .skipped { border-left: 4px solid #ffc107; background: #f8f9fa; padding: 10px 15px; }
        .metadata {
            background: #e9ecef;
            padding: 15px;
            border-radius: 6px;
            margin-top: 30px;
            font-size: 0.9em;
            color: #6c757d;
        }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>CV Ranking</h1>
            <p>Generated: {{ generated_at }} | Processing time: {{ processing_time }}ms</p>
            <p><strong>Keywords:</strong> {{ keywords }}</p>
            <p><strong>Job description:</strong> {{ job_excerpt }}</p>
        </div>

        <table>
            <tr><th>#</th><th>File</th><th>Keywords</th><th>Semantic</th><th>Profile</th><th>Total</th></tr>
            {% for row in rows %}
            <tr{% if row.rank == 1 %} class="top"{% endif %}>
                <td>{{ row.rank }}</td>
                <td>{{ row.file_name }}<br><span class="keywords">{{ row.matched }}</span></td>
                <td>{{ row.keyword_score }}</td>
                <td>{{ row.semantic_score }}</td>
                <td>{{ row.profile }}</td>
                <td><strong>{{ row.total_score }}</strong></td>
            </tr>
            {% endfor %}
        </table>

        {% if !skipped.is_empty() %}
        <h2>Skipped documents</h2>
        <div class="skipped">
            <ul>
            {% for item in skipped %}
                <li>{{ item }}</li>
            {% endfor %}
            </ul>
        </div>
        {% endif %}

        <div class="metadata">
            <p><strong>Generated by cv-ranker v{{ version }}</strong></p>
            <p><strong>Models:</strong> {{ embedding_model }} + {{ classifier }} | <strong>Documents:</strong> {{ total_documents }}</p>
            <p><strong>Weights:</strong> keywords {{ keyword_weight }}, semantic {{ semantic_weight }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    generated_at: String,
    processing_time: u64,
    keywords: String,
    job_excerpt: String,
    rows: Vec<HtmlRow>,
    skipped: Vec<String>,
    version: String,
    embedding_model: String,
    classifier: String,
    total_documents: usize,
    keyword_weight: f32,
    semantic_weight: f32,
}

struct HtmlRow {
    rank: usize,
    file_name: String,
    matched: String,
    keyword_score: u32,
    semantic_score: String,
    profile: String,
    total_score: String,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    file_name: &'a str,
    keyword_score: u32,
    matched_keywords: String,
    semantic_score: f32,
    predicted_profile: &'a str,
    profile_confidence: Option<f64>,
    total_score: f32,
}

fn format_profile(record: &RankedRecord) -> String {
    match record.profile_confidence {
        Some(confidence) => format!("{} ({:.0}%)", record.predicted_profile, confidence * 100.0),
        None => record.predicted_profile.clone(),
    }
}

fn fit_column(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_row(&self, record: &RankedRecord) -> String {
        let line = format!(
            "{:>4}  {:<width$}  {:>8}  {:>8.3}  {:<18}  {:>8.3}",
            record.rank,
            fit_column(&record.file_name, FILE_COLUMN_WIDTH),
            record.keyword_score,
            record.semantic_score,
            fit_column(&format_profile(record), 18),
            record.total_score,
            width = FILE_COLUMN_WIDTH,
        );

        if record.rank == 1 && self.use_colors {
            line.green().bold().to_string()
        } else {
            line
        }
    }

    pub fn format_predictions(&self, report: &PredictionReport) -> String {
        let mut output = String::new();
        output.push_str(&self.format_header(&format!("PREDICTED PROFILES ({})", report.classifier), 1));

        for entry in &report.entries {
            let confidence = entry
                .confidence
                .map(|c| format!(" ({:.0}%)", c * 100.0))
                .unwrap_or_default();
            output.push_str(&format!(
                "{:<width$}  {}{}\n",
                fit_column(&entry.file_name, FILE_COLUMN_WIDTH),
                self.colorize(&entry.label, Color::Cyan),
                confidence,
                width = FILE_COLUMN_WIDTH,
            ));
        }

        for skipped in &report.skipped {
            output.push_str(&self.colorize(
                &format!("skipped {}: {}\n", skipped.file_name, skipped.reason),
                Color::Yellow,
            ));
        }

        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 CV RANKING", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.generated_at_utc(),
            report.processing_time_ms
        ));
        output.push_str(&format!(
            "Keywords: {}\n",
            self.colorize(&report.keywords.join(", "), Color::Cyan)
        ));
        output.push_str(&format!("Job: {}\n", report.job_excerpt));

        output.push_str(&self.format_header(
            &format!("Top {} of {} documents", report.records.len(), report.total_documents),
            2,
        ));
        let header = format!(
            "{:>4}  {:<width$}  {:>8}  {:>8}  {:<18}  {:>8}",
            "#",
            "File",
            "Keywords",
            "Semantic",
            "Profile",
            "Total",
            width = FILE_COLUMN_WIDTH,
        );
        output.push_str(&self.colorize(&header, Color::White));
        output.push('\n');
        output.push_str(&"-".repeat(header.chars().count()));
        output.push('\n');
        for record in &report.records {
            output.push_str(&self.format_row(record));
            output.push('\n');
        }

        if self.detailed {
            output.push_str(&self.format_header("Details", 3));
            for record in &report.records {
                output.push_str(&format!("{}. {}\n", record.rank, self.colorize(&record.file_name, Color::Blue)));
                let matched = if record.matched_keywords.is_empty() {
                    "-".to_string()
                } else {
                    record.matched_keywords.join(", ")
                };
                output.push_str(&format!("   Matched keywords: {}\n", matched));
                output.push_str(&format!("   Profile: {}\n", format_profile(record)));
                output.push_str(&format!(
                    "   Total: {:.3} (keywords {} + semantic {:.3})\n",
                    record.total_score, record.keyword_score, record.semantic_score
                ));
            }
        }

        if !report.skipped.is_empty() {
            output.push_str(&self.format_header("Skipped documents", 3));
            for skipped in &report.skipped {
                output.push_str(&self.colorize(
                    &format!("⚠️  {}: {}\n", skipped.file_name, skipped.reason),
                    Color::Yellow,
                ));
            }
        }

        output.push_str(&format!(
            "\nModels: {} + {} | Weights: keywords {}, semantic {}\n",
            report.models.embedding_model,
            report.models.classifier,
            report.weights.keyword_weight,
            report.weights.semantic_weight
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        self.to_json(report)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &RankingReport) -> HtmlTemplate {
        let rows = report
            .records
            .iter()
            .map(|record| HtmlRow {
                rank: record.rank,
                file_name: record.file_name.clone(),
                matched: record.matched_keywords.join(", "),
                keyword_score: record.keyword_score,
                semantic_score: format!("{:.3}", record.semantic_score),
                profile: format_profile(record),
                total_score: format!("{:.3}", record.total_score),
            })
            .collect();

        HtmlTemplate {
            include_styles: self.include_styles,
            generated_at: report.generated_at_utc(),
            processing_time: report.processing_time_ms,
            keywords: report.keywords.join(", "),
            job_excerpt: report.job_excerpt.clone(),
            rows,
            skipped: report
                .skipped
                .iter()
                .map(|s| format!("{}: {}", s.file_name, s.reason))
                .collect(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            embedding_model: report.models.embedding_model.clone(),
            classifier: report.models.classifier.clone(),
            total_documents: report.total_documents,
            keyword_weight: report.weights.keyword_weight,
            semantic_weight: report.weights.semantic_weight,
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| RankerError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# 📊 CV Ranking\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n\n",
                report.generated_at_utc(),
                report.processing_time_ms
            ));
            output.push_str(&format!(
                "**Models:** `{}` + `{}`\n\n",
                report.models.embedding_model, report.models.classifier
            ));
        }

        output.push_str(&format!("**Keywords:** {}\n\n", report.keywords.join(", ")));
        output.push_str(&format!("**Job description:** {}\n\n", report.job_excerpt));

        output.push_str("| # | File | Keywords | Matched | Semantic | Profile | Total |\n");
        output.push_str("|---|------|----------|---------|----------|---------|-------|\n");
        for record in &report.records {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {:.3} | {} | {:.3} |\n",
                record.rank,
                escape_cell(&record.file_name),
                record.keyword_score,
                record.matched_keywords.join(", "),
                record.semantic_score,
                escape_cell(&format_profile(record)),
                record.total_score
            ));
        }

        if !report.skipped.is_empty() {
            output.push_str("\n## Skipped documents\n\n");
            for skipped in &report.skipped {
                output.push_str(&format!("- `{}`: {}\n", skipped.file_name, skipped.reason));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

impl CsvFormatter {
    fn write_rows<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| RankerError::OutputFormatting(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| RankerError::OutputFormatting(e.to_string()))
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        Self::write_rows(report.records.iter().map(|record| CsvRow {
            rank: record.rank,
            file_name: &record.file_name,
            keyword_score: record.keyword_score,
            matched_keywords: record.matched_keywords.join(";"),
            semantic_score: record.semantic_score,
            predicted_profile: &record.predicted_profile,
            profile_confidence: record.profile_confidence,
            total_score: record.total_score,
        }))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true, true)
    }

    pub fn with_options(
        use_colors: bool,
        detailed: bool,
        pretty_json: bool,
        include_metadata: bool,
        include_html_styles: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(include_html_styles),
            csv_formatter: CsvFormatter,
        }
    }

    pub fn generate_report(&self, report: &RankingReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
            OutputFormat::Csv => self.csv_formatter.format_report(report),
        }
    }

    /// Render the result of the `predict` command
    pub fn generate_predictions(&self, report: &PredictionReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => Ok(self.console_formatter.format_predictions(report)),
            OutputFormat::Json => self.json_formatter.to_json(report),
            OutputFormat::Csv => CsvFormatter::write_rows(report.entries.iter()),
            other => Err(RankerError::UnsupportedFormat(format!(
                "{:?} output is not available for predictions",
                other
            ))),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, timestamp: bool) -> String {
    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
        OutputFormat::Csv => "csv",
    };

    format!("ranking{}.{}", timestamp_suffix, extension)
}
