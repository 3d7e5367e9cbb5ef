//! Artifact index page rendering.
//!
//! Renders a Markdown index from a template with three `$TOKEN` placeholders:
//! `$PROJECT_NAME`, `$LINKS` and `$DATE`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::config;
use crate::error::{Error, Result};
use crate::utils::io;
use crate::utils::template::{self, TemplateVars};

pub const DEFAULT_TEMPLATE: &str = "docs/kibot/index_template.md";
pub const DEFAULT_OUTPUT: &str = "docs/kibot/index.md";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d at %H:%M:%S UTC";

/// Trim entries, drop blanks, and drop case-insensitive repeats (first one wins).
pub fn dedupe_artifacts(artifacts: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    artifacts
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty() && seen.insert(a.to_lowercase()))
        .map(String::from)
        .collect()
}

/// One `- [name](./name)` line per artifact.
pub fn links_block(artifacts: &[String]) -> String {
    artifacts
        .iter()
        .map(|a| format!("- [{}](./{})", a, a))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render(template: &str, project: &str, artifacts: &[String], timestamp: &str) -> String {
    let links = links_block(&dedupe_artifacts(artifacts));
    template::render(
        template,
        &[
            (TemplateVars::PROJECT_NAME, project),
            (TemplateVars::LINKS, &links),
            (TemplateVars::DATE, timestamp),
        ],
    )
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

/// Parse a `--artifacts a,b,c` value.
pub fn split_artifacts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub config: Option<PathBuf>,
    pub project: Option<String>,
    pub artifacts: Option<String>,
    pub template: PathBuf,
    pub out_md: PathBuf,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            config: None,
            project: None,
            artifacts: None,
            template: PathBuf::from(DEFAULT_TEMPLATE),
            out_md: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexOutput {
    pub command: String,
    pub output_path: String,
    pub project: String,
    pub artifacts: Vec<String>,
    pub timestamp: String,
}

/// Project name and raw artifact list, resolved from flags or config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSource {
    pub project: String,
    pub artifacts: Vec<String>,
}

/// Explicit `--artifacts` wins over `--config`; one of them is required.
pub fn resolve_source(options: &IndexOptions) -> Result<IndexSource> {
    if let Some(raw) = options.artifacts.as_deref().filter(|a| !a.is_empty()) {
        return Ok(IndexSource {
            project: options.project.clone().unwrap_or_default(),
            artifacts: split_artifacts(raw),
        });
    }

    if let Some(path) = &options.config {
        let cfg = config::load_index_config(path)?;
        let project = options
            .project
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| cfg.project_name().to_string());
        return Ok(IndexSource {
            project,
            artifacts: cfg.artifacts().to_vec(),
        });
    }

    Err(
        Error::validation_missing_argument(vec!["config".to_string(), "artifacts".to_string()])
            .with_hint("Either --config or both --project and --artifacts must be provided"),
    )
}

/// Render the index page and write it to `options.out_md`.
pub fn generate(options: &IndexOptions) -> Result<IndexOutput> {
    generate_at(options, &timestamp_now())
}

pub fn generate_at(options: &IndexOptions, timestamp: &str) -> Result<IndexOutput> {
    let source = resolve_source(options)?;
    let template_str = io::read_file(&options.template, "read index template")?;

    if !template::is_present(&template_str, TemplateVars::LINKS) {
        log_status!(
            "index",
            "Template {} has no $LINKS placeholder",
            options.template.display()
        );
    }

    let rendered = render(&template_str, &source.project, &source.artifacts, timestamp);
    let content = format!("{}\n", rendered.trim_end());
    io::write_file(&options.out_md, &content, "write index")?;

    log_status!("index", "Wrote {}", options.out_md.display());

    Ok(IndexOutput {
        command: "index.generate".to_string(),
        output_path: options.out_md.display().to_string(),
        project: source.project,
        artifacts: dedupe_artifacts(&source.artifacts),
        timestamp: timestamp.to_string(),
    })
}
