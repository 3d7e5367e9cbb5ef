//! YAML configuration readers for the two site helpers.

use serde::Deserialize;
use serde_yml::Value;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io;

/// Artifact index settings (`config.kibot.site.yml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub project_name: Option<String>,

    #[serde(default)]
    pub artifacts: Option<Vec<String>>,
}

impl IndexConfig {
    pub fn project_name(&self) -> &str {
        self.project_name.as_deref().unwrap_or("")
    }

    pub fn artifacts(&self) -> &[String] {
        self.artifacts.as_deref().unwrap_or(&[])
    }
}

/// Load the index config. An empty document yields the defaults.
pub fn load_index_config(path: &Path) -> Result<IndexConfig> {
    let raw = io::read_file(path, "read index config")?;
    parse_index_config(&raw, path)
}

fn parse_index_config(raw: &str, path: &Path) -> Result<IndexConfig> {
    let parsed: Option<IndexConfig> = serde_yml::from_str(raw)
        .map_err(|e| Error::config_invalid_yaml(path.display().to_string(), e))?;
    Ok(parsed.unwrap_or_default())
}

/// Read `color_scheme` from a Jekyll `_config.yml`.
///
/// Returns `None` when the file is absent, unreadable, not YAML, or not a
/// mapping. A missing key yields an empty string. The value is trimmed and
/// lowercased.
pub fn load_color_scheme(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    color_scheme_from_str(&raw)
}

fn color_scheme_from_str(raw: &str) -> Option<String> {
    let doc: Value = serde_yml::from_str(raw).ok()?;
    let mapping = doc.as_mapping()?;

    let scheme = match mapping.get("color_scheme") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => serde_yml::to_string(other).ok()?,
    };

    Some(scheme.trim().to_lowercase())
}
