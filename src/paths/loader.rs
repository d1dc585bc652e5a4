//! Path table loading from local files (JSON preferred, YAML fallback).

use super::error::PathTableError;
use super::table::PathTable;
use std::path::{Path, PathBuf};

/// File names tried by [`PathTable::load_dir`], in priority order.
pub const DEFAULT_TABLE_FILES: &[&str] = &["api_paths.json", "api_paths.yaml", "api_paths.yml"];

impl PathTable {
    /// Load a table from a file, choosing the parser from the extension.
    ///
    /// Files without a recognised extension are tried as JSON first, then YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PathTableError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PathTableError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
            hint: None,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let table = match ext.as_deref() {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content).or_else(|_| Self::from_yaml_str(&content)),
        }?;

        tracing::debug!(path = %path.display(), endpoints = table.len(), "loaded path table");
        Ok(table)
    }

    /// Load the first of [`DEFAULT_TABLE_FILES`] found in `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, PathTableError> {
        let dir = dir.as_ref();
        let candidate: Option<PathBuf> = DEFAULT_TABLE_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file());

        match candidate {
            Some(path) => Self::load(path),
            None => Err(PathTableError::LoadError {
                path: dir.display().to_string(),
                reason: "no path table file found".into(),
                hint: None,
            }
            .with_hint(format!("Expected one of: {}", DEFAULT_TABLE_FILES.join(", ")))),
        }
    }
}
