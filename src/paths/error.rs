//! Path table error types

/// Path table error types
#[derive(Debug, thiserror::Error)]
pub enum PathTableError {
    #[error("Failed to load path table from {path}: {reason}{}", .hint.as_ref().map(|h| format!("\n Hint: {}", h)).unwrap_or_default())]
    LoadError {
        path: String,
        reason: String,
        hint: Option<String>,
    },

    #[error("Invalid endpoint '{id}': {reason}{}", .hint.as_ref().map(|h| format!("\n Hint: {}", h)).unwrap_or_default())]
    InvalidEndpoint {
        id: String,
        reason: String,
        hint: Option<String>,
    },

    #[error("Unsupported HTTP verb '{verb}' for endpoint '{id}'")]
    UnsupportedVerb { id: String, verb: String },

    #[error("JSON syntax error: {0}")]
    JsonError(String),

    #[error("YAML syntax error: {0}")]
    YamlError(String),
}

impl PathTableError {
    /// Attach an actionable hint to the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        let hint_val = Some(hint.into());
        match self {
            PathTableError::LoadError { ref mut hint, .. } => *hint = hint_val,
            PathTableError::InvalidEndpoint { ref mut hint, .. } => *hint = hint_val,
            _ => (),
        }
        self
    }
}
