//! Content types and decoded response bodies.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Wire format selected for a client; decides the URL extension, the
/// `Content-Type` header and how responses are decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Json,
    Xml,
}

impl ContentType {
    pub fn extension(&self) -> &'static str {
        match self {
            ContentType::Json => "json",
            ContentType::Xml => "xml",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Xml => "application/xml",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "application/json" => Ok(ContentType::Json),
            "xml" | "application/xml" => Ok(ContentType::Xml),
            other => Err(format!("unsupported content type '{}'", other)),
        }
    }
}

/// Handle to a parsed non-JSON document.
///
/// Parsers return their own handle type; callers reach it via [`Document::as_any`].
pub trait Document: fmt::Debug + Send + Sync {
    /// The text the document was parsed from.
    fn raw(&self) -> &str;
    fn as_any(&self) -> &dyn Any;
}

/// Turns raw XML (or other document) text into a [`Document`] handle.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, raw: &str) -> Result<Arc<dyn Document>>;
}

/// Document that only keeps the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    raw: String,
}

impl Document for TextDocument {
    fn raw(&self) -> &str {
        &self.raw
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Default parser: wraps the text without interpreting it.
///
/// Only checks that a non-empty body starts with markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDocumentParser;

impl DocumentParser for TextDocumentParser {
    fn parse(&self, raw: &str) -> Result<Arc<dyn Document>> {
        let trimmed = raw.trim_start();
        if !trimmed.is_empty() && !trimmed.starts_with('<') {
            return Err(Error::document("body is not an XML document"));
        }
        Ok(Arc::new(TextDocument {
            raw: raw.to_string(),
        }))
    }
}

/// A decoded response body.
#[derive(Debug, Clone)]
pub enum Body {
    Json(Value),
    Document(Arc<dyn Document>),
}

impl Body {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(v) => Some(v),
            Body::Document(_) => None,
        }
    }

    pub fn as_document(&self) -> Option<&Arc<dyn Document>> {
        match self {
            Body::Document(d) => Some(d),
            Body::Json(_) => None,
        }
    }
}
