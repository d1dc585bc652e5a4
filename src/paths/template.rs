//! Path templates: literal and `{placeholder}` segments with positional substitution.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;

/// Characters that would end or split a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A single `/`-separated segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Placeholder name without braces. Only the position matters on substitution.
    Placeholder(String),
}

/// Raised when a template holds more placeholders than there are ids queued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("path {path} is missing an id for placeholder '{{{placeholder}}}'")]
pub struct UnresolvedPlaceholder {
    pub path: String,
    pub placeholder: String,
}

/// Parsed endpoint path, e.g. `/user/{id}/show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw
            .trim_start_matches('/')
            .split('/')
            .map(|part| {
                if part.starts_with('{') {
                    let name = part.trim_start_matches('{').trim_end_matches('}');
                    Segment::Placeholder(name.to_string())
                } else {
                    Segment::Literal(part.to_string())
                }
            })
            .collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Placeholder(_)))
            .count()
    }

    /// Substitute queued ids into the placeholders, front to back.
    ///
    /// Each placeholder pops exactly one id; ids left over after the last
    /// placeholder stay in the queue for the caller to inspect. The queue is
    /// left untouched when resolution fails.
    pub fn resolve(&self, ids: &mut VecDeque<Value>) -> Result<String, UnresolvedPlaceholder> {
        if let Some(Segment::Placeholder(name)) = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Placeholder(_)))
            .nth(ids.len())
        {
            return Err(UnresolvedPlaceholder {
                path: self.raw.clone(),
                placeholder: name.clone(),
            });
        }

        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => parts.push(s.clone()),
                Segment::Placeholder(_) => {
                    // Length was checked above.
                    let id = ids.pop_front().unwrap_or(Value::Null);
                    parts.push(render_id(&id));
                }
            }
        }
        Ok(format!("/{}", parts.join("/")))
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.raw)
    }
}

/// Render a scalar id the way it appears in a URL path.
///
/// String ids are escaped so they always stay a single segment.
pub fn render_id(id: &Value) -> String {
    match id {
        Value::String(s) => utf8_percent_encode(s, PATH_SEGMENT).to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
