//! Declarative endpoint table: `endpoint_id -> {verb, path template}`.

use super::error::PathTableError;
use super::template::{PathTemplate, Segment};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP verbs an endpoint can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Patch => reqwest::Method::PATCH,
            Verb::Delete => reqwest::Method::DELETE,
            Verb::Head => reqwest::Method::HEAD,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "PATCH" => Ok(Verb::Patch),
            "DELETE" => Ok(Verb::Delete),
            "HEAD" => Ok(Verb::Head),
            other => Err(other.to_string()),
        }
    }
}

/// One resolved table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub id: String,
    pub verb: Verb,
    pub path: PathTemplate,
}

/// Raw table entry as it appears in the declarative source.
#[derive(Debug, Clone)]
struct RawEndpoint {
    verb: String,
    path: String,
}

impl<'de> Deserialize<'de> for RawEndpoint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            // Shorthand: user_myaccount: "/user/myaccount"
            Path(String),
            // Full form
            Obj {
                #[serde(default = "default_verb", alias = "method")]
                verb: String,
                path: String,
            },
        }

        match Input::deserialize(deserializer)? {
            Input::Path(path) => Ok(RawEndpoint {
                verb: default_verb(),
                path,
            }),
            Input::Obj { verb, path } => Ok(RawEndpoint { verb, path }),
        }
    }
}

fn default_verb() -> String {
    "GET".to_string()
}

/// Immutable endpoint table, loaded once.
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    endpoints: BTreeMap<String, Endpoint>,
}

impl PathTable {
    pub fn from_json_str(content: &str) -> Result<Self, PathTableError> {
        let raw: BTreeMap<String, RawEndpoint> =
            serde_json::from_str(content).map_err(|e| PathTableError::JsonError(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, PathTableError> {
        let raw: BTreeMap<String, RawEndpoint> =
            serde_yaml::from_str(content).map_err(|e| PathTableError::YamlError(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Build a table from `(id, verb, path)` triples.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, PathTableError>
    where
        I: IntoIterator<Item = (S, Verb, S)>,
        S: Into<String>,
    {
        let mut endpoints = BTreeMap::new();
        for (id, verb, path) in entries {
            let id = id.into();
            let endpoint = Self::validate(&id, verb, path.into())?;
            endpoints.insert(id, endpoint);
        }
        Ok(Self { endpoints })
    }

    fn from_raw(raw: BTreeMap<String, RawEndpoint>) -> Result<Self, PathTableError> {
        let mut endpoints = BTreeMap::new();
        for (id, entry) in raw {
            let verb = entry
                .verb
                .parse::<Verb>()
                .map_err(|verb| PathTableError::UnsupportedVerb {
                    id: id.clone(),
                    verb,
                })?;
            let endpoint = Self::validate(&id, verb, entry.path)?;
            endpoints.insert(id, endpoint);
        }
        Ok(Self { endpoints })
    }

    fn validate(id: &str, verb: Verb, path: String) -> Result<Endpoint, PathTableError> {
        if id.is_empty() {
            return Err(PathTableError::InvalidEndpoint {
                id: id.to_string(),
                reason: "endpoint id is empty".into(),
                hint: None,
            });
        }
        if path.trim().is_empty() {
            return Err(PathTableError::InvalidEndpoint {
                id: id.to_string(),
                reason: "path is empty".into(),
                hint: None,
            });
        }
        let template = PathTemplate::parse(path);
        let raw_parts: Vec<&str> = template.as_str().trim_start_matches('/').split('/').collect();
        for (segment, raw) in template.segments().iter().zip(raw_parts) {
            if let Segment::Placeholder(name) = segment {
                if !raw.ends_with('}') || name.is_empty() {
                    return Err(PathTableError::InvalidEndpoint {
                        id: id.to_string(),
                        reason: format!("malformed placeholder segment '{}'", raw),
                        hint: None,
                    }
                    .with_hint("Placeholders must span a whole segment, e.g. /user/{id}/show"));
                }
            }
        }
        Ok(Endpoint {
            id: id.to_string(),
            verb,
            path: template,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.endpoints.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoints in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }
}
