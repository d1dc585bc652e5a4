use crate::paths::PathTableError;
use crate::transport::TransportError;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Request details attached to a failed call for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Fully built request URL (before signing)
    pub url: Option<String>,
    /// HTTP verb of the failed request
    pub method: Option<String>,
    /// Encoded request payload, if any
    pub data: Option<String>,
    /// Headers of the last response received, when one arrived
    pub headers: Option<BTreeMap<String, String>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_data(mut self, data: Option<String>) -> Self {
        self.data = data;
        self
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// A signing, transport or HTTP-level failure of a remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub message: String,
    /// HTTP status code when the server answered, `None` for network faults
    pub code: Option<u16>,
    /// Raw body of the failing response, if any
    pub raw_response: Option<String>,
    pub context: RequestContext,
}

impl ApiError {
    pub fn new(message: impl Into<String>, context: RequestContext) -> Self {
        Self {
            message: message.into(),
            code: None,
            raw_response: None,
            context,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }

    /// `true` when the server refused the credentials or the resource
    /// (400/401/403/404) as opposed to the request never completing.
    pub fn is_rejection(&self) -> bool {
        matches!(self.code, Some(400 | 401 | 403 | 404))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(code) = self.code {
            write!(f, " (HTTP {})", code)?;
        }
        match (&self.context.method, &self.context.url) {
            (Some(m), Some(u)) => write!(f, " [{} {}]", m, u),
            (None, Some(u)) => write!(f, " [{}]", u),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for ApiError {}

/// Unified error type for the client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Endpoint '{endpoint}' path {path} is missing 1 or more ids (placeholder '{{{placeholder}}}')")]
    MissingPathId {
        endpoint: String,
        path: String,
        placeholder: String,
    },

    #[error("Unknown endpoint: {id}")]
    UnknownEndpoint { id: String },

    #[error("API request failed: {0}")]
    Api(Box<ApiError>),

    #[error("Path table error: {0}")]
    PathTable(#[from] PathTableError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: Option<String>,
    },

    #[error("Token store error: {message}")]
    TokenStore { message: String },

    #[error("Document parse error: {message}")]
    Document { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_context(ctx: &Option<String>) -> String {
    match ctx {
        Some(c) => format!(" ({})", c),
        None => String::new(),
    }
}

impl From<ApiError> for Error {
    fn from(e: ApiError) -> Self {
        Error::Api(Box::new(e))
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Api(Box::new(ApiError::new(e.to_string(), RequestContext::new())))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: None,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: Some(context.into()),
        }
    }

    pub fn token_store(msg: impl Into<String>) -> Self {
        Error::TokenStore {
            message: msg.into(),
        }
    }

    pub fn document(msg: impl Into<String>) -> Self {
        Error::Document {
            message: msg.into(),
        }
    }

    /// The wrapped remote failure, for `Api` errors.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}
