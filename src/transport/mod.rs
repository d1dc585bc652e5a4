//! Wire layer: request/response types, signing and the blocking HTTP transport.
//!
//! The client never talks to the network directly. A request is first passed
//! through a [`Signer`] and then handed to a [`Transport`]; both are traits so
//! callers can swap the OAuth1 signer or the reqwest-backed transport.

pub mod connection;
pub mod encoding;
pub mod http;
pub mod signer;

pub use connection::Connection;
pub use http::HttpTransport;
pub use signer::{ConsumerCredentials, OAuth1Signer, Signer};

use crate::paths::Verb;
use std::collections::BTreeMap;

/// An outgoing request, before or after signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub verb: Verb,
    pub url: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(verb: Verb, url: impl Into<String>) -> Self {
        Self {
            verb,
            url: url.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Option<String>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// What came back from the server, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// Header names in `Title-Case`; repeated headers are joined with `, `
    pub headers: BTreeMap<String, String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes signed requests.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Transport error: {0}")]
    Other(String),
}
