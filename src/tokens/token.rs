//! Access token value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OAuth1 access credential pair, plus the token response headers when they
/// were asked for.
///
/// Serialized field names match the on-disk format of existing token files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub oauth_token: String,
    pub oauth_token_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

impl Token {
    pub fn new(access_key: impl Into<String>, access_secret: impl Into<String>) -> Self {
        Self {
            oauth_token: access_key.into(),
            oauth_token_secret: access_secret.into(),
            headers: None,
        }
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Resource location advertised by the token endpoint.
    pub fn content_location(&self) -> Option<&str> {
        self.headers.as_ref().and_then(|h| {
            h.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("content-location"))
                .map(|(_, v)| v.as_str())
        })
    }

    /// Parse a token endpoint response.
    ///
    /// Accepts the OAuth form encoding (`oauth_token=..&oauth_token_secret=..`)
    /// and a JSON object carrying the same fields. Returns `None` when no
    /// non-empty `oauth_token` is present.
    pub fn from_response_body(body: &str) -> Option<Self> {
        let trimmed = body.trim();
        if trimmed.starts_with('{') {
            let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
            let token = value.get("oauth_token")?.as_str()?;
            let secret = value
                .get("oauth_token_secret")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            return (!token.is_empty()).then(|| Token::new(token, secret));
        }

        let mut token = None;
        let mut secret = String::new();
        for (k, v) in url::form_urlencoded::parse(trimmed.as_bytes()) {
            match k.as_ref() {
                "oauth_token" => token = Some(v.into_owned()),
                "oauth_token_secret" => secret = v.into_owned(),
                _ => {}
            }
        }
        token.filter(|t| !t.is_empty()).map(|t| Token::new(t, secret))
    }
}
