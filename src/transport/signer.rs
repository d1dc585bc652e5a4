//! OAuth1 request signing (HMAC-SHA1, parameters carried in the URI).

use super::encoding::rfc3986_encode;
use super::{HttpRequest, TransportError};
use crate::paths::Verb;
use crate::tokens::Token;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

/// Application (consumer) identity used for every signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerCredentials {
    pub key: String,
    pub secret: String,
}

impl ConsumerCredentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// Signs a request with consumer credentials and, once one is held, an access token.
pub trait Signer: Send + Sync {
    fn sign(
        &self,
        request: HttpRequest,
        consumer: &ConsumerCredentials,
        token: Option<&Token>,
    ) -> Result<HttpRequest, TransportError>;
}

/// OAuth 1.0a signer placing the `oauth_*` parameters in the query string.
#[derive(Debug, Clone, Default)]
pub struct OAuth1Signer {
    fixed: Option<(String, u64)>,
}

impl OAuth1Signer {
    pub fn new() -> Self {
        Self { fixed: None }
    }

    /// Use a fixed nonce and timestamp, making signatures reproducible.
    pub fn with_fixed_nonce(nonce: impl Into<String>, timestamp: u64) -> Self {
        Self {
            fixed: Some((nonce.into(), timestamp)),
        }
    }

    fn nonce_and_timestamp(&self) -> (String, u64) {
        match &self.fixed {
            Some((nonce, ts)) => (nonce.clone(), *ts),
            None => {
                let ts = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default();
                (uuid::Uuid::new_v4().simple().to_string(), ts)
            }
        }
    }
}

impl Signer for OAuth1Signer {
    fn sign(
        &self,
        request: HttpRequest,
        consumer: &ConsumerCredentials,
        token: Option<&Token>,
    ) -> Result<HttpRequest, TransportError> {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportError::Signing(format!("invalid url '{}': {}", request.url, e)))?;
        let base_url = normalized_base_url(&url)?;

        let (nonce, timestamp) = self.nonce_and_timestamp();
        let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        params.push(("oauth_consumer_key".into(), consumer.key.clone()));
        params.push(("oauth_nonce".into(), nonce));
        params.push(("oauth_signature_method".into(), "HMAC-SHA1".into()));
        params.push(("oauth_timestamp".into(), timestamp.to_string()));
        if let Some(token) = token {
            params.push(("oauth_token".into(), token.oauth_token.clone()));
        }
        params.push(("oauth_version".into(), "1.0".into()));

        let normalized = normalize_params(&params);
        let base = signature_base_string(request.verb, &base_url, &normalized);
        let signature = hmac_sha1_signature(
            &base,
            &consumer.secret,
            token.map(|t| t.oauth_token_secret.as_str()).unwrap_or(""),
        );
        tracing::debug!(verb = %request.verb, url = %base_url, "signed request");

        let signed_url = format!(
            "{}?{}&oauth_signature={}",
            base_url,
            normalized,
            rfc3986_encode(&signature)
        );
        Ok(HttpRequest {
            url: signed_url,
            ..request
        })
    }
}

/// `scheme://host[:port]/path`, lowercase scheme and host, default ports dropped.
fn normalized_base_url(url: &Url) -> Result<String, TransportError> {
    let host = url
        .host_str()
        .ok_or_else(|| TransportError::Signing(format!("url '{}' has no host", url)))?;
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    Ok(format!(
        "{}://{}{}{}",
        url.scheme().to_ascii_lowercase(),
        host.to_ascii_lowercase(),
        port,
        url.path()
    ))
}

/// Encode, sort by name then value, and join as `k=v&...`.
pub(crate) fn normalize_params(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (rfc3986_encode(k), rfc3986_encode(v)))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

pub(crate) fn signature_base_string(verb: Verb, base_url: &str, normalized_params: &str) -> String {
    format!(
        "{}&{}&{}",
        verb.as_str(),
        rfc3986_encode(base_url),
        rfc3986_encode(normalized_params)
    )
}

pub(crate) fn hmac_sha1_signature(base: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = format!(
        "{}&{}",
        rfc3986_encode(consumer_secret),
        rfc3986_encode(token_secret)
    );
    let mut mac =
        Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(base.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}
