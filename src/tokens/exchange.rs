//! Username/password to access token exchange.

use super::token::Token;
use crate::error::{ApiError, RequestContext};
use crate::paths::Verb;
use crate::transport::{Connection, HttpRequest};
use crate::{Error, Result};
use tracing::{debug, info};

/// Token-issuing paths, relative to the base URL and without extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEndpoints {
    pub primary: String,
    /// Used instead of `primary` when the primary tenant is not preferred.
    pub secondary: Option<String>,
}

impl Default for TokenEndpoints {
    fn default() -> Self {
        Self {
            primary: "/accesstoken".to_string(),
            secondary: None,
        }
    }
}

/// Negotiates access tokens with a signed request that carries no token yet.
#[derive(Clone)]
pub struct CredentialExchanger {
    connection: Connection,
    endpoints: TokenEndpoints,
}

impl CredentialExchanger {
    pub fn new(connection: Connection, endpoints: TokenEndpoints) -> Self {
        Self {
            connection,
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &TokenEndpoints {
        &self.endpoints
    }

    fn token_url(&self, username: &str, password: &str, prefer_primary_tenant: bool) -> String {
        let path = match (&self.endpoints.secondary, prefer_primary_tenant) {
            (Some(secondary), false) => secondary.as_str(),
            _ => self.endpoints.primary.as_str(),
        };
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", username)
            .append_pair("password", password)
            .finish();
        format!("{}{}.json?{}", self.connection.base_url(), path, query)
    }

    /// Exchange credentials for a token.
    ///
    /// `want_headers` keeps the token response headers (e.g. `Content-Location`)
    /// on the returned token. A response without an access token is an error.
    pub fn obtain_token(
        &self,
        username: &str,
        password: &str,
        want_headers: bool,
        prefer_primary_tenant: bool,
    ) -> Result<Token> {
        let url = self.token_url(username, password, prefer_primary_tenant);
        debug!(username, prefer_primary_tenant, "requesting access token");

        let response = self
            .connection
            .execute(HttpRequest::new(Verb::Post, url.clone()), None)
            .map_err(|e| match e {
                // Only the url is reported; the query holds the password.
                Error::Api(mut api) => {
                    api.context = RequestContext::new().with_url(redact(&url));
                    Error::Api(api)
                }
                other => other,
            })?;

        let token = Token::from_response_body(&response.body).ok_or_else(|| {
            Error::from(
                ApiError::new(
                    "token response did not contain an access token",
                    RequestContext::new().with_url(redact(&url)),
                )
                .with_code(response.status)
                .with_raw_response(response.body.clone()),
            )
        })?;
        info!(username, "obtained access token");

        Ok(if want_headers {
            token.with_headers(response.headers)
        } else {
            token
        })
    }

    /// Two-attempt lookup: primary tenant first, then the fallback.
    ///
    /// Returns `Ok(None)` when both attempts are rejected (400/401/403/404) or
    /// answer without a token. Any other failure is propagated.
    pub fn find_token(&self, username: &str, password: &str) -> Result<Option<Token>> {
        for prefer_primary_tenant in [true, false] {
            match self.obtain_token(username, password, true, prefer_primary_tenant) {
                Ok(token) => return Ok(Some(token)),
                Err(Error::Api(api)) if api.is_rejection() || is_tokenless(&api) => {
                    debug!(prefer_primary_tenant, code = ?api.code, "no token from attempt");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

fn is_tokenless(api: &ApiError) -> bool {
    matches!(api.code, Some(200..=299))
}

fn redact(url: &str) -> String {
    match url.split_once('?') {
        Some((base, query)) => {
            let redacted = url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| {
                    if k == "password" {
                        (k.into_owned(), "***".to_string())
                    } else {
                        (k.into_owned(), v.into_owned())
                    }
                })
                .fold(
                    url::form_urlencoded::Serializer::new(String::new()),
                    |mut s, (k, v)| {
                        s.append_pair(&k, &v);
                        s
                    },
                )
                .finish();
            format!("{}?{}", base, redacted)
        }
        None => url.to_string(),
    }
}
