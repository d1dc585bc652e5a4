use super::builder::ApiClientBuilder;
use super::chain::{resolve_call, ChainState};
use super::content::{Body, ContentType};
use super::dispatch::{RequestDispatcher, Response};
use crate::error::{ApiError, RequestContext};
use crate::paths::{PathTable, Verb};
use crate::tokens::{CredentialExchanger, Token, TokenCache, TokenCacheStats};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

/// Table-driven REST client.
///
/// Calls accumulate into an endpoint id (`user` then `show` is `user_show`).
/// As soon as the id names an entry of the [`PathTable`] the request is sent
/// and the chain starts over.
///
/// ```rust,no_run
/// use rest_chain::{ApiClient, ClientConfig, PathTable, Verb};
/// use serde_json::json;
///
/// # fn main() -> rest_chain::Result<()> {
/// let paths = PathTable::from_entries([("user_show", Verb::Get, "/user/{id}/show")])?;
/// let mut client = ApiClient::builder()
///     .config(ClientConfig::new("key", "secret", "https://api.example.com"))
///     .paths(paths)
///     .build()?;
///
/// client.call("user", [json!(12)])?.step("show")?;
/// println!("{:?}", client.get_json());
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    pub(crate) paths: Arc<PathTable>,
    pub(crate) chain: ChainState,
    pub(crate) dispatcher: RequestDispatcher,
    pub(crate) exchanger: CredentialExchanger,
    pub(crate) tokens: TokenCache,
    pub(crate) content_type: ContentType,
    pub(crate) response: Option<Response>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("chain", &self.chain)
            .field("content_type", &self.content_type)
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Switch to JSON requests and responses (the default).
    pub fn json(&mut self) -> &mut Self {
        self.content_type = ContentType::Json;
        self
    }

    /// Switch to XML requests and responses.
    pub fn xml(&mut self) -> &mut Self {
        self.content_type = ContentType::Xml;
        self
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Add one call to the chain and dispatch if the endpoint id is complete.
    ///
    /// A leading scalar argument is queued as a path id; the first remaining
    /// object or array argument becomes the payload of the request. The chain is reset
    /// after every dispatch attempt, successful or not.
    pub fn call<I, V>(&mut self, name: &str, args: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.chain
            .accumulate(name, args.into_iter().map(Into::into).collect());

        let paths = Arc::clone(&self.paths);
        let Some(endpoint) = paths.get(self.chain.endpoint_id()) else {
            debug!(endpoint = %self.chain.endpoint_id(), "no table entry yet, chaining");
            return Ok(self);
        };

        let (_, ids, payload) = self.chain.take();
        let resolved = resolve_call(endpoint, ids, payload)?;
        self.dispatch(&resolved.endpoint_id, resolved.verb, &resolved.path, resolved.payload.as_ref())?;
        Ok(self)
    }

    /// `call(name, [])`.
    pub fn step(&mut self, name: &str) -> Result<&mut Self> {
        self.call(name, std::iter::empty::<Value>())
    }

    /// Resolve and send a table entry directly, bypassing the chain.
    pub fn invoke<I, V>(&mut self, endpoint_id: &str, ids: I, payload: Option<Value>) -> Result<&Response>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let paths = Arc::clone(&self.paths);
        let endpoint = paths.get(endpoint_id).ok_or_else(|| Error::UnknownEndpoint {
            id: endpoint_id.to_string(),
        })?;
        let ids: VecDeque<Value> = ids.into_iter().map(Into::into).collect();
        let resolved = resolve_call(endpoint, ids, payload)?;
        self.dispatch(&resolved.endpoint_id, resolved.verb, &resolved.path, resolved.payload.as_ref())?;
        self.response
            .as_ref()
            .ok_or_else(|| Error::configuration("dispatch finished without a response"))
    }

    fn dispatch(&mut self, endpoint_id: &str, verb: Verb, path: &str, payload: Option<&Value>) -> Result<()> {
        let result = self.dispatcher.invoke(
            endpoint_id,
            verb,
            path,
            payload,
            self.content_type,
            self.tokens.current(),
        );
        match result {
            Ok(response) => {
                self.response = Some(response);
                Ok(())
            }
            Err(e) => {
                self.response = None;
                Err(e)
            }
        }
    }

    /// Decoded body of the last response.
    pub fn get(&self) -> Option<&Body> {
        self.response.as_ref().map(|r| &r.body)
    }

    pub fn get_json(&self) -> Option<&Value> {
        self.get().and_then(Body::as_json)
    }

    /// Deserialize the last JSON body into `T`.
    pub fn get_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.get_json()
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(Error::from)
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// The `data` member of the last JSON body.
    ///
    /// Application level failures are reported in the body with a 2xx status;
    /// the details live under `data`.
    pub fn error(&self) -> Option<&Value> {
        self.get_json().and_then(|v| v.get("data"))
    }

    /// Whether the last JSON body has an `error` member.
    pub fn has_error(&self) -> bool {
        self.get_json().is_some_and(|v| v.get("error").is_some())
    }

    /// Use a cached token for `username` or negotiate a new one.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Token> {
        let token = self.tokens.ensure(username, password, &self.exchanger)?;
        info!(store = self.tokens.store_name(), "logged in");
        Ok(token)
    }

    pub fn set_token(&mut self, token: Token) -> &mut Self {
        self.tokens.set_current(token);
        self
    }

    pub fn token(&self) -> Option<&Token> {
        self.tokens.current()
    }

    pub fn token_stats(&self) -> TokenCacheStats {
        self.tokens.stats()
    }

    /// Look up the person behind a set of credentials.
    ///
    /// Negotiates a token (primary tenant first, then the fallback) and fetches
    /// the resource named by its `Content-Location` header with that token.
    /// Returns `Ok(None)` when neither attempt yields a token. The result is
    /// not kept as the client's last response, and the client's own token is
    /// left untouched.
    pub fn get_person_by_credentials(&self, username: &str, password: &str) -> Result<Option<Response>> {
        let Some(token) = self.exchanger.find_token(username, password)? else {
            debug!(username, "credentials did not resolve to a person");
            return Ok(None);
        };

        let location = token.content_location().ok_or_else(|| {
            Error::from(ApiError::new(
                "token response did not name a Content-Location",
                RequestContext::new(),
            ))
        })?;
        let url = format!("{}.{}", location, self.content_type.extension());

        let response = self
            .dispatcher
            .fetch(Verb::Get, &url, None, self.content_type, Some(&token))?;
        Ok(Some(response))
    }

    pub fn paths(&self) -> &PathTable {
        &self.paths
    }

    /// Endpoint id accumulated so far.
    pub fn endpoint_id(&self) -> &str {
        self.chain.endpoint_id()
    }

    /// Path ids queued for the next dispatch.
    pub fn pending_ids(&self) -> &VecDeque<Value> {
        self.chain.ids()
    }

    /// Drop any partially built chain.
    pub fn reset(&mut self) -> &mut Self {
        self.chain.reset();
        self
    }
}
