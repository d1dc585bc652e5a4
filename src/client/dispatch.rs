//! Request dispatch: URL building, body negotiation, decoding.

use super::content::{Body, ContentType, DocumentParser};
use crate::error::{ApiError, RequestContext};
use crate::paths::Verb;
use crate::tokens::Token;
use crate::transport::encoding::{append_query, build_query};
use crate::transport::{Connection, HttpRequest};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// The decoded result of one dispatched request.
#[derive(Debug, Clone)]
pub struct Response {
    pub verb: Verb,
    /// Table id the request was resolved from; `None` for direct URL fetches
    pub endpoint: Option<String>,
    pub path: String,
    pub url: String,
    pub status: u16,
    pub content_type: ContentType,
    pub raw_body: String,
    pub headers: BTreeMap<String, String>,
    pub body: Body,
}

/// Builds, signs, sends and decodes requests for resolved endpoints.
#[derive(Clone)]
pub struct RequestDispatcher {
    connection: Connection,
    parser: Arc<dyn DocumentParser>,
}

impl RequestDispatcher {
    pub fn new(connection: Connection, parser: Arc<dyn DocumentParser>) -> Self {
        Self { connection, parser }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Dispatch a resolved endpoint path: `base_url + path + "." + ext`.
    pub fn invoke(
        &self,
        endpoint_id: &str,
        verb: Verb,
        path: &str,
        payload: Option<&Value>,
        content_type: ContentType,
        token: Option<&Token>,
    ) -> Result<Response> {
        let url = format!(
            "{}{}.{}",
            self.connection.base_url(),
            path,
            content_type.extension()
        );
        info!(endpoint = endpoint_id, %verb, path, "invoke");
        let mut response = self.fetch(verb, &url, payload, content_type, token)?;
        response.endpoint = Some(endpoint_id.to_string());
        response.path = path.to_string();
        Ok(response)
    }

    /// Send a request to an absolute URL (extension already applied).
    pub fn fetch(
        &self,
        verb: Verb,
        url: &str,
        payload: Option<&Value>,
        content_type: ContentType,
        token: Option<&Token>,
    ) -> Result<Response> {
        let (url, body) = encode_payload(verb, url, payload);
        debug!(%verb, url = %url, has_body = body.is_some(), "dispatching request");

        let request = HttpRequest::new(verb, url.clone())
            .with_body(body)
            .with_header("Content-Type", content_type.mime());
        let http = self
            .connection
            .execute(request, token)
            .map_err(|e| attach_payload(e, payload))?;

        let decoded = match content_type {
            ContentType::Json if http.body.trim().is_empty() => Ok(Body::Json(Value::Null)),
            ContentType::Json => serde_json::from_str(&http.body).map(Body::Json).map_err(Error::from),
            ContentType::Xml => self.parser.parse(&http.body).map(Body::Document),
        };
        let body = decoded.map_err(|e| {
            debug!(status = http.status, url = %url, error = %e, "response body did not decode");
            let context = RequestContext::new()
                .with_url(url.clone())
                .with_method(verb.to_string())
                .with_data(render_payload(payload))
                .with_headers(http.headers.clone());
            Error::from(
                ApiError::new(format!("could not decode {} response: {}", content_type, e), context)
                    .with_code(http.status)
                    .with_raw_response(http.body.clone()),
            )
        })?;

        Ok(Response {
            verb,
            endpoint: None,
            path: url_path(&url),
            url,
            status: http.status,
            content_type,
            raw_body: http.body,
            headers: http.headers,
            body,
        })
    }
}

/// GET puts structured payloads in the query string; every other verb sends
/// the payload as the request body.
pub(crate) fn encode_payload(verb: Verb, url: &str, payload: Option<&Value>) -> (String, Option<String>) {
    match (verb, payload) {
        (_, None) | (_, Some(Value::Null)) => (url.to_string(), None),
        (Verb::Get, Some(value @ (Value::Object(_) | Value::Array(_)))) => {
            (append_query(url, &build_query(value)), None)
        }
        (Verb::Get, Some(other)) => {
            debug!(payload = %other, "dropping scalar payload on GET");
            (url.to_string(), None)
        }
        (_, Some(Value::String(s))) => (url.to_string(), Some(s.clone())),
        (_, Some(value)) => (url.to_string(), Some(value.to_string())),
    }
}

/// GET requests carry their payload in the query; keep it in the error context too.
fn attach_payload(err: Error, payload: Option<&Value>) -> Error {
    match err {
        Error::Api(mut api) if api.context.data.is_none() => {
            api.context.data = render_payload(payload);
            Error::Api(api)
        }
        other => other,
    }
}

fn render_payload(payload: Option<&Value>) -> Option<String> {
    payload.filter(|v| !v.is_null()).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn url_path(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}
