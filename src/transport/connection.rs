//! Sign, transmit and classify a single request.

use super::{ConsumerCredentials, HttpRequest, HttpResponse, Signer, Transport, TransportError};
use crate::error::{ApiError, RequestContext};
use crate::tokens::Token;
use crate::Result;
use std::sync::Arc;

/// Everything needed to put a signed request on the wire.
///
/// Shared by the request dispatcher and the credential exchanger; cloning is
/// cheap.
#[derive(Clone)]
pub struct Connection {
    base_url: String,
    consumer: ConsumerCredentials,
    signer: Arc<dyn Signer>,
    transport: Arc<dyn Transport>,
}

impl Connection {
    pub fn new(
        base_url: impl Into<String>,
        consumer: ConsumerCredentials,
        signer: Arc<dyn Signer>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            consumer,
            signer,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sign `request`, send it, and turn anything but a 2xx answer into
    /// [`crate::Error::Api`] carrying the request context.
    pub fn execute(&self, request: HttpRequest, token: Option<&Token>) -> Result<HttpResponse> {
        let context = RequestContext::new()
            .with_url(request.url.clone())
            .with_method(request.verb.as_str())
            .with_data(request.body.clone());

        let signed = self
            .signer
            .sign(request, &self.consumer, token)
            .map_err(|e| transport_failure(e, context.clone()))?;

        let response = self
            .transport
            .send(&signed)
            .map_err(|e| transport_failure(e, context.clone()))?;

        if !response.is_success() {
            tracing::debug!(status = response.status, url = ?context.url, "request rejected");
            let err = ApiError::new(status_message(response.status), context.with_headers(response.headers.clone()))
                .with_code(response.status)
                .with_raw_response(response.body);
            return Err(err.into());
        }
        Ok(response)
    }
}

fn transport_failure(err: TransportError, context: RequestContext) -> crate::Error {
    let mut api = ApiError::new(err.to_string(), context);
    if let TransportError::Http(e) = &err {
        if let Some(status) = e.status() {
            api = api.with_code(status.as_u16());
        }
    }
    api.into()
}

fn status_message(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("{} {}", status, reason),
        None => format!("HTTP status {}", status),
    }
}
