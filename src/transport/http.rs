use super::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::Result;
use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use reqwest::Proxy;
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

/// Blocking reqwest transport. One request per call, no retries.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with the given timeout.
    ///
    /// `REST_CHAIN_HTTP_TIMEOUT_SECS` overrides `timeout_secs`, and
    /// `REST_CHAIN_PROXY_URL` routes all traffic through a proxy.
    pub fn new(timeout_secs: u64, accept_invalid_certs: bool) -> Result<Self> {
        let timeout_secs = env::var("REST_CHAIN_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(timeout_secs);

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(accept_invalid_certs);

        if let Ok(proxy_url) = env::var("REST_CHAIN_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::from(TransportError::Other(e.to_string())))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(request.verb.to_reqwest(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let headers = canonical_headers(response.headers());
        let body = response.text()?;
        tracing::debug!(status, bytes = body.len(), "received HTTP response");

        Ok(HttpResponse {
            status,
            body,
            headers,
        })
    }
}

/// Flatten a header map into `Title-Case` names.
pub(crate) fn canonical_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        out.entry(title_case(name.as_str()))
            .and_modify(|v| {
                v.push_str(", ");
                v.push_str(value.trim());
            })
            .or_insert_with(|| value.trim().to_string());
    }
    out
}

fn title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}
