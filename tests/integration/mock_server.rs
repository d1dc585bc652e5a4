//! Mock HTTP server and fake transport setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use rest_chain::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use rest_chain::{ApiClient, ApiClientBuilder, ClientConfig, PathTable};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const CONSUMER_KEY: &str = "ck";
pub const CONSUMER_SECRET: &str = "cs";

pub fn fixture_paths() -> PathTable {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("api_paths.json");
    PathTable::load(path).expect("fixture table loads")
}

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub fn new() -> Self {
        let server = Server::new();
        let base_url = server.url();
        Self { server, base_url }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(CONSUMER_KEY, CONSUMER_SECRET, self.base_url.clone())
    }

    /// Builder pointed at the mock server with the fixture table.
    pub fn builder(&self, config: ClientConfig) -> ApiClientBuilder {
        ApiClient::builder()
            .config(config)
            .paths(fixture_paths())
            .base_url_override(&self.base_url)
    }

    pub fn client(&self) -> ApiClient {
        self.builder(self.config()).build().expect("client builds")
    }

    /// Successful JSON response for `method path`, any query.
    pub fn mock_json(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create()
    }

    /// Token endpoint answering with a form encoded token.
    pub fn mock_token(&mut self, path: &str, token: &str, location: Option<&str>) -> Mock {
        let mut mock = self
            .server
            .mock("POST", path)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(format!("oauth_token={}&oauth_token_secret={}-secret", token, token));
        if let Some(location) = location {
            mock = mock.with_header("content-location", location);
        }
        mock.create()
    }
}

/// In-process transport that records requests and answers from a script.
pub struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    status: u16,
    body: String,
}

impl RecordingTransport {
    pub fn ok(body: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            status: 200,
            body: body.to_string(),
        })
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(HttpResponse {
            status: self.status,
            body: self.body.clone(),
            headers: Default::default(),
        })
    }
}

/// Client on a fake base URL that never leaves the process.
pub fn offline_client(transport: Arc<RecordingTransport>) -> ApiClient {
    ApiClient::builder()
        .config(ClientConfig::new(CONSUMER_KEY, CONSUMER_SECRET, "http://api.test/v1"))
        .paths(fixture_paths())
        .transport(transport)
        .build()
        .expect("client builds")
}
