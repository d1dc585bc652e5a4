use super::chain::ChainState;
use super::content::{DocumentParser, TextDocumentParser};
use super::core::ApiClient;
use super::dispatch::RequestDispatcher;
use crate::config::ClientConfig;
use crate::paths::PathTable;
use crate::tokens::{
    CredentialExchanger, EphemeralTokenStore, FileTokenStore, SessionContext, TokenCache,
    TokenEndpoints, TokenStore,
};
use crate::transport::{Connection, ConsumerCredentials, HttpTransport, OAuth1Signer, Signer, Transport};
use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Builder for [`ApiClient`].
///
/// Without an explicit [`ClientConfig`] the settings are read from the
/// environment (see [`ClientConfig::from_env`]).
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    paths: Option<PathTable>,
    paths_file: Option<PathBuf>,
    token_store: Option<Box<dyn TokenStore>>,
    file_cache_dir: Option<PathBuf>,
    session: Option<SessionContext>,
    signer: Option<Arc<dyn Signer>>,
    transport: Option<Arc<dyn Transport>>,
    parser: Option<Arc<dyn DocumentParser>>,
    /// Override base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
    auto_login: bool,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            paths: None,
            paths_file: None,
            token_store: None,
            file_cache_dir: None,
            session: None,
            signer: None,
            transport: None,
            parser: None,
            base_url_override: None,
            auto_login: true,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn paths(mut self, paths: PathTable) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Load the path table from a JSON or YAML file at build time.
    pub fn paths_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths_file = Some(path.into());
        self
    }

    /// Persist tokens with a caller supplied store.
    ///
    /// Replaces an earlier [`file_token_cache`](Self::file_token_cache).
    pub fn token_store(mut self, store: Box<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self.file_cache_dir = None;
        self
    }

    /// Keep the token in `session`, shared with other clients holding it.
    ///
    /// Only valid with the session store: `build` fails when a token store,
    /// a file cache or `token_cache_dir` is configured as well.
    pub fn session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    /// Persist tokens as files under `dir`, named with the configured
    /// `token_file_prefix`. Takes precedence over `token_cache_dir`.
    pub fn file_token_cache(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file_cache_dir = Some(dir.into());
        self.token_store = None;
        self
    }

    pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Parser for XML bodies. Defaults to [`TextDocumentParser`].
    pub fn document_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Override the configured base URL.
    ///
    /// This is primarily for testing with mock servers.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    /// Log in during `build` when the config carries username and password.
    /// On by default.
    pub fn auto_login(mut self, enable: bool) -> Self {
        self.auto_login = enable;
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let mut config = match self.config {
            Some(config) => config,
            None => ClientConfig::from_env()?,
        };
        if let Some(base_url) = self.base_url_override {
            config.base_url = base_url;
        }
        config.validate()?;

        let paths = match (self.paths, self.paths_file.or_else(|| config.paths_file.clone())) {
            (Some(paths), _) => paths,
            (None, Some(file)) => PathTable::load(file)?,
            (None, None) => {
                return Err(Error::configuration(
                    "no path table: pass one to the builder or set paths_file",
                ))
            }
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(config.timeout_secs, config.accept_invalid_certs)?),
        };
        let signer = self.signer.unwrap_or_else(|| Arc::new(OAuth1Signer::new()));

        let connection = Connection::new(
            config.base_url.clone(),
            ConsumerCredentials::new(config.key.clone(), config.secret.clone()),
            signer,
            transport,
        );

        let cache_dir = self.file_cache_dir.or_else(|| config.token_cache_dir.clone());
        let store: Box<dyn TokenStore> = match (self.token_store, cache_dir, self.session) {
            (Some(store), _, Some(_)) => {
                return Err(Error::configuration_with_context(
                    "a session cannot be combined with another token store",
                    store.name(),
                ))
            }
            (None, Some(dir), Some(_)) => {
                return Err(Error::configuration_with_context(
                    "a session cannot be combined with a token cache directory",
                    dir.display().to_string(),
                ))
            }
            (Some(store), _, None) => store,
            (None, Some(dir), None) => {
                Box::new(FileTokenStore::new(dir).with_prefix(config.token_file_prefix.clone()))
            }
            (None, None, session) => Box::new(EphemeralTokenStore::new(session.unwrap_or_default())),
        };

        let endpoints = TokenEndpoints {
            primary: config.access_token_path.clone(),
            secondary: config.secondary_access_token_path.clone(),
        };
        let parser = self.parser.unwrap_or_else(|| Arc::new(TextDocumentParser));

        let mut client = ApiClient {
            paths: Arc::new(paths),
            chain: ChainState::new(),
            dispatcher: RequestDispatcher::new(connection.clone(), parser),
            exchanger: CredentialExchanger::new(connection, endpoints),
            tokens: TokenCache::new(store),
            content_type: config.content_type,
            response: None,
        };
        info!(
            base_url = %config.base_url,
            endpoints = client.paths.len(),
            store = client.tokens.store_name(),
            "api client ready"
        );

        if self.auto_login {
            if let Some((username, password)) = config.login_credentials() {
                client.login(username, password)?;
            }
        }

        Ok(client)
    }
}
