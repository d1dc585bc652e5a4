//! Client configuration from files, environment variables or code.

use crate::client::ContentType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Keyring service name used for the consumer secret fallback.
pub const KEYRING_SERVICE: &str = "rest-chain";

/// Connection and identity settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// OAuth consumer key
    pub key: String,
    /// OAuth consumer secret
    pub secret: String,
    /// API root, e.g. `https://api.example.com/v1`
    pub base_url: String,
    /// When both are set the client logs in on construction.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Enables the file token store rooted at this directory.
    pub token_cache_dir: Option<PathBuf>,
    pub token_file_prefix: String,
    pub access_token_path: String,
    pub secondary_access_token_path: Option<String>,
    pub content_type: ContentType,
    pub timeout_secs: u64,
    pub accept_invalid_certs: bool,
    /// Path table file loaded when no table is passed to the builder.
    pub paths_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            secret: String::new(),
            base_url: String::new(),
            username: None,
            password: None,
            token_cache_dir: None,
            token_file_prefix: "rc".to_string(),
            access_token_path: "/accesstoken".to_string(),
            secondary_access_token_path: None,
            content_type: ContentType::Json,
            timeout_secs: 30,
            accept_invalid_certs: false,
            paths_file: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("key", &self.key)
            .field("secret", &"***")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("token_cache_dir", &self.token_cache_dir)
            .field("token_file_prefix", &self.token_file_prefix)
            .field("access_token_path", &self.access_token_path)
            .field("secondary_access_token_path", &self.secondary_access_token_path)
            .field("content_type", &self.content_type)
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("paths_file", &self.paths_file)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(key: impl Into<String>, secret: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_token_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.token_cache_dir = Some(dir.into());
        self
    }

    /// Load from a JSON or YAML file, chosen by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };
        Ok(config)
    }

    /// Read `REST_CHAIN_*` environment variables.
    ///
    /// The consumer secret falls back to the OS keyring entry
    /// (`rest-chain`, `<key>`) when `REST_CHAIN_SECRET` is unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::from_lookup(|name| std::env::var(name).ok())?;
        if config.secret.is_empty() && !config.key.is_empty() {
            if let Some(secret) = keyring_secret(&config.key) {
                config.secret = secret;
            }
        }
        Ok(config)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("REST_CHAIN_{}", name)).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(v) = var("KEY") {
            config.key = v;
        }
        if let Some(v) = var("SECRET") {
            config.secret = v;
        }
        if let Some(v) = var("BASE_URL") {
            config.base_url = v;
        }
        config.username = var("USERNAME");
        config.password = var("PASSWORD");
        config.token_cache_dir = var("TOKEN_CACHE_DIR").map(PathBuf::from);
        config.paths_file = var("PATHS_FILE").map(PathBuf::from);
        if let Some(v) = var("CONTENT_TYPE") {
            config.content_type = v
                .parse()
                .map_err(|e: String| Error::configuration_with_context(e, "REST_CHAIN_CONTENT_TYPE"))?;
        }
        if let Some(v) = var("TIMEOUT_SECS") {
            config.timeout_secs = v.parse().map_err(|_| {
                Error::configuration_with_context(format!("invalid timeout '{}'", v), "REST_CHAIN_TIMEOUT_SECS")
            })?;
        }
        Ok(config)
    }

    /// Fail early on settings no request can succeed without.
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(Error::configuration_with_context("consumer key is empty", "key"));
        }
        if self.base_url.is_empty() {
            return Err(Error::configuration_with_context("base url is empty", "base_url"));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(format!("invalid base url: {}", e), "base_url")
        })?;
        Ok(())
    }

    /// Username and password, when both are present and non-empty.
    pub fn login_credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }
}

fn keyring_secret(key: &str) -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, key).ok()?;
    entry.get_password().ok()
}
