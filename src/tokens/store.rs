//! Token store implementations.

use super::key::token_file_path;
use super::token::Token;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Persistence contract shared by every token cache strategy.
///
/// `principal` is the username the token belongs to, or `None` for
/// single-tenant setups.
pub trait TokenStore: Send {
    fn get(&self, principal: Option<&str>) -> Result<Option<Token>>;
    fn set(&self, principal: Option<&str>, token: &Token) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Durable store: one JSON file per principal under a directory.
///
/// There is no locking; concurrent writers for the same principal race and
/// the last write wins.
pub struct FileTokenStore {
    dir: PathBuf,
    prefix: String,
}

impl FileTokenStore {
    pub const DEFAULT_DIR: &'static str = "tokens";
    pub const DEFAULT_PREFIX: &'static str = "rc";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: Self::DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the token for `principal` lives.
    pub fn path_for(&self, principal: Option<&str>) -> PathBuf {
        token_file_path(&self.dir, &self.prefix, principal)
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIR)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, principal: Option<&str>) -> Result<Option<Token>> {
        let path = self.path_for(principal);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Token>(&content) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                // An unreadable file is treated as a miss; the next exchange overwrites it.
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt token file");
                Ok(None)
            }
        }
    }

    fn set(&self, principal: Option<&str>, token: &Token) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(principal);
        std::fs::write(&path, serde_json::to_vec(token)?)?;
        tracing::debug!(path = %path.display(), "persisted access token");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Caller-owned session state shared by ephemeral stores.
///
/// Create one at session start and drop it at session end; clones share the
/// same slots.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    slots: Arc<Mutex<HashMap<String, Token>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: &str) -> Result<Option<Token>> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| Error::token_store(format!("session lock poisoned: {}", e)))?;
        Ok(slots.get(slot).cloned())
    }

    pub fn set(&self, slot: &str, token: Token) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| Error::token_store(format!("session lock poisoned: {}", e)))?;
        slots.insert(slot.to_string(), token);
        Ok(())
    }

    pub fn remove(&self, slot: &str) -> Result<Option<Token>> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| Error::token_store(format!("session lock poisoned: {}", e)))?;
        Ok(slots.remove(slot))
    }
}

/// Session-scoped store with a single slot.
///
/// The principal is ignored: a session holds at most one token, whoever it
/// was obtained for.
pub struct EphemeralTokenStore {
    session: SessionContext,
}

impl EphemeralTokenStore {
    pub const SLOT: &'static str = "access_token";

    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}

impl TokenStore for EphemeralTokenStore {
    fn get(&self, _principal: Option<&str>) -> Result<Option<Token>> {
        self.session.get(Self::SLOT)
    }

    fn set(&self, _principal: Option<&str>, token: &Token) -> Result<()> {
        self.session.set(Self::SLOT, token.clone())
    }

    fn name(&self) -> &'static str {
        "ephemeral"
    }
}

type GetFn = Box<dyn Fn(Option<&str>) -> Result<Option<Token>> + Send>;
type SetFn = Box<dyn Fn(Option<&str>, &Token) -> Result<()> + Send>;

/// Store backed by caller-supplied handlers.
pub struct CustomTokenStore {
    get: GetFn,
    set: SetFn,
}

impl CustomTokenStore {
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn(Option<&str>) -> Result<Option<Token>> + Send + 'static,
        S: Fn(Option<&str>, &Token) -> Result<()> + Send + 'static,
    {
        Self {
            get: Box::new(get),
            set: Box::new(set),
        }
    }
}

impl TokenStore for CustomTokenStore {
    fn get(&self, principal: Option<&str>) -> Result<Option<Token>> {
        (self.get)(principal)
    }

    fn set(&self, principal: Option<&str>, token: &Token) -> Result<()> {
        (self.set)(principal, token)
    }

    fn name(&self) -> &'static str {
        "custom"
    }
}
