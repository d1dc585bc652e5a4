//! Token cache: store lookup, exchange on miss, persist.

use super::exchange::CredentialExchanger;
use super::store::TokenStore;
use super::token::Token;
use crate::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub exchanges: u64,
    pub writes: u64,
}

impl TokenCacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Holds the active token and the store it is persisted in.
pub struct TokenCache {
    store: Box<dyn TokenStore>,
    current: Option<Token>,
    stats: TokenCacheStats,
}

impl TokenCache {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self {
            store,
            current: None,
            stats: TokenCacheStats::default(),
        }
    }

    /// Return a token for `username`, negotiating one at most once.
    ///
    /// An empty username is passed to the store as no principal.
    pub fn ensure(
        &mut self,
        username: &str,
        password: &str,
        exchanger: &CredentialExchanger,
    ) -> Result<Token> {
        let principal = (!username.is_empty()).then_some(username);

        let token = match self.store.get(principal)? {
            Some(token) => {
                self.stats.hits += 1;
                debug!(store = self.store.name(), "access token cache hit");
                token
            }
            None => {
                self.stats.misses += 1;
                info!(store = self.store.name(), "no cached access token, exchanging credentials");
                let token = exchanger.obtain_token(username, password, false, true)?;
                self.stats.exchanges += 1;
                self.store.set(principal, &token)?;
                self.stats.writes += 1;
                token
            }
        };

        self.current = Some(token.clone());
        Ok(token)
    }

    /// The token used to sign requests, if any.
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Use `token` for subsequent requests without touching the store.
    pub fn set_current(&mut self, token: Token) {
        self.current = Some(token);
    }

    /// Forget the in-memory token; the store keeps its copy.
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn stats(&self) -> TokenCacheStats {
        self.stats.clone()
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }
}
