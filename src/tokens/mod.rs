//! Access token lifecycle: negotiation, caching and persistence.
//!
//! # Token Caching
//!
//! Negotiating a token costs a signed round trip with the user's password, so
//! tokens are cached behind a single [`TokenStore`] contract:
//!
//! | Store | Scope |
//! |-------|-------|
//! | [`FileTokenStore`] | One file per principal, survives restarts |
//! | [`EphemeralTokenStore`] | One slot in a caller owned [`SessionContext`] |
//! | [`CustomTokenStore`] | Caller supplied `get`/`set` handlers |
//!
//! [`TokenCache`] checks the store, runs the [`CredentialExchanger`] on a miss
//! and writes the fresh token back.
//!
//! ```rust,no_run
//! use rest_chain::tokens::{FileTokenStore, TokenCache};
//!
//! let cache = TokenCache::new(Box::new(FileTokenStore::new("tokens")));
//! assert!(cache.current().is_none());
//! ```

mod cache;
mod exchange;
mod key;
mod store;
mod token;

pub use cache::{TokenCache, TokenCacheStats};
pub use exchange::{CredentialExchanger, TokenEndpoints};
pub use key::{principal_digest, token_file_path};
pub use store::{CustomTokenStore, EphemeralTokenStore, FileTokenStore, SessionContext, TokenStore};
pub use token::Token;
