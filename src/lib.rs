//! # rest-chain
//!
//! Table-driven REST client with chained call syntax, OAuth1 request signing
//! and pluggable access token caching.
//!
//! ## Overview
//!
//! Endpoints are described by data: a [`PathTable`] maps an endpoint id such as
//! `user_show` to a verb and a path template (`GET /user/{id}/show`). Callers
//! build the id one call at a time; scalar arguments fill the placeholders in
//! order, and the request is sent as soon as the id names a table entry.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rest_chain::{ApiClient, ClientConfig};
//! use serde_json::json;
//!
//! fn main() -> rest_chain::Result<()> {
//!     let mut client = ApiClient::builder()
//!         .config(
//!             ClientConfig::new("consumer-key", "consumer-secret", "https://api.example.com")
//!                 .with_credentials("jo", "secret")
//!                 .with_token_cache_dir("tokens"),
//!         )
//!         .paths_file("api_paths.json")
//!         .build()?;
//!
//!     client.step("user")?.step("myaccount")?;
//!     println!("{:?}", client.get_json());
//!
//!     client.call("user", [json!(12)])?.step("show")?;
//!     if client.has_error() {
//!         println!("{:?}", client.error());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`ApiClient`], chain accumulation and request dispatch |
//! | [`paths`] | Endpoint tables and path templates |
//! | [`tokens`] | Access token exchange, caching and stores |
//! | [`transport`] | OAuth1 signing and the blocking HTTP transport |
//! | [`config`] | [`ClientConfig`] from files, environment or code |
//! | [`error`] | Error types |

pub mod client;
pub mod config;
pub mod error;
pub mod paths;
pub mod tokens;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder, Body, ContentType, Response};
pub use config::ClientConfig;
pub use error::{ApiError, Error, RequestContext};
pub use paths::{PathTable, Verb};
pub use tokens::{SessionContext, Token, TokenStore};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
