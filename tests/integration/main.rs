//! Integration tests against a local mock HTTP server and in-process fake
//! transports.

mod chain_dispatch;
mod mock_server;
mod token_cache;
