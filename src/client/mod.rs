//! Chained REST client.
//!
//! Calls accumulate into an endpoint id; a table hit resolves the path,
//! dispatches the request and resets the chain. Implementation details are
//! split into submodules.

mod builder;
mod chain;
mod content;
mod core;
mod dispatch;

pub use builder::ApiClientBuilder;
pub use chain::{resolve_call, ChainState, ResolvedCall};
pub use content::{Body, ContentType, Document, DocumentParser, TextDocument, TextDocumentParser};
pub use self::core::ApiClient;
pub use dispatch::{RequestDispatcher, Response};
