//! Endpoint table layer: loading, validating and resolving declarative paths.
//!
//! # Endpoint Table
//!
//! Every callable endpoint is described by data rather than code. A table maps
//! a compound endpoint id (call names joined by `_`) to an HTTP verb and a path
//! template:
//!
//! ```json
//! {
//!   "user_myaccount": {"verb": "GET", "path": "/user/myaccount"},
//!   "user_show":      {"verb": "GET", "path": "/user/{id}/show"}
//! }
//! ```
//!
//! Placeholders (`{id}`) are substituted by position only; their names are
//! informational.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`table`] | [`PathTable`], [`Endpoint`] and [`Verb`] |
//! | [`template`] | [`PathTemplate`] parsing and substitution |
//! | [`loader`] | Loading tables from JSON/YAML files |
//! | [`error`] | Table specific error types |

pub mod error;
pub mod loader;
pub mod table;
pub mod template;

pub use error::PathTableError;
pub use table::{Endpoint, PathTable, Verb};
pub use template::{PathTemplate, Segment, UnresolvedPlaceholder};
