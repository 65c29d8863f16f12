//! # jsonapi_router
//!
//! Request routing and parameter resolution for [JSON:API](https://jsonapi.org)
//! resource servers.
//!
//! ## Overview
//!
//! A JSON:API request is decomposed in three steps before any business logic
//! runs:
//!
//! 1. **Path resolution** ([`path`]) - `/tasks/1/relationships/project` becomes
//!    a chain of typed segments validated against the [`registry`] of known
//!    resource types and their fields.
//! 2. **Parameter parsing** ([`params`]) - bracket-notation keys such as
//!    `filter[tasks][name]`, `sort[tasks][name]` and `page[size]` become typed,
//!    multi-dimensional containers with a lookup DSL.
//! 3. **Dispatch** ([`dispatcher`]) - the request shape (collection, single
//!    resource, field or relationship) and HTTP method select one of eleven
//!    controller kinds. Handler errors and panics are normalised into JSON:API
//!    error documents.
//!
//! ## Architecture
//!
//! - **[`registry`]** - immutable resource metadata, built in code or loaded
//!   from YAML, TOML or JSON
//! - **[`path`]** - segment chain resolution and canonical serialisation
//! - **[`params`]** - query parameter families and the read-side DSL
//! - **[`dispatcher`]** - controller selection, exception mapping, panic recovery
//! - **[`error`]** - error taxonomy with default HTTP statuses
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`runtime_config`]** - environment-driven settings
//! - **[`cli`]** - the `jsonapi-router` inspection binary
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use http::Method;
//! use jsonapi_router::dispatcher::{ControllerKind, Dispatcher, HandlerResponse, JsonApiRequest};
//! use jsonapi_router::registry::{ResourceInfo, ResourceRegistry};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ResourceRegistry::builder()
//!     .register(ResourceInfo::new("tasks").relationship("project").attribute("name"))?
//!     .build();
//!
//! let dispatcher = Dispatcher::builder(Arc::new(registry))
//!     .controller(
//!         ControllerKind::ResourceGet,
//!         |req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> {
//!             let id = req.path.ids().and_then(|ids| ids.first()).unwrap_or_default();
//!             Ok(HandlerResponse::ok(json!({ "data": { "type": "tasks", "id": id } })))
//!         },
//!     )
//!     .build();
//!
//! let response = dispatcher.dispatch_raw(Method::GET, "/tasks/7", "fields[tasks]=name", None);
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body["data"]["id"], "7");
//!
//! let response = dispatcher.dispatch_raw(Method::GET, "/tasks", "", None);
//! assert_eq!(response.status, 406);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Registries and dispatchers are built once and never mutated afterwards.
//! Both are `Send + Sync`; share them behind an `Arc` and dispatch from as many
//! threads as needed. Handlers run synchronously on the calling thread.

pub mod cli;
pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod ids;
pub mod logging;
pub mod params;
pub mod path;
pub mod registry;
pub mod runtime_config;

pub use dispatcher::{ControllerKind, Dispatcher, HandlerResponse, JsonApiRequest};
pub use error::{JsonApiError, RegistryError};
pub use params::{parse_query_params, QueryParams, RawParams};
pub use path::{resolve_path, JsonPath, PathResolver};
pub use registry::{load_registry, ResourceInfo, ResourceMetadataProvider, ResourceRegistry};
