//! # Dispatcher Module
//!
//! The dispatcher selects a handler for a decomposed request from its HTTP
//! method and path shape, runs it, and turns every failure into a JSON:API
//! error document.
//!
//! ## Overview
//!
//! Handlers are registered per [`ControllerKind`], the fixed, ordered set of
//! request shapes:
//!
//! | Shape | Example |
//! |---|---|
//! | collection-get | `GET /tasks`, `GET /tasks/1,2` |
//! | resource-get | `GET /tasks/1` |
//! | field-get | `GET /tasks/1/project` |
//! | relationship-get | `GET /tasks/1/relationships/project` |
//! | resource-post | `POST /tasks` |
//! | field-post | `POST /tasks/1/project` |
//! | relationship-post | `POST /tasks/1/relationships/project` |
//! | resource-patch | `PATCH /tasks/1` |
//! | relationship-patch | `PATCH /tasks/1/relationships/project` |
//! | resource-delete | `DELETE /tasks/1` |
//! | relationship-delete | `DELETE /tasks/1/relationships/project` |
//!
//! The first registered shape whose predicate accepts the request wins.
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use jsonapi_router::dispatcher::{ControllerKind, Dispatcher, HandlerResponse, JsonApiRequest};
//! use jsonapi_router::registry::{ResourceInfo, ResourceRegistry};
//!
//! let registry = ResourceRegistry::builder()
//!     .register(ResourceInfo::new("tasks").relationship("project"))?
//!     .build();
//!
//! let dispatcher = Dispatcher::builder(Arc::new(registry))
//!     .controller(ControllerKind::ResourceGet, |req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> {
//!         let id = req.path.ids().and_then(|ids| ids.first()).unwrap_or_default();
//!         Ok(HandlerResponse::ok(serde_json::json!({ "data": { "type": "tasks", "id": id } })))
//!     })
//!     .build();
//!
//! assert_eq!(dispatcher.dispatch_raw(Method::GET, "/tasks/1", "", None).status, 200);
//! assert_eq!(dispatcher.dispatch_raw(Method::DELETE, "/tasks/1", "", None).status, 406);
//! # Ok::<(), jsonapi_router::error::RegistryError>(())
//! ```
//!
//! ## Error Handling
//!
//! `dispatch` never fails:
//! - no accepting shape: 406
//! - handler error: first matching [`ExceptionMapperRegistry`] entry, else 422
//!   with the error message as `detail`
//! - handler panic: caught and reported as 422
//!
//! ## Concurrency
//!
//! A built [`Dispatcher`] is immutable and `Send + Sync`; handlers run
//! synchronously on the caller's thread.

mod controller;
mod core;
mod mapper;

pub use controller::{ControllerKind, Handler};
pub use core::{
    Dispatcher, DispatcherBuilder, HandlerResponse, HeaderVec, JsonApiRequest, JSONAPI_MEDIA_TYPE,
    MAX_INLINE_HEADERS,
};
pub use mapper::{ExceptionMapperRegistry, UNHANDLED_DETAIL};
