//! # Registry Module
//!
//! The registry module holds the resource metadata the path resolver validates
//! against: which resource types exist, and which relationship and attribute
//! names each of them declares.
//!
//! ## Overview
//!
//! The resolver only ever talks to the [`ResourceMetadataProvider`] trait, so any
//! metadata source can be plugged in. The crate ships one implementation,
//! [`ResourceRegistry`], built once at process start either from an explicit
//! registration table or from a YAML/TOML/JSON file:
//!
//! ```rust
//! use jsonapi_router::registry::{ResourceInfo, ResourceRegistry};
//!
//! let registry = ResourceRegistry::builder()
//!     .register(ResourceInfo::new("tasks").relationship("project").attribute("name"))?
//!     .register(ResourceInfo::new("projects").relationship("tasks"))?
//!     .build();
//!
//! assert!(registry.contains("tasks"));
//! # Ok::<(), jsonapi_router::error::RegistryError>(())
//! ```
//!
//! Registering the same resource type twice is a startup-time configuration
//! error ([`RegistryError::DuplicateResource`](crate::error::RegistryError)).
//!
//! ## Concurrency
//!
//! A built registry is never mutated. It is `Send + Sync` and can be shared
//! between request threads behind an `Arc` without locking.

mod core;
mod load;

pub use core::{
    FieldKind, ResourceInfo, ResourceMetadataProvider, ResourceRegistry, ResourceRegistryBuilder,
};
pub use load::{load_registry, load_registry_from_str, RegistryConfig, RegistryFormat, ResourceConfig};
