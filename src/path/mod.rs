//! # Path Module
//!
//! The path module turns a raw JSON:API request path into a validated chain of
//! typed segments, and turns such a chain back into its canonical string.
//!
//! ## Overview
//!
//! A JSON:API path addresses one of four things:
//!
//! | Path | Subject |
//! |---|---|
//! | `/tasks` or `/tasks/1,2` | a collection of `tasks` |
//! | `/tasks/1` | one `tasks` resource |
//! | `/tasks/1/project` | the related resource behind the `project` field |
//! | `/tasks/1/relationships/project` | the `project` relationship itself |
//!
//! [`PathResolver::resolve`] walks the tokens left to right. The first segment
//! must name a registered resource type; every later segment must be a
//! relationship declared on the anchoring resource. The literal
//! `relationships` token selects a [`SegmentKind::Relationship`] over a
//! [`SegmentKind::Field`]. Ids are only legal directly after a resource type.
//!
//! ## Chain Representation
//!
//! Segments live in an arena ([`JsonPath`]) and link to their neighbours by
//! index ([`SegmentId`]), so walking from the subject back to the root never
//! involves shared ownership.
//!
//! ## Example
//!
//! ```rust
//! use jsonapi_router::path::{PathResolver, SegmentKind};
//! use jsonapi_router::registry::{ResourceInfo, ResourceRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ResourceRegistry::builder()
//!     .register(ResourceInfo::new("tasks").relationship("project"))?
//!     .build();
//!
//! let path = PathResolver::new(&registry).resolve("/tasks/1/relationships/project")?;
//! assert_eq!(path.root().name(), "tasks");
//! assert_eq!(path.subject().kind(), &SegmentKind::Relationship);
//! assert_eq!(path.to_string(), "/tasks/1/relationships/project/");
//! # Ok(())
//! # }
//! ```

mod core;
mod resolve;
mod serialize;
#[cfg(test)]
mod tests;

pub use core::{
    Ancestors, JsonPath, PathIds, PathSegment, SegmentId, SegmentKind, ID_SEPARATOR, RELATIONSHIP_MARK,
    SEPARATOR,
};
pub use resolve::{resolve_path, PathResolver};
pub use serialize::serialize_path;
