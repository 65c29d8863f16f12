//! # Query Parameter Module
//!
//! Parses JSON:API bracket-notation query parameters into typed,
//! multi-dimensional containers and offers a read-side DSL over them.
//!
//! ## Families
//!
//! | Key | Shape | Value type |
//! |---|---|---|
//! | `filter[type][attr]` | two dimensions, many values | `String` |
//! | `sort[type][attr]` | two dimensions, one value | [`SortDirection`] |
//! | `group[type]` | one dimension | `String` |
//! | `fields[type]` | one dimension | `String` |
//! | `include[type]` | one dimension | [`Inclusion`] |
//! | `page[key]` | flat, fixed keys | `i64` |
//!
//! All three access shapes are one generic container, [`TypedParams`], whose
//! second level selects the method set: `get(dim1)` for one-dimensional
//! families, `get(dim1, dim2)` for the others. Every lookup returns a
//! [`ValueSet`]; a key that was never supplied yields an empty set rather than
//! an error.
//!
//! Keys that match none of the families are ignored, so clients may send
//! parameters this crate does not know about.
//!
//! ## Example
//!
//! ```rust
//! use jsonapi_router::params::{parse_query_params, RawParams};
//!
//! let raw = RawParams::from_query("filter[tasks][name]=write&sort[tasks][name]=desc&page[size]=10");
//! let params = parse_query_params(&raw)?;
//!
//! assert_eq!(params.filters().get("tasks", "name").one().map(String::as_str), Some("write"));
//! assert_eq!(params.page().size(), Some(10));
//! assert!(params.page().number().is_none());
//! # Ok::<(), jsonapi_router::error::JsonApiError>(())
//! ```

mod core;
mod parser;
mod query;


pub use core::{
    to_query_string, Inclusion, NameValuePair, OneDimParams, OneDimensional, PaginationKey,
    ParamFamily, RawParams, SortDirection, TwoDimParams, TwoDimSingleParams, TwoDimensional,
    TwoDimensionalSingle, TypedParams,
};
pub use parser::{parse_key, parse_query_params, ParsedKey};
pub use query::{PageParams, QueryParams, ValueSet};
