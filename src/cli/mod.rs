//! # CLI Module
//!
//! Command-line access to the router's building blocks, for checking a
//! registry file and seeing how requests decompose without running a server.
//!
//! ## Commands
//!
//! ### `resolve`
//!
//! Resolve a path against the registry and print its segment chain, canonical
//! form and absolute self link:
//!
//! ```bash
//! jsonapi-router --registry registry.yaml resolve /tasks/1/relationships/project
//! ```
//!
//! ### `params`
//!
//! Parse a query string and print the normalised `name=value` pairs:
//!
//! ```bash
//! jsonapi-router params 'filter[tasks][name]=x&sort[tasks][name]=desc'
//! ```
//!
//! ### `inspect`
//!
//! List registered resources with their relationships and attributes.
//!
//! ### `dispatch`
//!
//! Run a request through echo handlers, printing the status and JSON body the
//! dispatcher produced:
//!
//! ```bash
//! jsonapi-router -r registry.yaml dispatch -X POST '/tasks' --body '{"data":{"type":"tasks"}}'
//! ```
//!
//! `resolve`, `params` and `inspect` accept `--format json`.
//!
//! ## Configuration
//!
//! The registry comes from `--registry` or `JSONAPI_REGISTRY`. Links are built
//! under `JSONAPI_BASE_URL` (see [`crate::runtime_config`]). Logs go to stderr
//! (see [`crate::logging`]).

mod commands;


pub use commands::{execute, run_cli, Cli, Commands, OutputFormat};
