#![allow(dead_code)]

//! Shared fixtures for integration tests.

use std::io::Write;
use std::sync::Arc;

use jsonapi_router::registry::{ResourceInfo, ResourceRegistry};
use tempfile::NamedTempFile;

/// `tasks`, `projects` and `users`, linked to each other.
pub fn fixture_registry() -> ResourceRegistry {
    ResourceRegistry::builder()
        .register(
            ResourceInfo::new("tasks")
                .relationship("project")
                .relationship("assignee")
                .attribute("name")
                .attribute("done"),
        )
        .and_then(|b| {
            b.register(
                ResourceInfo::new("projects")
                    .relationship("tasks")
                    .relationship("owner")
                    .attribute("name"),
            )
        })
        .and_then(|b| b.register(ResourceInfo::new("users").relationship("projects").attribute("email")))
        .expect("fixture registry")
        .build()
}

pub fn shared_registry() -> Arc<ResourceRegistry> {
    Arc::new(fixture_registry())
}

pub mod temp_files {
    use super::*;

    /// Write `content` to a temporary file whose extension selects the registry format.
    pub fn create_temp_registry(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("jsonapi_registry_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .expect("create temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file.flush().expect("flush temp file");
        file
    }
}
