use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::core::{ResourceInfo, ResourceRegistry};
use crate::error::RegistryError;

/// On-disk registration table.
///
/// ```yaml
/// resources:
///   - type: tasks
///     relationships: [project]
///     attributes: [name]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

/// One resource entry in a [`RegistryConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub relationships: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl TryFrom<ResourceConfig> for ResourceInfo {
    type Error = RegistryError;

    /// Rejects a name listed both as a relationship and as an attribute.
    fn try_from(cfg: ResourceConfig) -> Result<Self, Self::Error> {
        if let Some(name) = cfg
            .relationships
            .iter()
            .find(|name| cfg.attributes.contains(name))
        {
            tracing::error!(
                resource_type = %cfg.resource_type,
                field = %name,
                "Field declared as both relationship and attribute"
            );
            return Err(RegistryError::InvalidRegistration {
                resource: cfg.resource_type,
                reason: "a name cannot be both a relationship and an attribute",
            });
        }
        let info = cfg
            .attributes
            .into_iter()
            .fold(ResourceInfo::new(cfg.resource_type), |info, name| info.attribute(name));
        Ok(cfg
            .relationships
            .into_iter()
            .fold(info, |info, name| info.relationship(name)))
    }
}

impl RegistryConfig {
    /// Build an immutable registry, rejecting duplicate types.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidRegistration`] when an entry lists a name as both
    /// relationship and attribute, plus the errors of
    /// [`ResourceRegistryBuilder::register`](super::ResourceRegistryBuilder::register).
    pub fn into_registry(self) -> Result<ResourceRegistry, RegistryError> {
        self.resources
            .into_iter()
            .try_fold(ResourceRegistry::builder(), |builder, cfg| {
                builder.register(ResourceInfo::try_from(cfg)?)
            })
            .map(|builder| builder.build())
    }
}

/// Serialisation format of a registry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFormat {
    Yaml,
    Toml,
    Json,
}

impl RegistryFormat {
    /// Pick the format from a file extension; anything unrecognised is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => RegistryFormat::Yaml,
            Some("toml") => RegistryFormat::Toml,
            _ => RegistryFormat::Json,
        }
    }
}

/// Parse a registry from an in-memory document.
///
/// # Errors
///
/// [`RegistryError::Load`] when the document does not deserialise, plus any
/// registration error.
pub fn load_registry_from_str(
    content: &str,
    format: RegistryFormat,
) -> Result<ResourceRegistry, RegistryError> {
    let config: RegistryConfig = match format {
        RegistryFormat::Yaml => serde_yaml::from_str(content).map_err(anyhow::Error::from),
        RegistryFormat::Toml => toml::from_str(content).map_err(anyhow::Error::from),
        RegistryFormat::Json => serde_json::from_str(content).map_err(anyhow::Error::from),
    }
    .map_err(|source| RegistryError::Load {
        path: "<inline>".to_string(),
        source,
    })?;
    config.into_registry()
}

/// Read and build a registry from a YAML, TOML or JSON file.
///
/// # Errors
///
/// [`RegistryError::Load`] on I/O or parse failures, plus any registration error.
pub fn load_registry(path: impl AsRef<Path>) -> Result<ResourceRegistry, RegistryError> {
    let path = path.as_ref();
    let shown_path = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {shown_path}"))
        .map_err(|source| RegistryError::Load {
            path: shown_path.clone(),
            source,
        })?;

    let registry = load_registry_from_str(&content, RegistryFormat::from_path(path)).map_err(
        |err| match err {
            RegistryError::Load { source, .. } => RegistryError::Load {
                path: shown_path.clone(),
                source,
            },
            other => other,
        },
    )?;

    info!(
        path = %shown_path,
        resources_count = registry.len(),
        "Registry file loaded"
    );
    Ok(registry)
}
