use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::path::RELATIONSHIP_MARK;

/// Read-only view of resource metadata used by the path resolver.
///
/// Implementations must be safe for concurrent reads; the resolver never
/// mutates metadata.
pub trait ResourceMetadataProvider: Send + Sync {
    /// Whether `name` is a registered resource type.
    fn resource_exists(&self, name: &str) -> bool;

    /// All relationship and attribute names declared on `resource`.
    ///
    /// Returns an empty set for unknown resources.
    fn relationship_or_field_names(&self, resource: &str) -> BTreeSet<String>;

    /// Whether `field` is declared as a relationship on `resource`.
    fn is_relationship(&self, resource: &str, field: &str) -> bool;

    /// Whether `field` is declared on `resource` at all.
    fn has_relationship_or_field(&self, resource: &str, field: &str) -> bool {
        self.relationship_or_field_names(resource).contains(field)
    }
}

/// What a declared name on a resource refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// A link to another resource (`/tasks/1/relationships/project`)
    Relationship,
    /// A plain attribute; listed by the registry but not addressable in paths
    Attribute,
}

/// Metadata for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// JSON:API type name, also the first path segment
    pub resource_type: String,
    /// Declared relationship and attribute names
    pub fields: BTreeMap<String, FieldKind>,
}

impl ResourceInfo {
    /// Start describing a resource type with no fields.
    #[must_use]
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Declare a relationship field.
    #[must_use]
    pub fn relationship(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), FieldKind::Relationship);
        self
    }

    /// Declare an attribute field.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), FieldKind::Attribute);
        self
    }

    /// Names declared as relationships.
    pub fn relationships(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, kind)| **kind == FieldKind::Relationship)
            .map(|(name, _)| name.as_str())
    }

    /// Names declared as attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, kind)| **kind == FieldKind::Attribute)
            .map(|(name, _)| name.as_str())
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let invalid = |reason| RegistryError::InvalidRegistration {
            resource: self.resource_type.clone(),
            reason,
        };
        if self.resource_type.is_empty() {
            return Err(invalid("resource type must not be empty"));
        }
        if self.resource_type.contains('/') {
            return Err(invalid("resource type must not contain '/'"));
        }
        if self.resource_type == RELATIONSHIP_MARK {
            return Err(invalid("'relationships' is a reserved path token"));
        }
        for name in self.fields.keys() {
            if name.is_empty() || name.contains('/') {
                return Err(invalid("field names must be non-empty and must not contain '/'"));
            }
            if name == RELATIONSHIP_MARK {
                return Err(invalid("'relationships' is a reserved path token"));
            }
        }
        Ok(())
    }
}

/// Static resource registration table.
///
/// Built once through [`ResourceRegistryBuilder`] and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<String, ResourceInfo>,
}

impl ResourceRegistry {
    /// Create a builder for a new registry.
    #[must_use]
    pub fn builder() -> ResourceRegistryBuilder {
        ResourceRegistryBuilder::default()
    }

    /// Look up metadata for a resource type.
    #[must_use]
    pub fn get(&self, resource_type: &str) -> Option<&ResourceInfo> {
        self.resources.get(resource_type)
    }

    /// Whether the resource type is registered.
    #[must_use]
    pub fn contains(&self, resource_type: &str) -> bool {
        self.resources.contains_key(resource_type)
    }

    /// Registered resources, ordered by type name.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceInfo> {
        self.resources.values()
    }

    /// Number of registered resource types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceMetadataProvider for ResourceRegistry {
    fn resource_exists(&self, name: &str) -> bool {
        self.contains(name)
    }

    fn relationship_or_field_names(&self, resource: &str) -> BTreeSet<String> {
        self.get(resource)
            .map(|info| info.fields.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn is_relationship(&self, resource: &str, field: &str) -> bool {
        self.get(resource)
            .and_then(|info| info.fields.get(field))
            .is_some_and(|kind| *kind == FieldKind::Relationship)
    }

    fn has_relationship_or_field(&self, resource: &str, field: &str) -> bool {
        self.get(resource)
            .is_some_and(|info| info.fields.contains_key(field))
    }
}

/// Accumulates registrations and rejects duplicates.
#[derive(Debug, Default)]
pub struct ResourceRegistryBuilder {
    resources: BTreeMap<String, ResourceInfo>,
}

impl ResourceRegistryBuilder {
    /// Register a resource type.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateResource`] when the type is already registered,
    /// [`RegistryError::InvalidRegistration`] when a name is empty or reserved.
    pub fn register(mut self, info: ResourceInfo) -> Result<Self, RegistryError> {
        info.validate()?;
        if self.resources.contains_key(&info.resource_type) {
            tracing::error!(
                resource_type = %info.resource_type,
                "Duplicate resource registration"
            );
            return Err(RegistryError::DuplicateResource(info.resource_type));
        }
        debug!(
            resource_type = %info.resource_type,
            fields = info.fields.len(),
            "Found JSON:API resource"
        );
        self.resources.insert(info.resource_type.clone(), info);
        Ok(self)
    }

    /// Finish building. The result is immutable.
    #[must_use]
    pub fn build(self) -> ResourceRegistry {
        info!(
            resources_count = self.resources.len(),
            resources = ?self.resources.keys().collect::<Vec<_>>(),
            "Resource registry loaded"
        );
        ResourceRegistry {
            resources: self.resources,
        }
    }
}
