use tracing::{debug, warn};

use super::core::{JsonPath, PathIds, SegmentKind, RELATIONSHIP_MARK, SEPARATOR};
use crate::error::JsonApiError;
use crate::registry::ResourceMetadataProvider;

/// Parses raw request paths against a metadata provider.
///
/// The path must not contain scheme or host. A single leading and trailing
/// separator are optional: `/tasks/1/`, `/tasks/1` and `tasks/1` resolve to the
/// same chain.
pub struct PathResolver<'a, P: ResourceMetadataProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: ResourceMetadataProvider + ?Sized> PathResolver<'a, P> {
    #[must_use]
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Resolve `raw` into a segment chain.
    ///
    /// # Errors
    ///
    /// - [`JsonApiError::MalformedPath`] for an empty path, an empty token
    ///   (`/tasks//1`), an empty id list, or a dangling `relationships` marker
    /// - [`JsonApiError::UnknownResource`] when the first token is not a
    ///   registered resource type
    /// - [`JsonApiError::UnknownField`] when a later token is not a
    ///   relationship declared on the anchoring resource; attributes are not
    ///   addressable as path segments
    /// - [`JsonApiError::InvalidStructure`] when a relationship or field token
    ///   is followed by an id list
    pub fn resolve(&self, raw: &str) -> Result<JsonPath, JsonApiError> {
        let tokens = split_path(raw)?;
        let mut path: Option<JsonPath> = None;
        let mut idx = 0;

        while idx < tokens.len() {
            let mut relationship_mark = false;
            if tokens[idx] == RELATIONSHIP_MARK {
                relationship_mark = true;
                idx += 1;
            }

            let element_name = match tokens.get(idx) {
                Some(token) if *token != RELATIONSHIP_MARK => {
                    idx += 1;
                    *token
                }
                _ => {
                    return Err(JsonApiError::malformed(
                        raw,
                        "relationship marker must be followed by a relationship name",
                    ))
                }
            };

            let ids_token = match tokens.get(idx) {
                Some(token) if *token != RELATIONSHIP_MARK => {
                    idx += 1;
                    Some(*token)
                }
                _ => None,
            };

            match path.as_mut() {
                None => {
                    if relationship_mark || !self.provider.resource_exists(element_name) {
                        debug!(path = %raw, resource = %element_name, "Unknown resource in path");
                        return Err(JsonApiError::UnknownResource {
                            name: element_name.to_string(),
                        });
                    }
                    let ids = ids_token.map(|token| parse_ids(raw, token)).transpose()?;
                    path = Some(JsonPath::resource(element_name, ids));
                }
                Some(chain) => {
                    let kind = self.non_resource_kind(chain, element_name, relationship_mark)?;
                    if let Some(ids) = ids_token {
                        warn!(
                            path = %raw,
                            segment = %element_name,
                            ids = %ids,
                            "Ids after a relationship or field segment"
                        );
                        return Err(JsonApiError::InvalidStructure {
                            segment: element_name.to_string(),
                            ids: ids.to_string(),
                        });
                    }
                    chain.push(element_name.to_string(), kind);
                }
            }
        }

        let path = path.ok_or_else(|| JsonApiError::malformed(raw, "path is empty"))?;
        debug!(
            path = %raw,
            resource_type = %path.resource_type(),
            segments = path.len(),
            collection = path.is_collection(),
            "Path resolved"
        );
        Ok(path)
    }

    fn non_resource_kind(
        &self,
        chain: &JsonPath,
        element_name: &str,
        relationship_mark: bool,
    ) -> Result<SegmentKind, JsonApiError> {
        let anchor = chain.anchor().name();
        let unknown = || JsonApiError::UnknownField {
            resource: anchor.to_string(),
            field: element_name.to_string(),
        };

        if !self.provider.is_relationship(anchor, element_name) {
            debug!(resource = %anchor, field = %element_name, "Unknown relationship in path");
            return Err(unknown());
        }
        if relationship_mark {
            Ok(SegmentKind::Relationship)
        } else {
            Ok(SegmentKind::Field)
        }
    }
}

/// Shorthand for `PathResolver::new(provider).resolve(raw)`.
///
/// # Errors
///
/// See [`PathResolver::resolve`].
pub fn resolve_path<P: ResourceMetadataProvider + ?Sized>(
    provider: &P,
    raw: &str,
) -> Result<JsonPath, JsonApiError> {
    PathResolver::new(provider).resolve(raw)
}

fn split_path(raw: &str) -> Result<Vec<&str>, JsonApiError> {
    let trimmed = raw.strip_prefix(SEPARATOR).unwrap_or(raw);
    let trimmed = trimmed.strip_suffix(SEPARATOR).unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(JsonApiError::malformed(raw, "path is empty"));
    }

    let tokens: Vec<&str> = trimmed.split(SEPARATOR).collect();
    if tokens.iter().any(|token| token.is_empty()) {
        return Err(JsonApiError::malformed(raw, "path contains an empty segment"));
    }
    Ok(tokens)
}

fn parse_ids(raw: &str, token: &str) -> Result<PathIds, JsonApiError> {
    let ids = PathIds::parse(token);
    if ids.is_empty() {
        return Err(JsonApiError::malformed(raw, "id list is empty"));
    }
    Ok(ids)
}
