use std::fmt;

use http::Method;
use serde::Serialize;

use super::core::{HandlerResponse, JsonApiRequest};
use crate::path::{JsonPath, SegmentKind};

/// Business logic for one (method, path shape) combination.
///
/// Implemented for any `Fn(&JsonApiRequest) -> anyhow::Result<HandlerResponse>`
/// closure, so plain functions can be registered directly.
pub trait Handler: Send + Sync {
    /// Handle a decomposed request.
    ///
    /// # Errors
    ///
    /// Any error is handed to the dispatcher's exception mapper registry.
    fn handle(&self, request: &JsonApiRequest) -> anyhow::Result<HandlerResponse>;
}

impl<F> Handler for F
where
    F: Fn(&JsonApiRequest) -> anyhow::Result<HandlerResponse> + Send + Sync,
{
    fn handle(&self, request: &JsonApiRequest) -> anyhow::Result<HandlerResponse> {
        self(request)
    }
}

/// The fixed set of request shapes a dispatcher can route to, in selection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControllerKind {
    CollectionGet,
    ResourceGet,
    FieldGet,
    RelationshipGet,
    ResourcePost,
    FieldPost,
    RelationshipPost,
    ResourcePatch,
    RelationshipPatch,
    ResourceDelete,
    RelationshipDelete,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 11] = [
        ControllerKind::CollectionGet,
        ControllerKind::ResourceGet,
        ControllerKind::FieldGet,
        ControllerKind::RelationshipGet,
        ControllerKind::ResourcePost,
        ControllerKind::FieldPost,
        ControllerKind::RelationshipPost,
        ControllerKind::ResourcePatch,
        ControllerKind::RelationshipPatch,
        ControllerKind::ResourceDelete,
        ControllerKind::RelationshipDelete,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ControllerKind::CollectionGet => "collection-get",
            ControllerKind::ResourceGet => "resource-get",
            ControllerKind::FieldGet => "field-get",
            ControllerKind::RelationshipGet => "relationship-get",
            ControllerKind::ResourcePost => "resource-post",
            ControllerKind::FieldPost => "field-post",
            ControllerKind::RelationshipPost => "relationship-post",
            ControllerKind::ResourcePatch => "resource-patch",
            ControllerKind::RelationshipPatch => "relationship-patch",
            ControllerKind::ResourceDelete => "resource-delete",
            ControllerKind::RelationshipDelete => "relationship-delete",
        }
    }

    /// HTTP method this shape answers to.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            ControllerKind::CollectionGet
            | ControllerKind::ResourceGet
            | ControllerKind::FieldGet
            | ControllerKind::RelationshipGet => Method::GET,
            ControllerKind::ResourcePost
            | ControllerKind::FieldPost
            | ControllerKind::RelationshipPost => Method::POST,
            ControllerKind::ResourcePatch | ControllerKind::RelationshipPatch => Method::PATCH,
            ControllerKind::ResourceDelete | ControllerKind::RelationshipDelete => Method::DELETE,
        }
    }

    /// Whether a request with this path and method has this shape.
    ///
    /// | Shape | Subject | Anchor ids |
    /// |---|---|---|
    /// | collection-get | resource | none or several |
    /// | resource-get | resource | exactly one |
    /// | field-get | field | any |
    /// | relationship-get | relationship | any |
    /// | resource-post | resource | none |
    /// | field-post, relationship-post | field / relationship | exactly one |
    /// | resource-patch, relationship-patch | resource / relationship | exactly one |
    /// | resource-delete | resource | at least one |
    /// | relationship-delete | relationship | exactly one |
    #[must_use]
    pub fn is_acceptable(self, path: &JsonPath, method: &Method) -> bool {
        if *method != self.method() {
            return false;
        }
        let subject = path.subject().kind();
        let single = !path.is_collection();
        match self {
            ControllerKind::CollectionGet => is_resource(subject) && !single,
            ControllerKind::ResourceGet | ControllerKind::ResourcePatch => {
                is_resource(subject) && single
            }
            ControllerKind::FieldGet => *subject == SegmentKind::Field,
            ControllerKind::RelationshipGet => *subject == SegmentKind::Relationship,
            ControllerKind::ResourcePost => *subject == SegmentKind::Resource { ids: None },
            ControllerKind::FieldPost => *subject == SegmentKind::Field && single,
            ControllerKind::RelationshipPost
            | ControllerKind::RelationshipPatch
            | ControllerKind::RelationshipDelete => *subject == SegmentKind::Relationship && single,
            ControllerKind::ResourceDelete => is_resource(subject) && path.ids().is_some(),
        }
    }

    /// First shape, in selection order, accepting this request.
    #[must_use]
    pub fn select(path: &JsonPath, method: &Method) -> Option<ControllerKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.is_acceptable(path, method))
    }
}

fn is_resource(kind: &SegmentKind) -> bool {
    matches!(kind, SegmentKind::Resource { .. })
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathIds;

    fn tasks(ids: Option<&str>) -> JsonPath {
        JsonPath::resource("tasks", ids.map(PathIds::parse))
    }

    #[test]
    fn test_get_shapes() {
        assert_eq!(
            ControllerKind::select(&tasks(None), &Method::GET),
            Some(ControllerKind::CollectionGet)
        );
        assert_eq!(
            ControllerKind::select(&tasks(Some("1,2")), &Method::GET),
            Some(ControllerKind::CollectionGet)
        );
        assert_eq!(
            ControllerKind::select(&tasks(Some("1")), &Method::GET),
            Some(ControllerKind::ResourceGet)
        );
        assert_eq!(
            ControllerKind::select(&tasks(Some("1")).with_field("project"), &Method::GET),
            Some(ControllerKind::FieldGet)
        );
        assert_eq!(
            ControllerKind::select(&tasks(Some("1")).with_relationship("project"), &Method::GET),
            Some(ControllerKind::RelationshipGet)
        );
    }

    #[test]
    fn test_write_shapes() {
        assert_eq!(
            ControllerKind::select(&tasks(None), &Method::POST),
            Some(ControllerKind::ResourcePost)
        );
        assert_eq!(ControllerKind::select(&tasks(Some("1")), &Method::POST), None);
        assert_eq!(
            ControllerKind::select(&tasks(Some("1")).with_relationship("project"), &Method::PATCH),
            Some(ControllerKind::RelationshipPatch)
        );
        assert_eq!(
            ControllerKind::select(&tasks(Some("1,2")), &Method::DELETE),
            Some(ControllerKind::ResourceDelete)
        );
        assert_eq!(ControllerKind::select(&tasks(None), &Method::DELETE), None);
        assert_eq!(
            ControllerKind::select(&tasks(Some("1")).with_relationship("project"), &Method::DELETE),
            Some(ControllerKind::RelationshipDelete)
        );
    }

    #[test]
    fn test_unsupported_method_matches_nothing() {
        assert_eq!(ControllerKind::select(&tasks(Some("1")), &Method::PUT), None);
        assert_eq!(ControllerKind::select(&tasks(None), &Method::PATCH), None);
    }

    #[test]
    fn test_each_shape_answers_one_method() {
        for kind in ControllerKind::ALL {
            let others = [Method::GET, Method::POST, Method::PATCH, Method::DELETE]
                .into_iter()
                .filter(|m| *m != kind.method());
            for method in others {
                assert!(!kind.is_acceptable(&tasks(Some("1")), &method), "{kind} {method}");
            }
        }
    }
}
