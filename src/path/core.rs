use std::fmt;
use std::ops::Index;

use serde::{Serialize, Serializer};
use smallvec::SmallVec;

/// Separator between path tokens.
pub const SEPARATOR: char = '/';

/// Token that marks the following segment as a relationship.
pub const RELATIONSHIP_MARK: &str = "relationships";

/// Separator inside an id list token (`/tasks/1,2,3`).
pub const ID_SEPARATOR: char = ',';

/// Maximum number of ids stored inline before spilling to the heap.
/// Nearly every request addresses zero or one id.
const MAX_INLINE_IDS: usize = 2;

/// Ordered raw ids taken from one path token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathIds(SmallVec<[String; MAX_INLINE_IDS]>);

impl PathIds {
    /// Split an id token on [`ID_SEPARATOR`], dropping empty entries.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        Self(
            token
                .split(ID_SEPARATOR)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Build from already separated ids.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for PathIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, id) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, "{ID_SEPARATOR}")?;
            }
            f.write_str(id)?;
        }
        Ok(())
    }
}

impl Serialize for PathIds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// What a segment addresses. Only resource segments may carry ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentKind {
    Resource {
        #[serde(skip_serializing_if = "Option::is_none")]
        ids: Option<PathIds>,
    },
    Relationship,
    Field,
}

/// Index of a segment inside its [`JsonPath`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(usize);

impl SegmentId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node of a resolved path.
///
/// `parent` and `child` are navigation links into the owning arena, not
/// ownership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PathSegment {
    name: String,
    #[serde(flatten)]
    kind: SegmentKind,
    #[serde(skip)]
    parent: Option<SegmentId>,
    #[serde(skip)]
    child: Option<SegmentId>,
}

impl PathSegment {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    #[must_use]
    pub fn parent(&self) -> Option<SegmentId> {
        self.parent
    }

    #[must_use]
    pub fn child(&self) -> Option<SegmentId> {
        self.child
    }

    /// Ids of a resource segment; always `None` for relationships and fields.
    #[must_use]
    pub fn ids(&self) -> Option<&PathIds> {
        match &self.kind {
            SegmentKind::Resource { ids } => ids.as_ref(),
            SegmentKind::Relationship | SegmentKind::Field => None,
        }
    }

    #[must_use]
    pub fn is_resource(&self) -> bool {
        matches!(self.kind, SegmentKind::Resource { .. })
    }

    #[must_use]
    pub fn is_relationship(&self) -> bool {
        matches!(self.kind, SegmentKind::Relationship)
    }

    #[must_use]
    pub fn is_field(&self) -> bool {
        matches!(self.kind, SegmentKind::Field)
    }
}

/// A resolved request path: a non-empty chain of segments whose first element
/// is always a resource segment.
///
/// The last segment is the request's *subject*; the nearest resource segment
/// before it is its *anchor*, used for type and id resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Start a chain with its root resource segment.
    #[must_use]
    pub fn resource(name: impl Into<String>, ids: Option<PathIds>) -> Self {
        Self {
            segments: vec![PathSegment {
                name: name.into(),
                kind: SegmentKind::Resource { ids },
                parent: None,
                child: None,
            }],
        }
    }

    /// Append a relationship segment after the current subject.
    #[must_use]
    pub fn with_relationship(mut self, name: impl Into<String>) -> Self {
        self.push(name.into(), SegmentKind::Relationship);
        self
    }

    /// Append a field segment after the current subject.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.push(name.into(), SegmentKind::Field);
        self
    }

    pub(crate) fn push(&mut self, name: String, kind: SegmentKind) -> SegmentId {
        let id = SegmentId(self.segments.len());
        let parent = self.subject_id();
        self.segments[parent.0].child = Some(id);
        self.segments.push(PathSegment {
            name,
            kind,
            parent: Some(parent),
            child: None,
        });
        id
    }

    /// Root resource segment.
    #[must_use]
    pub fn root(&self) -> &PathSegment {
        &self.segments[0]
    }

    /// Terminal segment, the thing the request is about.
    #[must_use]
    pub fn subject(&self) -> &PathSegment {
        &self.segments[self.segments.len() - 1]
    }

    #[must_use]
    pub fn subject_id(&self) -> SegmentId {
        SegmentId(self.segments.len() - 1)
    }

    #[must_use]
    pub fn get(&self, id: SegmentId) -> Option<&PathSegment> {
        self.segments.get(id.0)
    }

    /// Segments from root to subject.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Walk parent links from `start` back to the root, `start` included.
    pub fn ancestors(&self, start: SegmentId) -> Ancestors<'_> {
        Ancestors {
            path: self,
            next: self.get(start).map(|_| start),
        }
    }

    /// Nearest resource segment at or before `id`.
    #[must_use]
    pub fn anchor_of(&self, id: SegmentId) -> &PathSegment {
        self.ancestors(id)
            .find(|segment| segment.is_resource())
            .unwrap_or_else(|| self.root())
    }

    /// Anchor of the subject.
    #[must_use]
    pub fn anchor(&self) -> &PathSegment {
        self.anchor_of(self.subject_id())
    }

    /// Number of segments in the chain (at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: a path holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resource type the path is anchored on.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.anchor().name()
    }

    /// Name of the subject segment.
    #[must_use]
    pub fn element_name(&self) -> &str {
        self.subject().name()
    }

    /// Ids of the anchoring resource.
    #[must_use]
    pub fn ids(&self) -> Option<&PathIds> {
        self.anchor().ids()
    }

    /// True when the anchor carries no ids or more than one.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.ids().map_or(true, |ids| ids.len() != 1)
    }
}

impl Index<SegmentId> for JsonPath {
    type Output = PathSegment;

    #[inline]
    fn index(&self, id: SegmentId) -> &PathSegment {
        &self.segments[id.0]
    }
}

/// Iterator returned by [`JsonPath::ancestors`].
pub struct Ancestors<'a> {
    path: &'a JsonPath,
    next: Option<SegmentId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a PathSegment;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.path.get(self.next?)?;
        self.next = segment.parent;
        Some(segment)
    }
}
