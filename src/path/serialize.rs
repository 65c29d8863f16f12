use std::fmt;

use url::Url;

use super::core::{JsonPath, SegmentKind, RELATIONSHIP_MARK, SEPARATOR};

/// Render a chain in canonical form.
///
/// Walks parent links from the subject back to the root, then emits the parts
/// root first. The result always starts and ends with `/`; ids are joined with
/// `,` and relationship segments are preceded by `relationships/`.
#[must_use]
pub fn serialize_path(path: &JsonPath) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(path.len());
    for segment in path.ancestors(path.subject_id()) {
        let part = match segment.kind() {
            SegmentKind::Relationship => {
                format!("{RELATIONSHIP_MARK}{SEPARATOR}{}", segment.name())
            }
            SegmentKind::Field => segment.name().to_string(),
            SegmentKind::Resource { ids: Some(ids) } => {
                format!("{}{SEPARATOR}{ids}", segment.name())
            }
            SegmentKind::Resource { ids: None } => segment.name().to_string(),
        };
        parts.push(part);
    }

    let mut out = String::with_capacity(parts.iter().map(|p| p.len() + 1).sum::<usize>() + 1);
    out.push(SEPARATOR);
    for part in parts.iter().rev() {
        out.push_str(part);
        out.push(SEPARATOR);
    }
    out
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_path(self))
    }
}

impl JsonPath {
    /// Absolute link for this path under `base_url`.
    ///
    /// Any path already on the base (`http://host/api`) is kept as a prefix.
    ///
    /// # Errors
    ///
    /// Returns the URL parse error if the combined string is not a valid URL.
    pub fn self_link(&self, base_url: &Url) -> Result<Url, url::ParseError> {
        let base = base_url.as_str().trim_end_matches(SEPARATOR);
        Url::parse(&format!("{base}{self}"))
    }
}
