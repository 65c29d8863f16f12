use super::*;
use crate::error::JsonApiError;
use crate::registry::{ResourceInfo, ResourceRegistry};

fn registry() -> ResourceRegistry {
    ResourceRegistry::builder()
        .register(
            ResourceInfo::new("tasks")
                .relationship("project")
                .relationship("assignee")
                .attribute("name"),
        )
        .and_then(|b| b.register(ResourceInfo::new("projects").relationship("tasks")))
        .expect("fixture registry")
        .build()
}

fn resolve(raw: &str) -> Result<JsonPath, JsonApiError> {
    resolve_path(&registry(), raw)
}

#[test]
fn test_single_resource_with_id() {
    let path = resolve("/tasks/1").expect("resolve");
    assert_eq!(path.len(), 1);
    assert_eq!(path.root().name(), "tasks");
    assert_eq!(path.ids().map(PathIds::ids), Some(&["1".to_string()][..]));
    assert!(!path.is_collection());
}

#[test]
fn test_collection_without_ids() {
    let path = resolve("tasks").expect("resolve");
    assert!(path.root().ids().is_none());
    assert!(path.is_collection());
}

#[test]
fn test_multiple_ids_keep_order() {
    let path = resolve("/tasks/3,1,2/").expect("resolve");
    assert_eq!(path.root().ids().map(PathIds::ids), Some(&["3".to_string(), "1".into(), "2".into()][..]));
    assert!(path.is_collection());
}

#[test]
fn test_relationship_segment() {
    let path = resolve("/tasks/1/relationships/project").expect("resolve");
    assert_eq!(path.len(), 2);
    assert_eq!(path.root().ids().and_then(PathIds::first), Some("1"));
    assert!(path.subject().is_relationship());
    assert_eq!(path.element_name(), "project");
    assert_eq!(path.resource_type(), "tasks");
}

#[test]
fn test_field_segment() {
    let path = resolve("/tasks/1/project").expect("resolve");
    assert!(path.subject().is_field());
    assert!(path.subject().ids().is_none());
}

#[test]
fn test_ids_after_relationship_rejected() {
    assert!(matches!(
        resolve("/tasks/1/relationships/project/2"),
        Err(JsonApiError::InvalidStructure { segment, ids }) if segment == "project" && ids == "2"
    ));
    assert!(matches!(
        resolve("/tasks/1/project/2"),
        Err(JsonApiError::InvalidStructure { .. })
    ));
}

#[test]
fn test_empty_paths_rejected() {
    assert!(matches!(resolve(""), Err(JsonApiError::MalformedPath { .. })));
    assert!(matches!(resolve("/"), Err(JsonApiError::MalformedPath { .. })));
    assert!(matches!(resolve("//"), Err(JsonApiError::MalformedPath { .. })));
    assert!(matches!(resolve("/tasks//1"), Err(JsonApiError::MalformedPath { .. })));
    assert!(matches!(resolve("/tasks/,/"), Err(JsonApiError::MalformedPath { .. })));
}

#[test]
fn test_unknown_resource() {
    assert!(matches!(
        resolve("/comments/1"),
        Err(JsonApiError::UnknownResource { name }) if name == "comments"
    ));
    assert!(matches!(
        resolve("/relationships/tasks"),
        Err(JsonApiError::UnknownResource { .. })
    ));
}

#[test]
fn test_unknown_field() {
    assert!(matches!(
        resolve("/tasks/1/owner"),
        Err(JsonApiError::UnknownField { resource, field }) if resource == "tasks" && field == "owner"
    ));
    // attributes are not path segments, with or without the marker
    assert!(matches!(
        resolve("/tasks/1/name"),
        Err(JsonApiError::UnknownField { resource, field }) if resource == "tasks" && field == "name"
    ));
    assert!(matches!(
        resolve("/tasks/1/relationships/name"),
        Err(JsonApiError::UnknownField { .. })
    ));
}

#[test]
fn test_dangling_relationship_marker() {
    assert!(matches!(
        resolve("/tasks/1/relationships"),
        Err(JsonApiError::MalformedPath { .. })
    ));
    assert!(matches!(
        resolve("/tasks/1/relationships/relationships"),
        Err(JsonApiError::MalformedPath { .. })
    ));
}

#[test]
fn test_relationship_directly_after_type() {
    let path = resolve("/tasks/relationships/project").expect("resolve");
    assert!(path.root().ids().is_none());
    assert!(path.subject().is_relationship());
}

#[test]
fn test_serialize_canonical_form() {
    let cases = [
        ("/tasks/1", "/tasks/1/"),
        ("tasks", "/tasks/"),
        ("/tasks/1,2/", "/tasks/1,2/"),
        ("/tasks/1/relationships/project", "/tasks/1/relationships/project/"),
        ("/tasks/1/project/", "/tasks/1/project/"),
    ];
    for (input, expected) in cases {
        let path = resolve(input).expect("resolve");
        assert_eq!(serialize_path(&path), expected, "input {input}");
        assert_eq!(path.to_string(), expected);
    }
}

#[test]
fn test_round_trip_is_structurally_equal() {
    for input in [
        "/tasks/1",
        "/tasks",
        "/projects/7,8",
        "/tasks/1/relationships/assignee",
        "/tasks/1/project",
        "/tasks/relationships/project/",
    ] {
        let first = resolve(input).expect("resolve");
        let again = resolve(&serialize_path(&first)).expect("resolve canonical");
        assert_eq!(first, again, "input {input}");
    }
}

#[test]
fn test_self_link_keeps_base_prefix() {
    let path = resolve("/tasks/1/relationships/project").expect("resolve");
    let base = url::Url::parse("http://domain.local/api/").expect("base url");
    let link = path.self_link(&base).expect("link");
    assert_eq!(
        link.as_str(),
        "http://domain.local/api/tasks/1/relationships/project/"
    );
}
