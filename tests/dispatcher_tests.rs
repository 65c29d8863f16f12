//! Tests for controller selection and request dispatch
//!
//! # Test Coverage
//!
//! Validates the dispatcher's core responsibilities:
//! - Handler registration and shape-based selection
//! - Success responses passed through unchanged
//! - 406 when no registered shape accepts the request
//! - 422 envelopes for handler errors and panics
//! - Typed exception mappers, including errors wrapped in context
//! - Concurrent dispatch from several threads

mod common;

use std::sync::Arc;
use std::thread;

use anyhow::Context;
use http::Method;
use jsonapi_router::dispatcher::{
    ControllerKind, Dispatcher, ExceptionMapperRegistry, HandlerResponse, JsonApiRequest,
    JSONAPI_MEDIA_TYPE, UNHANDLED_DETAIL,
};
use jsonapi_router::error::JsonApiError;
use serde_json::json;
use thiserror::Error;

use common::{fixture_registry, shared_registry};

#[derive(Debug, Error)]
#[error("task {0} is locked")]
struct TaskLocked(String);

fn ok_handler(req: &JsonApiRequest) -> anyhow::Result<HandlerResponse> {
    Ok(HandlerResponse::ok(json!({ "data": { "type": req.path.resource_type() } })))
}

fn full_dispatcher() -> Dispatcher {
    ControllerKind::ALL
        .into_iter()
        .fold(Dispatcher::builder(shared_registry()), |builder, kind| {
            builder.controller(kind, move |_req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> {
                Ok(HandlerResponse::ok(json!({ "meta": { "controller": kind.as_str() } })))
            })
        })
        .build()
}

#[test]
fn test_dispatch_selects_controller_by_shape() {
    let dispatcher = full_dispatcher();
    let cases = [
        (Method::GET, "/tasks", "collection-get"),
        (Method::GET, "/tasks/1,2", "collection-get"),
        (Method::GET, "/tasks/1", "resource-get"),
        (Method::GET, "/tasks/1/project", "field-get"),
        (Method::GET, "/tasks/1/relationships/project", "relationship-get"),
        (Method::POST, "/tasks", "resource-post"),
        (Method::POST, "/tasks/1/relationships/assignee", "relationship-post"),
        (Method::PATCH, "/tasks/1", "resource-patch"),
        (Method::PATCH, "/tasks/1/relationships/assignee", "relationship-patch"),
        (Method::DELETE, "/tasks/1", "resource-delete"),
        (Method::DELETE, "/tasks/1,2", "resource-delete"),
        (Method::DELETE, "/tasks/1/relationships/assignee", "relationship-delete"),
    ];
    for (method, path, expected) in cases {
        let resp = dispatcher.dispatch_raw(method.clone(), path, "", None);
        assert_eq!(resp.status, 200, "{method} {path}");
        assert_eq!(resp.body["meta"]["controller"], expected, "{method} {path}");
    }
}

#[test]
fn test_unacceptable_combination_is_406() {
    let dispatcher = full_dispatcher();
    for (method, path) in [
        (Method::DELETE, "/tasks"),
        (Method::PATCH, "/tasks"),
        (Method::PUT, "/tasks/1"),
        (Method::PATCH, "/tasks/1/project"),
    ] {
        let resp = dispatcher.dispatch_raw(method.clone(), path, "", None);
        assert_eq!(resp.status, 406, "{method} {path}");
        assert_eq!(resp.body["errors"][0]["status"], "406");
        assert!(resp.error_detail().unwrap().contains("no handler accepts"));
    }
}

#[test]
fn test_missing_controller_is_406() {
    let dispatcher = Dispatcher::builder(shared_registry())
        .controller(ControllerKind::ResourceGet, ok_handler)
        .build();
    assert_eq!(dispatcher.dispatch_raw(Method::GET, "/tasks/1", "", None).status, 200);
    assert_eq!(dispatcher.dispatch_raw(Method::GET, "/tasks", "", None).status, 406);
}

#[test]
fn test_success_response_passes_through() {
    let dispatcher = Dispatcher::builder(shared_registry())
        .controller(ControllerKind::CollectionGet, ok_handler)
        .build();
    let resp = dispatcher.dispatch_raw(Method::GET, "/projects", "", None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({ "data": { "type": "projects" } }));
    assert_eq!(resp.get_header("Content-Type"), Some(JSONAPI_MEDIA_TYPE));
}

#[test]
fn test_handler_error_is_422_with_detail() {
    let dispatcher = Dispatcher::builder(shared_registry())
        .controller(
            ControllerKind::ResourceGet,
            |_req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> {
                Err(anyhow::anyhow!("storage unavailable"))
            },
        )
        .build();
    let resp = dispatcher.dispatch_raw(Method::GET, "/tasks/1", "", None);
    assert_eq!(resp.status, 422);
    assert_eq!(resp.body["errors"][0]["status"], "422");
    assert_eq!(resp.error_detail(), Some("storage unavailable"));
}

#[test]
fn test_handler_panic_is_422_with_detail() {
    let dispatcher = Dispatcher::builder(shared_registry())
        .controller(
            ControllerKind::ResourceGet,
            |_req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> { panic!("handler exploded") },
        )
        .build();
    let resp = dispatcher.dispatch_raw(Method::GET, "/tasks/1", "", None);
    assert_eq!(resp.status, 422);
    let detail = resp.error_detail().unwrap();
    assert!(!detail.is_empty());
    assert!(detail.contains("handler exploded"));
}

#[test]
fn test_empty_failure_message_still_has_detail() {
    let dispatcher = Dispatcher::builder(shared_registry())
        .controller(
            ControllerKind::ResourceGet,
            |_req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> { Err(anyhow::anyhow!("")) },
        )
        .controller(
            ControllerKind::CollectionGet,
            |_req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> { panic!("") },
        )
        .build();

    let resp = dispatcher.dispatch_raw(Method::GET, "/tasks/1", "", None);
    assert_eq!(resp.status, 422);
    assert_eq!(resp.error_detail(), Some(UNHANDLED_DETAIL));

    let resp = dispatcher.dispatch_raw(Method::GET, "/tasks", "", None);
    assert_eq!(resp.status, 422);
    assert_eq!(resp.error_detail(), Some("handler panicked"));
}

#[test]
fn test_custom_mapper_through_context() {
    let mappers = ExceptionMapperRegistry::default()
        .with_mapper(|err: &TaskLocked| HandlerResponse::error(409, &err.to_string()));
    let dispatcher = Dispatcher::builder(shared_registry())
        .controller(
            ControllerKind::ResourcePatch,
            |req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> {
                let id = req.path.ids().and_then(|ids| ids.first()).unwrap_or_default().to_string();
                Err(TaskLocked(id)).context("updating task")
            },
        )
        .exception_mappers(mappers)
        .build();
    let resp = dispatcher.dispatch_raw(Method::PATCH, "/tasks/5", "", Some(json!({})));
    assert_eq!(resp.status, 409);
    assert_eq!(resp.error_detail(), Some("task 5 is locked"));
}

#[test]
fn test_handler_may_return_domain_errors() {
    let dispatcher = Dispatcher::builder(shared_registry())
        .controller(
            ControllerKind::FieldGet,
            |req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> {
                Err(JsonApiError::UnknownField {
                    resource: req.path.resource_type().to_string(),
                    field: req.path.element_name().to_string(),
                }
                .into())
            },
        )
        .build();
    let resp = dispatcher.dispatch_raw(Method::GET, "/tasks/1/project", "", None);
    assert_eq!(resp.status, 404);
}

#[test]
fn test_resolution_errors_become_envelopes() {
    let dispatcher = full_dispatcher();
    let resp = dispatcher.dispatch_raw(Method::GET, "/comments/1", "", None);
    assert_eq!(resp.status, 404);
    assert_eq!(resp.error_detail(), Some("resource 'comments' not found"));

    let resp = dispatcher.dispatch_raw(Method::GET, "/tasks", "sort[tasks][name]=sideways", None);
    assert_eq!(resp.status, 400);

    let strict = Dispatcher::builder(shared_registry())
        .exception_mappers(ExceptionMapperRegistry::empty())
        .build();
    let resp = strict.dispatch_raw(Method::GET, "/", "", None);
    assert_eq!(resp.status, 422);
    assert!(resp.error_detail().unwrap().starts_with("malformed path"));
}

#[test]
fn test_request_from_url() {
    let registry = fixture_registry();
    let req = JsonApiRequest::from_url(
        Method::GET,
        "http://domain.local/tasks/1?include[tasks]=project&page[size]=2",
        None,
        &registry,
    )
    .unwrap();
    assert_eq!(req.path.to_string(), "/tasks/1/");
    assert_eq!(req.params.page().size(), Some(2));
    assert_eq!(req.params.included_relations().get("tasks").len(), 1);

    assert!(matches!(
        JsonApiRequest::from_url(Method::GET, "/tasks/1", None, &registry),
        Err(JsonApiError::MalformedPath { .. })
    ));
}

#[test]
fn test_request_id_from_header() {
    let registry = fixture_registry();
    let req = JsonApiRequest::from_parts(Method::GET, "/tasks", "", None, &registry)
        .unwrap()
        .with_request_id(Some("01ARZ3NDEKTSV4RRFFQ69G5FAV"));
    assert_eq!(req.request_id.to_string(), "01ARZ3NDEKTSV4RRFFQ69G5FAV");

    let fresh = JsonApiRequest::from_parts(Method::GET, "/tasks", "", None, &registry)
        .unwrap()
        .with_request_id(Some("not-a-ulid"));
    assert_ne!(fresh.request_id.to_string(), "not-a-ulid");
}

#[test]
fn test_concurrent_dispatch() {
    let dispatcher = Arc::new(full_dispatcher());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                let path = format!("/tasks/{i}");
                dispatcher.dispatch_raw(Method::GET, &path, "", None).status
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 200);
    }
}
