use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};

use crate::dispatcher::{ControllerKind, Dispatcher, HandlerResponse, JsonApiRequest};
use crate::registry::ResourceMetadataProvider;

/// Describe a decomposed request instead of acting on it.
///
/// Answers `201 Created` for POST and `200 OK` otherwise.
#[must_use]
pub fn echo_response(kind: ControllerKind, req: &JsonApiRequest) -> HandlerResponse {
    let status = if req.method == Method::POST { 201 } else { 200 };
    let ids: Vec<&str> = req.path.ids().map(|ids| ids.iter().collect()).unwrap_or_default();
    let params: Vec<String> = req.params.all().iter().map(ToString::to_string).collect();

    HandlerResponse::json(
        status,
        json!({
            "meta": {
                "controller": kind,
                "request_id": req.request_id,
                "method": req.method.as_str(),
                "path": req.path.to_string(),
                "resource_type": req.path.resource_type(),
                "element": req.path.element_name(),
                "ids": ids,
                "collection": req.path.is_collection(),
                "params": params,
            },
            "data": req.body.clone().unwrap_or(Value::Null),
        }),
    )
}

/// Dispatcher with an echo handler registered for every request shape.
#[must_use]
pub fn echo_dispatcher(provider: Arc<dyn ResourceMetadataProvider>) -> Dispatcher {
    ControllerKind::ALL
        .into_iter()
        .fold(Dispatcher::builder(provider), |builder, kind| {
            builder.controller(kind, move |req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> {
                Ok(echo_response(kind, req))
            })
        })
        .build()
}
