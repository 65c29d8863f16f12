use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use http::Method;
use serde::Serialize;
use serde_json::{json, Value};
use smallvec::SmallVec;
use tracing::{debug, error, info, warn};
use url::Url;

use super::controller::{ControllerKind, Handler};
use super::mapper::ExceptionMapperRegistry;
use crate::error::{JsonApiError, NOT_ACCEPTABLE_STATUS};
use crate::ids::RequestId;
use crate::params::{parse_query_params, QueryParams, RawParams};
use crate::path::{resolve_path, JsonPath};
use crate::registry::ResourceMetadataProvider;

/// Maximum inline response headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 4;

/// Media type of every JSON:API document.
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Response header storage; header names are usually static.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// A fully decomposed request, as handed to a [`Handler`].
#[derive(Debug, Clone, Serialize)]
pub struct JsonApiRequest {
    /// Correlation id used in every log line for this request
    pub request_id: RequestId,
    #[serde(serialize_with = "serialize_method")]
    pub method: Method,
    /// Resolved path chain
    pub path: JsonPath,
    /// Typed query parameters
    pub params: QueryParams,
    /// Request body, opaque to routing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

fn serialize_method<S: serde::Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

impl JsonApiRequest {
    #[must_use]
    pub fn new(method: Method, path: JsonPath, params: QueryParams, body: Option<Value>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path,
            params,
            body,
        }
    }

    /// Resolve a raw path and decode a raw query string.
    ///
    /// # Errors
    ///
    /// Any path resolution or parameter parsing error.
    pub fn from_parts<P: ResourceMetadataProvider + ?Sized>(
        method: Method,
        raw_path: &str,
        raw_query: &str,
        body: Option<Value>,
        provider: &P,
    ) -> Result<Self, JsonApiError> {
        let path = resolve_path(provider, raw_path)?;
        let params = parse_query_params(&RawParams::from_query(raw_query))?;
        Ok(Self::new(method, path, params, body))
    }

    /// Build a request from an absolute URL such as
    /// `http://domain.local/tasks/1?include[tasks]=project`.
    ///
    /// # Errors
    ///
    /// [`JsonApiError::MalformedPath`] if `url` is not an absolute URL, otherwise
    /// any path resolution or parameter parsing error.
    pub fn from_url<P: ResourceMetadataProvider + ?Sized>(
        method: Method,
        url: &str,
        body: Option<Value>,
        provider: &P,
    ) -> Result<Self, JsonApiError> {
        let parsed = Url::parse(url).map_err(|_| JsonApiError::malformed(url, "not an absolute URL"))?;
        Self::from_parts(method, parsed.path(), parsed.query().unwrap_or(""), body, provider)
    }

    /// Use a caller-supplied correlation id (e.g. from a request header); an
    /// absent or invalid one is replaced by a fresh id.
    #[must_use]
    pub fn with_request_id(mut self, header_value: Option<&str>) -> Self {
        self.request_id = RequestId::from_header_or_new(header_value);
        self
    }
}

/// Status, headers and JSON body produced for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response with the JSON:API content type.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), JSONAPI_MEDIA_TYPE.to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// `200 OK` with a document body.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    /// `204 No Content`.
    #[must_use]
    pub fn no_content() -> Self {
        Self::new(204, HeaderVec::new(), Value::Null)
    }

    /// JSON:API error document: `{"errors":[{"status":"422","detail":"..."}]}`.
    #[must_use]
    pub fn error(status: u16, detail: &str) -> Self {
        Self::json(
            status,
            json!({ "errors": [{ "status": status.to_string(), "detail": detail }] }),
        )
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Error detail of the first error object, for error documents.
    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        self.body
            .get("errors")
            .and_then(|errors| errors.get(0))
            .and_then(|error| error.get("detail"))
            .and_then(Value::as_str)
    }
}

/// Routes decomposed requests to the handler registered for their shape.
///
/// Built once at startup and shared read-only across request threads.
#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn ResourceMetadataProvider>,
    controllers: Vec<(ControllerKind, Arc<dyn Handler>)>,
    mappers: Arc<ExceptionMapperRegistry>,
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    provider: Arc<dyn ResourceMetadataProvider>,
    controllers: Vec<(ControllerKind, Arc<dyn Handler>)>,
    mappers: ExceptionMapperRegistry,
}

impl DispatcherBuilder {
    /// Register `handler` for one request shape. A second registration for the
    /// same shape replaces the first.
    #[must_use]
    pub fn controller<H: Handler + 'static>(mut self, kind: ControllerKind, handler: H) -> Self {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        if let Some(slot) = self.controllers.iter_mut().find(|(k, _)| *k == kind) {
            warn!(controller = %kind, "Replaced existing controller");
            slot.1 = handler;
        } else {
            self.controllers.push((kind, handler));
            self.controllers.sort_by_key(|(k, _)| *k);
            info!(
                controller = %kind,
                total_controllers = self.controllers.len(),
                "Controller registered"
            );
        }
        self
    }

    /// Replace the exception mapper registry (defaults to
    /// [`ExceptionMapperRegistry::default`]).
    #[must_use]
    pub fn exception_mappers(mut self, mappers: ExceptionMapperRegistry) -> Self {
        self.mappers = mappers;
        self
    }

    #[must_use]
    pub fn build(self) -> Dispatcher {
        debug!(
            controllers = self.controllers.len(),
            exception_mappers = self.mappers.len(),
            "Dispatcher built"
        );
        Dispatcher {
            provider: self.provider,
            controllers: self.controllers,
            mappers: Arc::new(self.mappers),
        }
    }
}

impl Dispatcher {
    #[must_use]
    pub fn builder(provider: Arc<dyn ResourceMetadataProvider>) -> DispatcherBuilder {
        DispatcherBuilder {
            provider,
            controllers: Vec::new(),
            mappers: ExceptionMapperRegistry::default(),
        }
    }

    /// Shapes with a registered handler, in selection order.
    pub fn controllers(&self) -> impl Iterator<Item = ControllerKind> + '_ {
        self.controllers.iter().map(|(kind, _)| *kind)
    }

    #[must_use]
    pub fn mappers(&self) -> &ExceptionMapperRegistry {
        &self.mappers
    }

    #[must_use]
    pub fn provider(&self) -> &dyn ResourceMetadataProvider {
        self.provider.as_ref()
    }

    /// First registered controller whose shape accepts this path and method.
    #[must_use]
    pub fn select(&self, path: &JsonPath, method: &Method) -> Option<ControllerKind> {
        self.controllers
            .iter()
            .map(|(kind, _)| *kind)
            .find(|kind| kind.is_acceptable(path, method))
    }

    /// Route a decomposed request and normalise the outcome into a response.
    ///
    /// - No registered shape accepts the request: 406.
    /// - The handler fails: the first matching exception mapper's response, or
    ///   the generic error document with status 422.
    /// - The handler panics: 422 with the panic message.
    ///
    /// Never fails and never panics.
    #[must_use]
    pub fn dispatch(&self, request: &JsonApiRequest) -> HandlerResponse {
        let request_id = request.request_id;
        let path = request.path.to_string();

        let Some((kind, handler)) = self
            .controllers
            .iter()
            .find(|(kind, _)| kind.is_acceptable(&request.path, &request.method))
        else {
            warn!(
                request_id = %request_id,
                method = %request.method,
                path = %path,
                registered = self.controllers.len(),
                "No acceptable handler"
            );
            let err = JsonApiError::NoMatchingHandler {
                method: request.method.to_string(),
                path,
            };
            return HandlerResponse::error(NOT_ACCEPTABLE_STATUS, &err.to_string());
        };

        debug!(
            request_id = %request_id,
            controller = %kind,
            method = %request.method,
            path = %path,
            "Handler selected"
        );

        let start = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| handler.handle(request)));
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(response)) => {
                info!(
                    request_id = %request_id,
                    controller = %kind,
                    status = response.status,
                    execution_time_ms = elapsed_ms,
                    "Handler execution complete"
                );
                response
            }
            Ok(Err(err)) => {
                let response = self.mappers.to_response(&err);
                error!(
                    request_id = %request_id,
                    controller = %kind,
                    error = %format!("{err:#}"),
                    status = response.status,
                    "Handler failed"
                );
                response
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    request_id = %request_id,
                    controller = %kind,
                    panic_message = %message,
                    "Handler panicked"
                );
                let err = anyhow::Error::new(JsonApiError::UnhandledFailure { message });
                self.mappers.to_response(&err)
            }
        }
    }

    /// Resolve, parse and dispatch in one pass.
    ///
    /// Resolution and parsing errors are turned into error documents through
    /// the exception mapper registry, like handler errors.
    #[must_use]
    pub fn dispatch_raw(
        &self,
        method: Method,
        raw_path: &str,
        raw_query: &str,
        body: Option<Value>,
    ) -> HandlerResponse {
        match JsonApiRequest::from_parts(method, raw_path, raw_query, body, self.provider.as_ref()) {
            Ok(request) => self.dispatch(&request),
            Err(err) => {
                let response = self.mappers.to_response(&anyhow::Error::new(err));
                info!(
                    path = %raw_path,
                    status = response.status,
                    detail = response.error_detail().unwrap_or_default(),
                    "Request rejected before dispatch"
                );
                response
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| "handler panicked".to_string())
}
