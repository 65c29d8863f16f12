use std::any::{type_name, TypeId};
use std::fmt;

use tracing::{debug, warn};

use super::core::HandlerResponse;
use crate::error::{JsonApiError, FALLBACK_STATUS};

/// Detail used when a failure renders to an empty message.
pub const UNHANDLED_DETAIL: &str = "unhandled failure";

type MapperFn = Box<dyn Fn(&anyhow::Error) -> Option<HandlerResponse> + Send + Sync>;

struct MapperEntry {
    type_id: TypeId,
    type_name: &'static str,
    map: MapperFn,
}

/// Typed error → response mappers consulted when a handler fails.
///
/// Each mapper is keyed by the concrete error type it handles. A handler error
/// matches a mapper when the error, or any cause in its chain, downcasts to
/// that type; registered mappers are tried in registration order.
pub struct ExceptionMapperRegistry {
    mappers: Vec<MapperEntry>,
}

impl Default for ExceptionMapperRegistry {
    /// Registry holding only the [`JsonApiError`] mapper.
    fn default() -> Self {
        Self::empty().with_mapper(|err: &JsonApiError| {
            HandlerResponse::error(err.http_status(), &detail_or_default(err.to_string()))
        })
    }
}

impl ExceptionMapperRegistry {
    /// Registry with no mappers; every failure gets the fallback envelope.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            mappers: Vec::new(),
        }
    }

    /// Register a mapper for errors of type `E`, replacing any mapper already
    /// registered for that type.
    #[must_use]
    pub fn with_mapper<E, F>(mut self, mapper: F) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&E) -> HandlerResponse + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();
        let entry = MapperEntry {
            type_id,
            type_name: type_name::<E>(),
            map: Box::new(move |error: &anyhow::Error| find_cause::<E>(error).map(&mapper)),
        };

        if let Some(existing) = self.mappers.iter_mut().find(|m| m.type_id == type_id) {
            warn!(error_type = %entry.type_name, "Replaced existing exception mapper");
            *existing = entry;
        } else {
            debug!(error_type = %entry.type_name, "Exception mapper registered");
            self.mappers.push(entry);
        }
        self
    }

    /// Response from the first matching mapper, if any.
    #[must_use]
    pub fn find(&self, error: &anyhow::Error) -> Option<HandlerResponse> {
        self.mappers.iter().find_map(|entry| (entry.map)(error))
    }

    /// Response for `error`: a matching mapper's, else the generic envelope with
    /// [`FALLBACK_STATUS`] and the error's message ([`UNHANDLED_DETAIL`] when
    /// that message is empty).
    #[must_use]
    pub fn to_response(&self, error: &anyhow::Error) -> HandlerResponse {
        self.find(error).unwrap_or_else(|| {
            HandlerResponse::error(FALLBACK_STATUS, &detail_or_default(format!("{error:#}")))
        })
    }

    /// Names of the error types with a registered mapper.
    pub fn error_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.mappers.iter().map(|m| m.type_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl fmt::Debug for ExceptionMapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.error_types()).finish()
    }
}

fn detail_or_default(rendered: String) -> String {
    if rendered.trim().is_empty() {
        UNHANDLED_DETAIL.to_string()
    } else {
        rendered
    }
}

fn find_cause<E>(error: &anyhow::Error) -> Option<&E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    error
        .downcast_ref::<E>()
        .or_else(|| error.chain().find_map(|cause| cause.downcast_ref::<E>()))
}
