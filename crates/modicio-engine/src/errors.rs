//! Error helpers for engine services

use modicio_core::errors::{ExError, ModicioError};
use modicio_core_types::RequestContext;

pub use modicio_store::errors::Result;

/// Tag an error with the correlation ids of the request that raised it
pub fn in_context(err: ExError, ctx: &RequestContext) -> ExError {
    let err = match err.request_id() {
        Some(_) => err,
        None => err.with_request_id(ctx.request_id.clone()),
    };
    match (&ctx.trace_id, err.trace_id()) {
        (Some(trace_id), None) => err.with_trace_id(trace_id.clone()),
        _ => err,
    }
}

pub(crate) fn fragment_not_found(query: impl std::fmt::Display) -> ExError {
    ModicioError::FragmentNotFound {
        query: query.to_string(),
    }
    .into()
}
