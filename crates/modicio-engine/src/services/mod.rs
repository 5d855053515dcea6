//! Engine services
//!
//! Each service borrows a `FragmentStore` and takes the caller's
//! `RequestContext` on every call. Every call logs start and end with the
//! request id; errors leave tagged with it.

pub mod behaviour;
pub mod evolution;
pub mod instance;
pub mod metadata;
pub mod model;

pub use behaviour::{BehaviourService, ScriptRun};
pub use evolution::EvolutionService;
pub use instance::InstanceService;
pub use metadata::{MetaData, MetadataService, VariantLookup};
pub use model::ModelService;

use std::time::Instant;

use modicio_core::{log_op_end, log_op_error, log_op_start};
use modicio_core_types::RequestContext;

use crate::errors::{in_context, Result};

/// Run `f` as service operation `op`
pub(crate) fn instrumented<T, F>(op: &'static str, ctx: &RequestContext, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    log_op_start!(op, request_id = %ctx.request_id);
    let start = Instant::now();

    let result = f().map_err(|e| in_context(e, ctx));

    match &result {
        Ok(_) => log_op_end!(
            op,
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        ),
        Err(e) => log_op_error!(
            op,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        ),
    }
    result
}
