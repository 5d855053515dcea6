//! Evolution engine
//!
//! `evolve` compiles a request, parses every statement up front and runs
//! them against a copy of the fragment's model. Either every statement
//! applies or the call fails and the input stays as it was.

pub mod interpreter;
pub mod request;
pub mod statement;

pub use interpreter::{ElementRef, EvolutionState, Interpreter};
pub use request::{compile_request, CompiledRequest, StatementPair};
pub use statement::{parse_evolution_date, resolve_type, Slot, Statement};

use crate::errors::Result;
use crate::model::Fragment;
use crate::{log_op_end, log_op_error, log_op_start};

/// Apply `request` to a copy of `fragment`
///
/// With `backward` set, the backward halves of the request run in reverse
/// order. Every executed statement is appended to the trace. The result
/// carries a fresh `global_id`; all other coordinates are kept.
///
/// # Errors
/// * `UnknownStatement` / `MalformedArgument` - a statement does not parse
/// * `SelectionNotOpen` - a statement needs a selection that is not open
/// * the named not-found errors ("Class does not exist!", ...)
/// * `NodeAlreadyExists` - `CREATE CLASS` of an existing class
pub fn evolve(fragment: &Fragment, request: &str, backward: bool) -> Result<Fragment> {
    log_op_start!("evolve", global_id = %fragment.global_id, backward = backward);
    let start = std::time::Instant::now();

    let result = evolve_impl(fragment, request, backward);

    match &result {
        Ok(evolved) => log_op_end!(
            "evolve",
            duration_ms = start.elapsed().as_millis() as u64,
            global_id = %evolved.global_id,
            statement_count = evolved.trace.len() - fragment.trace.len()
        ),
        Err(e) => log_op_error!(
            "evolve",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            global_id = %fragment.global_id
        ),
    }
    result
}

fn evolve_impl(fragment: &Fragment, request: &str, backward: bool) -> Result<Fragment> {
    let compiled = compile_request(request);
    let statements = compiled
        .statements(backward)
        .into_iter()
        .map(|raw| Statement::parse(raw).map(|s| (raw, s)))
        .collect::<Result<Vec<_>>>()?;

    let mut evolved = fragment.clone();
    let mut deltas = Vec::with_capacity(statements.len());
    {
        let mut interpreter = Interpreter::new(
            &mut evolved.model,
            fragment.variant_id.clone(),
            fragment.variant_time,
        );
        for (raw, statement) in statements {
            tracing::debug!(statement = raw, "executing evolution statement");
            let target = interpreter.execute(raw, statement)?;
            deltas.push((raw, target));
        }
    }
    for (raw, target) in deltas {
        evolved.trace.push(raw, target);
    }
    evolved.assign_fresh_global_id();
    Ok(evolved)
}
