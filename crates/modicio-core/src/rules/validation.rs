use super::invariants;
use crate::errors::{ModicioError, Result};
use crate::model::{Fragment, Model, Node};
use crate::traversal::model_closure;

/// Validate the whole type graph
///
/// 1. No inheritance cycles
/// 2. At most one concretization per attribute per inheritance chain
///
/// # Errors
/// Returns the first violation found. Call the finders in `invariants`
/// for an exhaustive report.
pub fn validate_model(model: &Model) -> Result<()> {
    if let Some(node_uri) = invariants::find_inheritance_cycles(model).into_iter().next() {
        return Err(ModicioError::InheritanceCycle { node_uri });
    }
    for node in model.nodes() {
        let closure = model_closure(model, &node.uri)?;
        validate_closure(&closure)?;
    }
    Ok(())
}

/// Validate one inheritance closure (root first)
///
/// # Errors
/// * `ConcretizationConflict` - an attribute is concretized twice
pub fn validate_closure(closure: &[&Node]) -> Result<()> {
    match invariants::find_concretization_conflicts(closure).into_iter().next() {
        Some((attribute_uri, node_uri)) => Err(ModicioError::ConcretizationConflict {
            attribute_uri,
            node_uri,
        }),
        None => Ok(()),
    }
}

/// A Fragment may only be pushed as a model while it holds no instance
///
/// # Errors
/// * `InstanceBearingPush`
pub fn validate_push_source(fragment: &Fragment) -> Result<()> {
    if fragment.instance.is_some() {
        return Err(ModicioError::InstanceBearingPush {
            global_id: fragment.global_id.clone(),
        });
    }
    Ok(())
}

/// The reference Fragment must be closed and instance-free
///
/// # Errors
/// * `InvalidReference`
pub fn validate_reference_candidate(fragment: &Fragment) -> Result<()> {
    if fragment.open {
        return Err(ModicioError::InvalidReference {
            reason: format!("{} is open", fragment.coordinate()),
        });
    }
    if fragment.instance.is_some() {
        return Err(ModicioError::InvalidReference {
            reason: format!("{} holds an instance", fragment.coordinate()),
        });
    }
    Ok(())
}
