use std::collections::BTreeSet;

use crate::errors::{ModicioError, Result};
use crate::model::{
    AttributeInstance, Composition, CompositionInstance, Header, HeaderElement, IObject, Instance,
    Model, Node,
};
use crate::rules::invariants::find_cycles_among;
use crate::rules::validate_closure;
use crate::traversal::{inheritance_closure, model_closure, slice_deep, Slice};
use crate::{log_op_end, log_op_error, log_op_start};

/// Materialize one object per node of the inheritance closure of `root`
///
/// Each object gets an empty `AttributeInstance` for every attribute its
/// node declares, except attributes that some node of the closure
/// concretizes. Association and composition instances start empty.
/// Objects come back root first.
pub fn build_instance(root: &Node, slice: &Slice<'_>) -> Vec<IObject> {
    let closure = inheritance_closure(root, slice);
    objects_for_closure(&closure)
}

fn objects_for_closure(closure: &[&Node]) -> Vec<IObject> {
    let fixed: BTreeSet<&str> = closure
        .iter()
        .flat_map(|n| n.concretizations.iter().map(|c| c.attribute_uri()))
        .collect();

    closure
        .iter()
        .map(|node| {
            let mut object = IObject::new(node.uri.clone());
            object.attribute_instances = node
                .attributes
                .iter()
                .filter(|a| !fixed.contains(a.uri.as_str()))
                .map(|a| AttributeInstance::new(a.uri.clone(), ""))
                .collect();
            object
        })
        .collect()
}

/// Objects for a deep instantiation of `root_uri`: slice, validate the
/// closure, build
fn instantiate_objects(model: &Model, root_uri: &str) -> Result<Vec<IObject>> {
    let slice = slice_deep(model, root_uri)?;
    let root = slice.root().ok_or_else(|| ModicioError::RootNotFound {
        uri: root_uri.to_string(),
    })?;
    let closure = inheritance_closure(root, &slice);
    let cycles = find_cycles_among(closure.iter().copied(), |uri| slice.get(uri));
    if let Some(node_uri) = cycles.into_iter().next() {
        return Err(ModicioError::InheritanceCycle { node_uri });
    }
    validate_closure(&closure)?;
    Ok(objects_for_closure(&closure))
}

/// Create a deep instance of `root_uri`
///
/// # Errors
/// * `RootNotFound` - `root_uri` is not in `model`
/// * `InheritanceCycle` - the root's closure loops back onto itself
/// * `ConcretizationConflict` - the closure concretizes an attribute twice
pub fn create_instance(model: &Model, root_uri: &str, name: &str, uri: &str) -> Result<Instance> {
    log_op_start!("create_instance", node_uri = root_uri);
    let start = std::time::Instant::now();

    let result = instantiate_objects(model, root_uri).map(|objects| {
        let mut instance = Instance::new(name, root_uri, uri, objects);
        update_header(model, &mut instance);
        instance
    });

    match &result {
        Ok(instance) => log_op_end!(
            "create_instance",
            duration_ms = start.elapsed().as_millis() as u64,
            object_count = instance.objects.len()
        ),
        Err(e) => log_op_error!(
            "create_instance",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        ),
    }
    result
}

/// Build a composite sub-instance for `composition`
pub(crate) fn build_composite(
    model: &Model,
    composition: &Composition,
    name: &str,
    uri: &str,
) -> Result<CompositionInstance> {
    Ok(CompositionInstance {
        name: name.to_string(),
        model_root: composition.target.clone(),
        uri: uri.to_string(),
        composition_uri: composition.uri.clone(),
        objects: instantiate_objects(model, &composition.target)?,
    })
}

/// Find the composition `composition_uri` declared on `node_uri` or one of
/// its ancestors
pub(crate) fn find_composition<'a>(
    model: &'a Model,
    node_uri: &str,
    composition_uri: &str,
) -> Option<&'a Composition> {
    model_closure(model, node_uri)
        .ok()?
        .into_iter()
        .find_map(|n| n.composition_by_uri(composition_uri))
}

/// Recompute the Header of `instance`
///
/// Walks the composites from the top-level objects down. A composite is
/// listed only if its own composition and every composition above it are
/// public: the first private composition hides everything beneath it.
/// Composites whose composition is no longer in the model count as private.
pub fn update_header(model: &Model, instance: &mut Instance) {
    let mut elements = Vec::new();
    collect_public(model, &instance.objects, true, &mut elements);
    instance.header = Header { elements };
}

fn collect_public(
    model: &Model,
    objects: &[IObject],
    parent_public: bool,
    out: &mut Vec<HeaderElement>,
) {
    for object in objects {
        for composite in &object.composition_instances {
            let public = parent_public
                && find_composition(model, &object.instance_of, &composite.composition_uri)
                    .is_some_and(|c| c.is_public);
            if public {
                out.push(HeaderElement {
                    composite_node_uri: composite.model_root.clone(),
                    composite_instance_uri: composite.uri.clone(),
                });
            }
            collect_public(model, &composite.objects, public, out);
        }
    }
}
