use crate::errors::{ModicioError, Result};
use crate::model::{
    Annotation, AssociationInstance, CompositionInstance, IObject, Instance, Model,
};
use crate::traversal::model_closure;

use super::instantiate::{build_composite, find_composition, update_header};

/// The far end of an association link
#[derive(Debug, Clone)]
pub struct AssociationTarget {
    pub instance_uri: String,
    /// Root node of the target instance followed by its ancestors
    pub type_closure: Vec<String>,
    /// Coordinates of the target's root node
    pub annotation: Annotation,
}

/// Depth-first search for the object of type `instance_of`, top level first
fn find_object_mut<'a>(objects: &'a mut [IObject], instance_of: &str) -> Option<&'a mut IObject> {
    if let Some(pos) = objects.iter().position(|o| o.instance_of == instance_of) {
        return objects.get_mut(pos);
    }
    for object in objects.iter_mut() {
        for composite in object.composition_instances.iter_mut() {
            if let Some(found) = find_object_mut(&mut composite.objects, instance_of) {
                return Some(found);
            }
        }
    }
    None
}

fn take_composite(objects: &mut [IObject], composite_uri: &str) -> Option<CompositionInstance> {
    for object in objects.iter_mut() {
        if let Some(pos) = object
            .composition_instances
            .iter()
            .position(|c| c.uri == composite_uri)
        {
            return Some(object.composition_instances.remove(pos));
        }
        for composite in object.composition_instances.iter_mut() {
            if let Some(found) = take_composite(&mut composite.objects, composite_uri) {
                return Some(found);
            }
        }
    }
    None
}

/// Set the value of the attribute `key` (uri or name) on the first
/// top-level object that has a slot for it
///
/// # Errors
/// * `AttributeNotFound` - no object has a slot for `key` (unknown, or
///   fixed by a concretization)
pub fn set_attribute_value(
    model: &Model,
    instance: &mut Instance,
    key: &str,
    value: impl Into<String>,
) -> Result<()> {
    for object in instance.objects.iter_mut() {
        let declared = model.node(&object.instance_of).and_then(|node| {
            node.attributes
                .iter()
                .find(|a| a.uri == key || a.name == key)
        });
        let Some(attribute) = declared else {
            continue;
        };
        if let Some(slot) = object.attribute_mut(&attribute.uri) {
            slot.value = value.into();
            return Ok(());
        }
    }
    Err(ModicioError::AttributeNotFound {
        name: key.to_string(),
    })
}

/// Link the object of type `owner_node_uri` to another instance
///
/// The association may be declared on the owner node or any of its
/// ancestors. The target must be of the association's target type (or a
/// descendant of it) and satisfy its variability interface. Adding an
/// existing link is a no-op.
///
/// # Errors
/// * `AssociationNotFound` - no such association in the owner's closure
/// * `IncompatibleTarget` - wrong target type, or the interface rejects it
/// * `ObjectNotFound` - the instance has no object of the owner type
pub fn add_association_instance(
    model: &Model,
    instance: &mut Instance,
    owner_node_uri: &str,
    association_uri: &str,
    target: &AssociationTarget,
) -> Result<()> {
    let association = model_closure(model, owner_node_uri)?
        .into_iter()
        .find_map(|n| n.association_by_uri(association_uri))
        .ok_or_else(|| ModicioError::AssociationNotFound {
            name: association_uri.to_string(),
        })?;

    let type_ok = target
        .type_closure
        .iter()
        .any(|uri| *uri == association.target);
    if !type_ok || !association.interface.is_compatible(&target.annotation) {
        return Err(ModicioError::IncompatibleTarget {
            relation_uri: association.uri.clone(),
            target_uri: target.instance_uri.clone(),
        });
    }

    let object = find_object_mut(&mut instance.objects, owner_node_uri).ok_or_else(|| {
        ModicioError::ObjectNotFound {
            instance_of: owner_node_uri.to_string(),
        }
    })?;
    let link = AssociationInstance {
        association_uri: association.uri.clone(),
        target_instance_uri: target.instance_uri.clone(),
    };
    if !object.association_instances.contains(&link) {
        object.association_instances.push(link);
    }
    Ok(())
}

/// Remove an association link
///
/// # Errors
/// * `ObjectNotFound` - the instance has no object of the owner type
/// * `AssociationNotFound` - the link does not exist
pub fn remove_association_instance(
    instance: &mut Instance,
    owner_node_uri: &str,
    association_uri: &str,
    target_instance_uri: &str,
) -> Result<()> {
    let object = find_object_mut(&mut instance.objects, owner_node_uri).ok_or_else(|| {
        ModicioError::ObjectNotFound {
            instance_of: owner_node_uri.to_string(),
        }
    })?;
    let before = object.association_instances.len();
    object.association_instances.retain(|l| {
        !(l.association_uri == association_uri && l.target_instance_uri == target_instance_uri)
    });
    if object.association_instances.len() == before {
        return Err(ModicioError::AssociationNotFound {
            name: association_uri.to_string(),
        });
    }
    Ok(())
}

/// Materialize a composite under the object of type `owner_node_uri`
///
/// The composite holds one object per node of its target's inheritance
/// closure. A composite is always built from the owning model, so an empty
/// composition interface places no constraint on it; a non-empty one must
/// accept the target node. The header is recomputed afterwards.
///
/// # Errors
/// * `CompositionNotFound` - no such composition in the owner's closure
/// * `IncompatibleTarget` - the composition interface rejects the target
/// * `ObjectNotFound` - the instance has no object of the owner type
/// * any error of instantiating the composition target
pub fn instantiate_composite(
    model: &Model,
    instance: &mut Instance,
    owner_node_uri: &str,
    composition_uri: &str,
    name: &str,
    uri: &str,
) -> Result<()> {
    let composition = find_composition(model, owner_node_uri, composition_uri).ok_or_else(|| {
        ModicioError::CompositionNotFound {
            name: composition_uri.to_string(),
        }
    })?;

    if !composition.interface.is_empty() {
        let target = model.require_node(&composition.target)?;
        if !composition.interface.is_compatible(&target.annotation) {
            return Err(ModicioError::IncompatibleTarget {
                relation_uri: composition.uri.clone(),
                target_uri: target.uri.clone(),
            });
        }
    }

    let composite = build_composite(model, composition, name, uri)?;
    let object = find_object_mut(&mut instance.objects, owner_node_uri).ok_or_else(|| {
        ModicioError::ObjectNotFound {
            instance_of: owner_node_uri.to_string(),
        }
    })?;
    object.composition_instances.push(composite);
    update_header(model, instance);
    Ok(())
}

/// Remove a composite (and everything nested in it) by uri
///
/// # Errors
/// * `CompositionNotFound` - no composite with this uri
pub fn remove_composite(
    model: &Model,
    instance: &mut Instance,
    composite_uri: &str,
) -> Result<CompositionInstance> {
    let removed = take_composite(&mut instance.objects, composite_uri).ok_or_else(|| {
        ModicioError::CompositionNotFound {
            name: composite_uri.to_string(),
        }
    })?;
    update_header(model, instance);
    Ok(removed)
}
