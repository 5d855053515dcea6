//! Read/navigation façade over one instantiated object
//!
//! An `Accessor` borrows the model and the object list of an instance (or
//! of a composite) and resolves attributes across the inheritance chain of
//! the bound object. All wiring is checked once, at construction.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{ModicioError, Result};
use crate::model::{
    Attribute, AttributeInstance, CompositionInstance, Fragment, IObject, Instance, Model, Node,
};

/// `node uri -> (attribute uri -> slot)`
pub type DeepAttributeMap<'a> = BTreeMap<&'a str, BTreeMap<&'a str, &'a AttributeInstance>>;

#[derive(Debug)]
pub struct Accessor<'a> {
    model: &'a Model,
    /// Bound object followed by the objects of its ancestors, nearest first
    chain: Vec<(&'a IObject, &'a Node)>,
    deep: DeepAttributeMap<'a>,
}

impl<'a> Accessor<'a> {
    /// Bind to `objects[index]`.
    ///
    /// # Errors
    /// * `InvalidInput` - `index` is out of range
    /// * `NotWired` - the object, or one of its ancestors' objects, names a
    ///   node that `model` does not contain
    pub fn new(model: &'a Model, objects: &'a [IObject], index: usize) -> Result<Self> {
        let object = objects.get(index).ok_or_else(|| ModicioError::InvalidInput {
            reason: format!("object index {} out of range ({})", index, objects.len()),
        })?;
        let chain = wire_chain(model, objects, object)?;

        let mut deep: DeepAttributeMap<'a> = BTreeMap::new();
        for (obj, node) in &chain {
            let slots = obj
                .attribute_instances
                .iter()
                .map(|a| (a.attribute_uri.as_str(), a))
                .collect();
            deep.insert(node.uri.as_str(), slots);
        }

        Ok(Self { model, chain, deep })
    }

    /// Bind to the object of type `instance_of` in `instance`
    ///
    /// # Errors
    /// * `ObjectNotFound` - no such object
    /// * `NotWired` - see [`Accessor::new`]
    pub fn for_object(model: &'a Model, instance: &'a Instance, instance_of: &str) -> Result<Self> {
        let index = instance
            .object_index(instance_of)
            .ok_or_else(|| ModicioError::ObjectNotFound {
                instance_of: instance_of.to_string(),
            })?;
        Self::new(model, &instance.objects, index)
    }

    /// Bind to the root object of the fragment's instance
    ///
    /// # Errors
    /// * `NoInstance` - the fragment holds no instance
    /// * `ObjectNotFound` / `NotWired` - see [`Accessor::for_object`]
    pub fn for_fragment(fragment: &'a Fragment) -> Result<Self> {
        let instance = fragment
            .instance
            .as_ref()
            .ok_or_else(|| ModicioError::NoInstance {
                global_id: fragment.global_id.clone(),
            })?;
        Self::for_object(&fragment.model, instance, &instance.model_root)
    }

    /// Bind to the root object of a composite
    ///
    /// # Errors
    /// * `ObjectNotFound` / `NotWired`
    pub fn for_composite(model: &'a Model, composite: &'a CompositionInstance) -> Result<Self> {
        let index = composite
            .objects
            .iter()
            .position(|o| o.instance_of == composite.model_root)
            .ok_or_else(|| ModicioError::ObjectNotFound {
                instance_of: composite.model_root.clone(),
            })?;
        Self::new(model, &composite.objects, index)
    }

    pub fn object(&self) -> &'a IObject {
        self.chain[0].0
    }

    pub fn node(&self) -> &'a Node {
        self.chain[0].1
    }

    // ----- local scope -----

    pub fn attribute_by_name(&self, name: &str) -> Option<&'a AttributeInstance> {
        let (object, node) = self.chain[0];
        local_slot_by_name(object, node, name)
    }

    pub fn attribute_by_uri(&self, uri: &str) -> Option<&'a AttributeInstance> {
        self.object().attribute(uri)
    }

    // ----- inheritance chain -----

    /// First slot named `name` along the chain, bound object first
    pub fn deep_attribute_by_name(&self, name: &str) -> Option<&'a AttributeInstance> {
        self.chain
            .iter()
            .find_map(|(object, node)| local_slot_by_name(object, node, name))
    }

    pub fn deep_attribute_by_uri(&self, uri: &str) -> Option<&'a AttributeInstance> {
        self.chain
            .iter()
            .find_map(|(_, node)| self.deep.get(node.uri.as_str())?.get(uri).copied())
    }

    pub fn deep_attribute_map(&self) -> &DeepAttributeMap<'a> {
        &self.deep
    }

    /// Value of `name` along the chain: an instance slot if there is one,
    /// otherwise a concretized constant
    pub fn deep_value_by_name(&self, name: &str) -> Option<&'a str> {
        if let Some(slot) = self.deep_attribute_by_name(name) {
            return Some(slot.value.as_str());
        }
        let attribute = self.definition_by_name(name)?;
        self.chain.iter().find_map(|(_, node)| {
            node.concretization_for(&attribute.uri)
                .map(|c| c.attribute_instance.value.as_str())
        })
    }

    /// Declaration of `attribute_uri` anywhere along the chain
    pub fn definition_by_attribute(&self, attribute_uri: &str) -> Option<&'a Attribute> {
        self.chain
            .iter()
            .find_map(|(_, node)| node.attribute_by_uri(attribute_uri))
    }

    fn definition_by_name(&self, name: &str) -> Option<&'a Attribute> {
        self.chain
            .iter()
            .find_map(|(_, node)| node.attribute_by_name(name))
    }

    /// Objects of the direct parents of the bound node
    pub fn parents(&self) -> Vec<&'a IObject> {
        let node = self.node();
        self.chain[1..]
            .iter()
            .filter(|(_, n)| node.has_parent(&n.uri))
            .map(|(o, _)| *o)
            .collect()
    }

    /// Bound object followed by every ancestor object
    pub fn chain(&self) -> impl Iterator<Item = &'a IObject> + '_ {
        self.chain.iter().map(|(o, _)| *o)
    }

    // ----- composites -----

    pub fn composites(&self) -> &'a [CompositionInstance] {
        &self.object().composition_instances
    }

    pub fn composites_by_rule(
        &self,
        composition_uri: &'a str,
    ) -> impl Iterator<Item = &'a CompositionInstance> + 'a {
        self.composites()
            .iter()
            .filter(move |c| c.composition_uri == composition_uri)
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }
}

fn local_slot_by_name<'a>(
    object: &'a IObject,
    node: &'a Node,
    name: &str,
) -> Option<&'a AttributeInstance> {
    let attribute = node.attribute_by_name(name)?;
    object.attribute(&attribute.uri)
}

/// Walk the parent relations of `object`'s node and pair every reachable
/// ancestor object with its node
fn wire_chain<'a>(
    model: &'a Model,
    objects: &'a [IObject],
    object: &'a IObject,
) -> Result<Vec<(&'a IObject, &'a Node)>> {
    let wire = |o: &'a IObject| -> Result<(&'a IObject, &'a Node)> {
        let node = model
            .node(&o.instance_of)
            .ok_or_else(|| ModicioError::NotWired {
                instance_of: o.instance_of.clone(),
            })?;
        Ok((o, node))
    };

    let mut chain = vec![wire(object)?];
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    seen.insert(object.instance_of.as_str());

    let mut cursor = 0;
    while cursor < chain.len() {
        let (_, node) = chain[cursor];
        cursor += 1;
        for parent_uri in node.parent_uris() {
            if !seen.insert(parent_uri) {
                continue;
            }
            if let Some(parent) = objects.iter().find(|o| o.instance_of == parent_uri) {
                chain.push(wire(parent)?);
            }
        }
    }
    Ok(chain)
}
