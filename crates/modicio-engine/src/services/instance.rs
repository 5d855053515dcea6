//! Instance service: instantiate the reference model and edit instances
//!
//! Every edit loads the instance Fragment, changes a detached copy and
//! persists it as a new snapshot linked to the one it replaced.

use modicio_core::errors::ModicioError;
use modicio_core::ops::{
    add_association_instance, instantiate_composite, remove_association_instance,
    remove_composite, set_attribute_value, AssociationTarget,
};
use modicio_core::traversal::model_closure;
use modicio_core::{create_instance, Fragment, Instance, Model};
use modicio_core_types::RequestContext;
use modicio_store::{FragmentStore, InstanceQuery};

use super::instrumented;
use crate::errors::{fragment_not_found, Result};

pub struct InstanceService<'a> {
    store: &'a dyn FragmentStore,
}

/// Fetch an instance-bearing Fragment by data id
pub(crate) fn load_instance(store: &dyn FragmentStore, data_id: i64) -> Result<Fragment> {
    let fragment = store
        .fetch_by_data_id(data_id)?
        .ok_or_else(|| fragment_not_found(format!("data_id={}", data_id)))?;
    if fragment.instance.is_none() {
        return Err(ModicioError::NoInstance {
            global_id: fragment.global_id,
        }
        .into());
    }
    Ok(fragment)
}

/// Persist `fragment` after `edit` changed its instance
pub(crate) fn edit_instance<F>(
    store: &dyn FragmentStore,
    mut fragment: Fragment,
    edit: F,
) -> Result<Fragment>
where
    F: FnOnce(&Model, &mut Instance) -> modicio_core::Result<()>,
{
    let mut instance = fragment.instance.take().ok_or_else(|| ModicioError::NoInstance {
        global_id: fragment.global_id.clone(),
    })?;
    edit(&fragment.model, &mut instance)?;
    fragment.instance = Some(instance);
    persist_snapshot(store, fragment)
}

/// Persist `fragment` as the successor of its current identity
pub(crate) fn persist_snapshot(
    store: &dyn FragmentStore,
    mut fragment: Fragment,
) -> Result<Fragment> {
    fragment.predecessor_id = Some(fragment.global_id.clone());
    fragment.assign_fresh_global_id();
    fragment.data_id = None;
    store.persist(fragment)
}

/// Describe the root of an instance Fragment as an association target
fn association_target(fragment: &Fragment) -> Result<AssociationTarget> {
    let instance = fragment
        .instance
        .as_ref()
        .ok_or_else(|| ModicioError::NoInstance {
            global_id: fragment.global_id.clone(),
        })?;
    let closure = model_closure(&fragment.model, &instance.model_root)?;
    let annotation = closure
        .first()
        .map(|root| root.annotation.clone())
        .unwrap_or_default();
    Ok(AssociationTarget {
        instance_uri: instance.uri.clone(),
        type_closure: closure.iter().map(|n| n.uri.clone()).collect(),
        annotation,
    })
}

impl<'a> InstanceService<'a> {
    pub fn new(store: &'a dyn FragmentStore) -> Self {
        Self { store }
    }

    /// Instantiate `node_uri` of the reference model
    ///
    /// The new Fragment keeps the reference's coordinates, is open and
    /// points back at the reference.
    ///
    /// # Errors
    /// * `ReferenceNotSet`
    /// * every error of `create_instance`
    pub fn create_instance(
        &self,
        ctx: &RequestContext,
        node_uri: &str,
        name: &str,
        uri: &str,
    ) -> Result<Fragment> {
        instrumented("create_instance", ctx, || {
            let reference = self
                .store
                .fetch_reference_fragment()?
                .ok_or(ModicioError::ReferenceNotSet)?;
            let instance = create_instance(&reference.model, node_uri, name, uri)?;

            let mut fragment = reference;
            fragment.predecessor_id = Some(fragment.global_id.clone());
            fragment.assign_fresh_global_id();
            fragment.data_id = None;
            fragment.is_reference = false;
            fragment.open = true;
            fragment.trace.clear();
            fragment.instance = Some(instance);
            self.store.persist(fragment)
        })
    }

    /// # Errors
    /// * `FragmentNotFound` - unknown data id
    /// * `NoInstance` - the Fragment holds only a model
    pub fn get_instance(&self, ctx: &RequestContext, data_id: i64) -> Result<Fragment> {
        instrumented("get_instance", ctx, || load_instance(self.store, data_id))
    }

    pub fn find_instances(
        &self,
        ctx: &RequestContext,
        query: &InstanceQuery,
    ) -> Result<Vec<Fragment>> {
        instrumented("find_instances", ctx, || self.store.find_instances(query))
    }

    /// Delete one instance snapshot
    ///
    /// # Errors
    /// * `FragmentNotFound` / `NoInstance` - as for `get_instance`
    pub fn delete_instance(&self, ctx: &RequestContext, data_id: i64) -> Result<bool> {
        instrumented("delete_instance", ctx, || {
            load_instance(self.store, data_id)?;
            self.store.delete_fragment(data_id)
        })
    }

    /// Set attribute values by attribute name or uri, all or nothing
    ///
    /// # Errors
    /// * `AttributeNotFound` - a key has no slot in the instance
    pub fn set_attributes(
        &self,
        ctx: &RequestContext,
        data_id: i64,
        values: &[(String, String)],
    ) -> Result<Fragment> {
        instrumented("set_attributes", ctx, || {
            let fragment = load_instance(self.store, data_id)?;
            edit_instance(self.store, fragment, |model, instance| {
                for (key, value) in values {
                    set_attribute_value(model, instance, key, value.clone())?;
                }
                Ok(())
            })
        })
    }

    /// Link the `owner_node_uri` object of instance `data_id` to the
    /// instance held by `target_data_id`
    ///
    /// # Errors
    /// * `AssociationNotFound` / `IncompatibleTarget` / `ObjectNotFound`
    pub fn add_association(
        &self,
        ctx: &RequestContext,
        data_id: i64,
        owner_node_uri: &str,
        association_uri: &str,
        target_data_id: i64,
    ) -> Result<Fragment> {
        instrumented("add_association", ctx, || {
            let target = association_target(&load_instance(self.store, target_data_id)?)?;
            let fragment = load_instance(self.store, data_id)?;
            edit_instance(self.store, fragment, |model, instance| {
                add_association_instance(model, instance, owner_node_uri, association_uri, &target)
            })
        })
    }

    pub fn remove_association(
        &self,
        ctx: &RequestContext,
        data_id: i64,
        owner_node_uri: &str,
        association_uri: &str,
        target_instance_uri: &str,
    ) -> Result<Fragment> {
        instrumented("remove_association", ctx, || {
            let fragment = load_instance(self.store, data_id)?;
            edit_instance(self.store, fragment, |_, instance| {
                remove_association_instance(
                    instance,
                    owner_node_uri,
                    association_uri,
                    target_instance_uri,
                )
            })
        })
    }

    /// Materialize a composite of `composition_uri` under `owner_node_uri`
    ///
    /// # Errors
    /// * `CompositionNotFound` / `IncompatibleTarget` / `ObjectNotFound`
    pub fn create_composite(
        &self,
        ctx: &RequestContext,
        data_id: i64,
        owner_node_uri: &str,
        composition_uri: &str,
        name: &str,
        uri: &str,
    ) -> Result<Fragment> {
        instrumented("create_composite", ctx, || {
            let fragment = load_instance(self.store, data_id)?;
            edit_instance(self.store, fragment, |model, instance| {
                instantiate_composite(model, instance, owner_node_uri, composition_uri, name, uri)
            })
        })
    }

    pub fn remove_composite(
        &self,
        ctx: &RequestContext,
        data_id: i64,
        composite_uri: &str,
    ) -> Result<Fragment> {
        instrumented("remove_composite", ctx, || {
            let fragment = load_instance(self.store, data_id)?;
            edit_instance(self.store, fragment, |model, instance| {
                remove_composite(model, instance, composite_uri).map(|_| ())
            })
        })
    }
}
