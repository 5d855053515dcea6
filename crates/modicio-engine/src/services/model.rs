//! Model service: variants, full-model pushes and the reference model

use chrono::Utc;
use modicio_core::errors::ModicioError;
use modicio_core::rules::validate_push_source;
use modicio_core::{Fragment, Model};
use modicio_core_types::RequestContext;
use modicio_store::{FragmentQuery, FragmentStore};
use uuid::Uuid;

use super::instrumented;
use crate::errors::Result;

pub struct ModelService<'a> {
    store: &'a dyn FragmentStore,
}

impl<'a> ModelService<'a> {
    pub fn new(store: &'a dyn FragmentStore) -> Self {
        Self { store }
    }

    /// Open a new variant
    ///
    /// Without `pre_variant_id` the variant starts from an empty model.
    /// Otherwise it branches off the latest closed model of that variant,
    /// keeping its name unless `name` is given.
    ///
    /// # Errors
    /// * `VariantNotFound` - `pre_variant_id` has no closed model fragment
    pub fn new_variant(
        &self,
        ctx: &RequestContext,
        pre_variant_id: Option<&str>,
        name: Option<&str>,
    ) -> Result<Fragment> {
        instrumented("new_variant", ctx, || {
            let fragment = match pre_variant_id {
                None => Fragment::new_variant(name.map(str::to_string), Model::new()),
                Some(pre_variant_id) => {
                    let query = FragmentQuery::variant(pre_variant_id)
                        .closed_only()
                        .model_only();
                    let mut fragment = self.store.fetch_fragment(&query)?.ok_or_else(|| {
                        ModicioError::VariantNotFound {
                            variant_id: pre_variant_id.to_string(),
                        }
                    })?;
                    branch(&mut fragment, name);
                    fragment
                }
            };
            self.store.persist(fragment)
        })
    }

    /// Store `fragment`'s model as a new running version
    ///
    /// * `variant_id` given, `as_version` set: a new running version of that
    ///   variant.
    /// * `variant_id` given, `as_version` unset: a new variant branched off
    ///   it.
    /// * no `variant_id`: a new variant named `name`.
    ///
    /// The predecessor is the variant's latest closed fragment when one is
    /// named, else the pushed fragment itself. The result is closed and is never
    /// the reference.
    ///
    /// # Errors
    /// * `InstanceBearingPush` - `fragment` holds an instance
    /// * `VariantNotFound` - `variant_id` is unknown
    pub fn push_full_model(
        &self,
        ctx: &RequestContext,
        fragment: Fragment,
        variant_id: Option<&str>,
        name: Option<&str>,
        as_version: bool,
    ) -> Result<Fragment> {
        instrumented("push_full_model", ctx, || {
            validate_push_source(&fragment)?;
            let mut fragment = fragment;

            let predecessor = match variant_id {
                None => {
                    let predecessor = fragment.global_id.clone();
                    branch(&mut fragment, name);
                    predecessor
                }
                Some(variant_id) => {
                    let trunk = self
                        .store
                        .fetch_fragment(
                            &FragmentQuery::variant(variant_id).closed_only().model_only(),
                        )?
                        .ok_or_else(|| ModicioError::VariantNotFound {
                            variant_id: variant_id.to_string(),
                        })?;
                    if as_version {
                        fragment.set_variant(trunk.variant_id.clone(), trunk.variant_time);
                        fragment.variant_name = trunk.variant_name.clone();
                        fragment.next_running_version();
                    } else {
                        fragment.variant_name = trunk.variant_name.clone();
                        branch(&mut fragment, name);
                    }
                    trunk.global_id
                }
            };

            fragment.predecessor_id = Some(predecessor);
            fragment.open = false;
            self.store.persist(fragment)
        })
    }

    /// The current reference Fragment
    ///
    /// # Errors
    /// * `ReferenceNotSet`
    pub fn reference_fragment(&self, ctx: &RequestContext) -> Result<Fragment> {
        instrumented("reference_fragment", ctx, || {
            self.store
                .fetch_reference_fragment()?
                .ok_or_else(|| ModicioError::ReferenceNotSet.into())
        })
    }
}

/// Move `fragment` onto a brand-new variant as its first running version
///
/// The predecessor points at the fragment's previous identity. A new
/// variant starts with an empty trace.
pub(crate) fn branch(fragment: &mut Fragment, name: Option<&str>) {
    fragment.next_running_version();
    fragment.set_variant(Uuid::new_v4().to_string(), Utc::now());
    if let Some(name) = name {
        fragment.variant_name = Some(name.to_string());
    }
    fragment.instance = None;
    fragment.is_reference = false;
    fragment.open = false;
    fragment.trace.clear();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use modicio_store::InMemoryFragmentStore;

    #[test]
    fn test_branch_links_previous_identity() {
        let fragment = Fragment::new_variant(Some("a".to_string()), Model::new());
        let mut fragment = modicio_core::evolve(&fragment, "CREATE CLASS Alpha", false).unwrap();
        assert_eq!(fragment.trace.len(), 1);
        let (global_id, variant_id, running_id) = (
            fragment.global_id.clone(),
            fragment.variant_id.clone(),
            fragment.running_id.clone(),
        );

        branch(&mut fragment, None);

        assert_eq!(fragment.predecessor_id.as_deref(), Some(global_id.as_str()));
        assert_ne!(fragment.variant_id, variant_id);
        assert_eq!(fragment.variant_name.as_deref(), Some("a"));
        assert_ne!(fragment.running_id, running_id);
        assert!(fragment.trace.is_empty());
    }

    #[test]
    fn test_reference_missing() {
        let store = InMemoryFragmentStore::new();
        let err = ModelService::new(&store)
            .reference_fragment(&RequestContext::new())
            .unwrap_err();
        assert_eq!(err.message(), "Undefined reference model");
    }
}
