//! Evolution service: run a request against a stored model version

use modicio_core::{evolve, Fragment};
use modicio_core_types::RequestContext;
use modicio_store::{FragmentQuery, FragmentStore};

use super::instrumented;
use crate::errors::{fragment_not_found, Result};

pub struct EvolutionService<'a> {
    store: &'a dyn FragmentStore,
}

impl<'a> EvolutionService<'a> {
    pub fn new(store: &'a dyn FragmentStore) -> Self {
        Self { store }
    }

    /// Evolve the closed model at (variant, running version) and persist the
    /// result as the variant's next running version
    ///
    /// The stored source is untouched; on any statement error nothing is
    /// persisted.
    ///
    /// # Errors
    /// * `FragmentNotFound` - no closed model fragment at the coordinate
    /// * every error `evolve` raises
    pub fn evolve_fragment(
        &self,
        ctx: &RequestContext,
        variant_id: &str,
        running_id: &str,
        request: &str,
        backward: bool,
    ) -> Result<Fragment> {
        instrumented("evolve_fragment", ctx, || {
            let query = FragmentQuery::version(variant_id, running_id)
                .closed_only()
                .model_only();
            let source = self
                .store
                .fetch_fragment(&query)?
                .ok_or_else(|| fragment_not_found(&query))?;

            let mut evolved = evolve(&source, request, backward)?;
            evolved.next_running_version();
            evolved.predecessor_id = Some(source.global_id.clone());
            evolved.is_reference = false;
            evolved.open = false;

            tracing::debug!(
                variant_id,
                from_running_id = running_id,
                to_running_id = %evolved.running_id,
                "evolved running version"
            );
            self.store.persist(evolved)
        })
    }
}
