//! Behaviour service: run node scripts against stored instances

use modicio_core::errors::ModicioError;
use modicio_core::functions::{run_script, FunctionRegistry, ScriptOutcome};
use modicio_core::traversal::model_closure;
use modicio_core::Fragment;
use modicio_core_types::RequestContext;
use modicio_store::FragmentStore;

use super::instance::{load_instance, persist_snapshot};
use super::instrumented;
use crate::errors::Result;

/// Result of one script run
#[derive(Debug, Clone)]
pub struct ScriptRun {
    pub outcome: ScriptOutcome,
    /// The instance after the run; a new snapshot when the script wrote
    pub fragment: Fragment,
}

pub struct BehaviourService<'a> {
    store: &'a dyn FragmentStore,
    registry: FunctionRegistry,
}

impl<'a> BehaviourService<'a> {
    /// Service dispatching to the built-in functions
    pub fn new(store: &'a dyn FragmentStore) -> Self {
        Self::with_registry(store, FunctionRegistry::default())
    }

    pub fn with_registry(store: &'a dyn FragmentStore, registry: FunctionRegistry) -> Self {
        Self { store, registry }
    }

    /// Run `script_name`, declared on the instance's root node or one of its
    /// ancestors
    ///
    /// Scripts that write persist the updated instance; `button` scripts
    /// only return their value.
    ///
    /// # Errors
    /// * `FunctionNotFound` - no such script in the closure, or no function
    ///   registered for it
    /// * every error of the function itself
    pub fn run_script(
        &self,
        ctx: &RequestContext,
        data_id: i64,
        script_name: &str,
    ) -> Result<ScriptRun> {
        instrumented("run_script", ctx, || {
            let mut fragment = load_instance(self.store, data_id)?;
            let root = fragment
                .instance
                .as_ref()
                .map(|i| i.model_root.clone())
                .unwrap_or_default();
            let script = model_closure(&fragment.model, &root)?
                .into_iter()
                .find_map(|node| node.script_by_name(script_name))
                .cloned()
                .ok_or_else(|| ModicioError::FunctionNotFound {
                    name: script_name.to_string(),
                })?;

            let mut instance = fragment.instance.take().ok_or_else(|| {
                ModicioError::NoInstance {
                    global_id: fragment.global_id.clone(),
                }
            })?;
            let outcome = run_script(&self.registry, &script, &fragment.model, &mut instance)?;
            fragment.instance = Some(instance);

            let fragment = match outcome {
                ScriptOutcome::Returned(_) => fragment,
                ScriptOutcome::Written { .. } => persist_snapshot(self.store, fragment)?,
            };
            Ok(ScriptRun { outcome, fragment })
        })
    }
}
