//! Scenario 2: evolving stored models

mod common;

use common::push_model;
use modicio_core::digest::model_digest;
use modicio_core::ExErrorKind;
use modicio_core_types::RequestContext;
use modicio_engine::{EvolutionService, MetadataService};
use modicio_store::{FragmentStore, InMemoryFragmentStore, SqliteFragmentStore};
use tempfile::TempDir;

#[test]
fn test_scenario_02_evolution_persists_next_running_version() {
    // GIVEN a pushed model
    let store = InMemoryFragmentStore::new();
    let source = push_model(&store);

    // WHEN evolving it
    let evolved = EvolutionService::new(&store)
        .evolve_fragment(
            &RequestContext::new(),
            &source.variant_id,
            &source.running_id,
            "CREATE CLASS Milestone, OPEN CLASS Milestone, ADD ATTRIBUTE Deadline",
            false,
        )
        .unwrap();

    // THEN a new running version of the same variant is stored
    assert_eq!(evolved.variant_id, source.variant_id);
    assert_ne!(evolved.running_id, source.running_id);
    assert_eq!(evolved.predecessor_id.as_deref(), Some(source.global_id.as_str()));
    assert!(evolved.model.node("modicio:Milestone").is_some());
    assert_eq!(evolved.trace.len(), 3);

    // AND the source is unchanged in the store
    let stored_source = store
        .fetch_by_data_id(source.data_id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored_source.model, source.model);

    // AND both versions are listed
    let versions = MetadataService::new(&store)
        .running_versions_of_variant(&RequestContext::new(), &source.variant_id, 10, true)
        .unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].id, evolved.running_id);
}

#[test]
fn test_scenario_02_failed_evolution_persists_nothing() {
    // GIVEN a pushed model
    let store = InMemoryFragmentStore::new();
    let source = push_model(&store);

    // WHEN a later statement fails
    let err = EvolutionService::new(&store)
        .evolve_fragment(
            &RequestContext::new(),
            &source.variant_id,
            &source.running_id,
            "CREATE CLASS Partial, OPEN CLASS Ghost",
            false,
        )
        .unwrap_err();

    // THEN the verbatim message surfaces and the store is untouched
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.message(), "Class does not exist!");
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_scenario_02_unknown_coordinate() {
    let store = InMemoryFragmentStore::new();
    let err = EvolutionService::new(&store)
        .evolve_fragment(&RequestContext::new(), "v", "r", "CREATE CLASS A", false)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_scenario_02_forward_backward_over_sqlite() {
    // GIVEN a SQLite store with a pushed model
    let dir = TempDir::new().unwrap();
    let store = SqliteFragmentStore::open(dir.path().join("store.db")).unwrap();
    let source = push_model(&store);
    let service = EvolutionService::new(&store);
    let request = "CREATE CLASS Sprint/DELETE CLASS Sprint, \
                   OPEN CLASS Sprint/CLOSE CLASS Sprint, \
                   ADD COMPOSITION items TARGET Todo/DELETE COMPOSITION items, \
                   OPEN CLASS Sprint/OPEN CLASS Sprint";

    // WHEN evolving forward, then backward from the new version
    let forward = service
        .evolve_fragment(
            &RequestContext::new(),
            &source.variant_id,
            &source.running_id,
            request,
            false,
        )
        .unwrap();
    let backward = service
        .evolve_fragment(
            &RequestContext::new(),
            &forward.variant_id,
            &forward.running_id,
            request,
            true,
        )
        .unwrap();

    // THEN the structure matches the original and the chain is linked
    assert_eq!(model_digest(&backward.model), model_digest(&source.model));
    assert_eq!(backward.predecessor_id.as_deref(), Some(forward.global_id.as_str()));
}
