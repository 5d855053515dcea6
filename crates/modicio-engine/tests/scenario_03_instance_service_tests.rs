//! Scenario 3: instances of the reference model

mod common;

use common::push_reference;
use modicio_core::{Accessor, ExErrorKind};
use modicio_core_types::RequestContext;
use modicio_engine::InstanceService;
use modicio_store::{FragmentStore, InMemoryFragmentStore, InstanceQuery};

#[test]
fn test_scenario_03_reference_required() {
    let store = InMemoryFragmentStore::new();
    let err = InstanceService::new(&store)
        .create_instance(&RequestContext::new(), "modicio:Todo", "t", "inst:t")
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.message(), "Undefined reference model");
}

#[test]
fn test_scenario_03_create_and_edit_instance() {
    // GIVEN a reference model
    let store = InMemoryFragmentStore::new();
    let reference = push_reference(&store);
    let service = InstanceService::new(&store);
    let ctx = RequestContext::new();

    // WHEN instantiating Todo
    let created = service
        .create_instance(&ctx, "modicio:Todo", "laundry", "inst:laundry")
        .unwrap();

    // THEN the instance lives at the reference's coordinates
    assert_eq!(created.variant_id, reference.variant_id);
    assert_eq!(created.running_id, reference.running_id);
    assert_eq!(created.predecessor_id.as_deref(), Some(reference.global_id.as_str()));
    assert!(created.open);
    assert!(!created.is_reference);

    // WHEN setting attributes
    let edited = service
        .set_attributes(
            &ctx,
            created.data_id.unwrap(),
            &[("Title".to_string(), "Do laundry".to_string())],
        )
        .unwrap();

    // THEN a new snapshot carries the value and links to the old one
    assert_ne!(edited.data_id, created.data_id);
    assert_eq!(edited.predecessor_id.as_deref(), Some(created.global_id.as_str()));
    let instance = edited.instance.as_ref().unwrap();
    let accessor = Accessor::for_object(&edited.model, instance, "modicio:Todo").unwrap();
    assert_eq!(accessor.deep_value_by_name("Title"), Some("Do laundry"));

    // AND the previous snapshot is unchanged
    let old = service.get_instance(&ctx, created.data_id.unwrap()).unwrap();
    let old_instance = old.instance.as_ref().unwrap();
    let old_accessor = Accessor::for_object(&old.model, old_instance, "modicio:Todo").unwrap();
    assert_eq!(old_accessor.deep_value_by_name("Title"), Some(""));
}

#[test]
fn test_scenario_03_unknown_attribute_persists_nothing() {
    let store = InMemoryFragmentStore::new();
    push_reference(&store);
    let service = InstanceService::new(&store);
    let ctx = RequestContext::new();
    let created = service
        .create_instance(&ctx, "modicio:Todo", "t", "inst:t")
        .unwrap();
    let before = store.len().unwrap();

    let err = service
        .set_attributes(
            &ctx,
            created.data_id.unwrap(),
            &[
                ("Title".to_string(), "ok".to_string()),
                ("Colour".to_string(), "red".to_string()),
            ],
        )
        .unwrap_err();

    assert_eq!(err.message(), "Attribute does not exist!");
    assert_eq!(store.len().unwrap(), before);
}

#[test]
fn test_scenario_03_associations_between_instances() {
    // GIVEN a Project and a Todo instance
    let store = InMemoryFragmentStore::new();
    push_reference(&store);
    let service = InstanceService::new(&store);
    let ctx = RequestContext::new();
    let project = service
        .create_instance(&ctx, "modicio:Project", "home", "inst:home")
        .unwrap();
    let todo = service
        .create_instance(&ctx, "modicio:Todo", "laundry", "inst:laundry")
        .unwrap();

    // WHEN linking the Todo as a related todo
    let linked = service
        .add_association(
            &ctx,
            project.data_id.unwrap(),
            "modicio:Project",
            "modicio:Related Todos",
            todo.data_id.unwrap(),
        )
        .unwrap();

    // THEN the link is stored
    let root = linked.instance.as_ref().unwrap().root_object().unwrap();
    assert_eq!(root.association_instances.len(), 1);
    assert_eq!(root.association_instances[0].target_instance_uri, "inst:laundry");

    // AND linking a Project as a todo is refused
    let err = service
        .add_association(
            &ctx,
            linked.data_id.unwrap(),
            "modicio:Project",
            "modicio:Related Todos",
            project.data_id.unwrap(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvariantViolation);

    // WHEN removing the link
    let unlinked = service
        .remove_association(
            &ctx,
            linked.data_id.unwrap(),
            "modicio:Project",
            "modicio:Related Todos",
            "inst:laundry",
        )
        .unwrap();

    // THEN it is gone
    let root = unlinked.instance.as_ref().unwrap().root_object().unwrap();
    assert!(root.association_instances.is_empty());
}

#[test]
fn test_scenario_03_composites_and_lookup() {
    // GIVEN a Project instance
    let store = InMemoryFragmentStore::new();
    push_reference(&store);
    let service = InstanceService::new(&store);
    let ctx = RequestContext::new();
    let project = service
        .create_instance(&ctx, "modicio:Project", "home", "inst:home")
        .unwrap();

    // WHEN adding a public task composite
    let with_task = service
        .create_composite(
            &ctx,
            project.data_id.unwrap(),
            "modicio:Project",
            "modicio:tasks",
            "t1",
            "inst:t1",
        )
        .unwrap();

    // THEN it shows in the header
    assert_eq!(with_task.instance.as_ref().unwrap().header.elements.len(), 1);

    // AND lookup returns only the latest snapshot of the project
    let found = service
        .find_instances(
            &ctx,
            &InstanceQuery {
                type_pattern: Some("project".to_string()),
                ..InstanceQuery::default()
            },
        )
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].data_id, with_task.data_id);

    // WHEN removing the composite
    let without = service
        .remove_composite(&ctx, with_task.data_id.unwrap(), "inst:t1")
        .unwrap();

    // THEN the header is empty again
    assert!(without.instance.as_ref().unwrap().header.elements.is_empty());
}

#[test]
fn test_scenario_03_delete_instance() {
    let store = InMemoryFragmentStore::new();
    let reference = push_reference(&store);
    let service = InstanceService::new(&store);
    let ctx = RequestContext::new();
    let created = service
        .create_instance(&ctx, "modicio:Todo", "t", "inst:t")
        .unwrap();

    assert!(service
        .delete_instance(&ctx, created.data_id.unwrap())
        .unwrap());
    assert!(service.get_instance(&ctx, created.data_id.unwrap()).is_err());

    // A model fragment is not an instance and is not deleted
    let err = service
        .delete_instance(&ctx, reference.data_id.unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert!(store
        .fetch_by_data_id(reference.data_id.unwrap())
        .unwrap()
        .is_some());
}
