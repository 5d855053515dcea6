use modicio_core::{
    AssociationRelation, Attribute, Composition, Delimiter, Fragment, Interface, Model, Node,
    Point, Script,
};
use modicio_core_types::RequestContext;
use modicio_engine::{MetadataService, ModelService};
use modicio_store::FragmentStore;

/// Todo (hours bookkeeping plus a script) and Project (related todos and
/// public tasks)
#[allow(dead_code)]
pub fn todo_project_model() -> Model {
    let mut todo = Node::new("modicio:Todo", "Todo", false);
    for (name, d_type) in [
        ("Title", "String"),
        ("TotalHours", "Integer"),
        ("HoursWorked", "Integer"),
        ("RemainingHours", "Integer"),
    ] {
        todo.attributes
            .push(Attribute::new(format!("modicio:{}", name), name, d_type));
    }
    todo.scripts.push(Script {
        uri: "modicio:remaining".to_string(),
        name: "calculateRemainingHours".to_string(),
        action_type: "write".to_string(),
        resolver: "{totalHours=TotalHours, hoursWorked=HoursWorked}".to_string(),
        any_value: String::new(),
    });
    todo.scripts.push(Script {
        uri: "modicio:reset".to_string(),
        name: "resetInt".to_string(),
        action_type: "button".to_string(),
        resolver: "{}".to_string(),
        any_value: String::new(),
    });

    let mut project = Node::new("modicio:Project", "Project", false);
    project
        .attributes
        .push(Attribute::new("modicio:Description", "Description", "String"));
    let mut any_variant = Interface::new();
    any_variant.add(Delimiter::Point(Point::default()));
    project.associations.push(AssociationRelation {
        uri: "modicio:Related Todos".to_string(),
        name: "Related Todos".to_string(),
        target: "modicio:Todo".to_string(),
        interface: any_variant,
    });
    project.compositions.push(Composition {
        uri: "modicio:tasks".to_string(),
        role: "tasks".to_string(),
        target: "modicio:Todo".to_string(),
        is_public: true,
        interface: Interface::new(),
    });

    Model::from_nodes([todo, project]).unwrap()
}

/// Push the Todo/Project model as a new variant
#[allow(dead_code)]
pub fn push_model(store: &dyn FragmentStore) -> Fragment {
    ModelService::new(store)
        .push_full_model(
            &RequestContext::new(),
            Fragment::new_variant(None, todo_project_model()),
            None,
            Some("todo-app"),
            false,
        )
        .unwrap()
}

/// Push the model and make it the reference
#[allow(dead_code)]
pub fn push_reference(store: &dyn FragmentStore) -> Fragment {
    let pushed = push_model(store);
    MetadataService::new(store)
        .set_reference_fragment(&RequestContext::new(), &pushed.variant_id, &pushed.running_id)
        .unwrap()
}
