use modicio_core::{
    AssociationRelation, Attribute, Delimiter, Fragment, Interface, Model, Node, Point,
};

/// `Todo` with `Title` and `Due`
#[allow(dead_code)]
pub fn todo_node() -> Node {
    let mut todo = Node::new("modicio:Todo", "Todo", false);
    todo.attributes
        .push(Attribute::new("modicio:Title", "Title", "String"));
    todo.attributes
        .push(Attribute::new("modicio:Due", "Due", "Date"));
    todo
}

/// `Project` with `Description` and an association `Related Todos` to
/// `Todo`, compatible with any variant
#[allow(dead_code)]
pub fn project_node() -> Node {
    let mut project = Node::new("modicio:Project", "Project", false);
    project
        .attributes
        .push(Attribute::new("modicio:Description", "Description", "String"));
    let mut interface = Interface::new();
    interface.add(Delimiter::Point(Point::default()));
    project.associations.push(AssociationRelation {
        uri: "modicio:Related Todos".to_string(),
        name: "Related Todos".to_string(),
        target: "modicio:Todo".to_string(),
        interface,
    });
    project
}

/// The two-node Todo/Project model
#[allow(dead_code)]
pub fn todo_project_model() -> Model {
    Model::from_nodes([todo_node(), project_node()]).unwrap()
}

/// Model-only fragment of a fresh variant
#[allow(dead_code)]
pub fn fragment_of(model: Model) -> Fragment {
    Fragment::new_variant(Some("test".to_string()), model)
}

/// Node names of a model, sorted
#[allow(dead_code)]
pub fn node_names(model: &Model) -> Vec<String> {
    let mut names: Vec<String> = model.nodes().map(|n| n.name.clone()).collect();
    names.sort();
    names
}
