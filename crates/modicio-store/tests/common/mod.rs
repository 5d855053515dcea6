use modicio_core::{Attribute, Fragment, Model, Node};
use modicio_store::{FragmentStore, InMemoryFragmentStore, SqliteFragmentStore};
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Single-node model with a `Title` attribute
#[allow(dead_code)]
pub fn todo_model() -> Model {
    let mut todo = Node::new("modicio:Todo", "Todo", false);
    todo.attributes
        .push(Attribute::new("modicio:Title", "Title", "String"));
    Model::from_nodes([todo]).unwrap()
}

#[allow(dead_code)]
pub fn model_fragment(name: &str) -> Fragment {
    Fragment::new_variant(Some(name.to_string()), todo_model())
}

/// Both store implementations; the TempDir must outlive the SQLite store
#[allow(dead_code)]
pub fn stores() -> (TempDir, Vec<(&'static str, Box<dyn FragmentStore>)>) {
    let dir = TempDir::new().unwrap();
    let sqlite = SqliteFragmentStore::open(dir.path().join("store.db")).unwrap();
    let stores: Vec<(&'static str, Box<dyn FragmentStore>)> = vec![
        ("memory", Box::new(InMemoryFragmentStore::new())),
        ("sqlite", Box::new(sqlite)),
    ];
    (dir, stores)
}
