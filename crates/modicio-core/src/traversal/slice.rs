use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{ModicioError, Result};
use crate::model::{Model, Node};
use crate::{log_op_end, log_op_error, log_op_start};

/// Reachability-closed subset of a model rooted at one node
///
/// Borrowed from the model it was cut from. Edge targets that did not
/// resolve in the model are kept in `unresolved` rather than failing the
/// slice.
#[derive(Debug, Clone)]
pub struct Slice<'a> {
    root: &'a str,
    nodes: BTreeMap<&'a str, &'a Node>,
    unresolved: BTreeSet<&'a str>,
}

impl<'a> Slice<'a> {
    pub fn root_uri(&self) -> &'a str {
        self.root
    }

    pub fn root(&self) -> Option<&'a Node> {
        self.nodes.get(self.root).copied()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.nodes.contains_key(uri)
    }

    pub fn get(&self, uri: &str) -> Option<&'a Node> {
        self.nodes.get(uri).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Members in uri order
    pub fn nodes(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.nodes.values().copied()
    }

    pub fn uris(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.nodes.keys().copied()
    }

    /// Parent or composition targets that are missing from the model
    pub fn unresolved(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.unresolved.iter().copied()
    }

    /// Copy the members out into a standalone model
    pub fn to_model(&self) -> Model {
        let mut model = Model::new();
        for node in self.nodes.values() {
            // uris are unique by construction
            let _ = model.insert_node((*node).clone());
        }
        model
    }
}

/// Cut the slice of `model` rooted at `root_uri`.
///
/// Starting from the root, every parent relation target and every
/// composition target of a member is added, transitively. Membership in the
/// accumulated result is the only visited check, so inheritance or
/// composition cycles terminate with each node present once.
///
/// # Errors
///
/// * `RootNotFound` - `root_uri` is not a node of `model`
pub fn slice_deep<'a>(model: &'a Model, root_uri: &str) -> Result<Slice<'a>> {
    log_op_start!("slice_deep", node_uri = root_uri);
    let start = std::time::Instant::now();

    let root = match model.node(root_uri) {
        Some(node) => node,
        None => {
            let err = ModicioError::RootNotFound {
                uri: root_uri.to_string(),
            };
            log_op_error!(
                "slice_deep",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            return Err(err);
        }
    };

    let mut slice = Slice {
        root: root.uri.as_str(),
        nodes: BTreeMap::new(),
        unresolved: BTreeSet::new(),
    };
    slice.nodes.insert(root.uri.as_str(), root);

    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        for target in node.parent_uris().chain(node.composition_targets()) {
            if slice.nodes.contains_key(target) {
                continue;
            }
            match model.node(target) {
                Some(next) => {
                    slice.nodes.insert(next.uri.as_str(), next);
                    pending.push(next);
                }
                None => {
                    if slice.unresolved.insert(target) {
                        tracing::debug!(
                            from = %node.uri,
                            target = %target,
                            "slice edge target not in model"
                        );
                    }
                }
            }
        }
    }

    log_op_end!(
        "slice_deep",
        duration_ms = start.elapsed().as_millis() as u64,
        slice_len = slice.len()
    );
    Ok(slice)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::Composition;

    fn node(uri: &str, parents: &[&str]) -> Node {
        let mut n = Node::new(uri, uri.trim_start_matches("modicio:"), false);
        for p in parents {
            n.add_parent_relation(*p);
        }
        n
    }

    fn compose(mut n: Node, target: &str) -> Node {
        n.compositions.push(Composition {
            uri: format!("{}.part", n.uri),
            role: "part".into(),
            target: target.into(),
            is_public: true,
            interface: Default::default(),
        });
        n
    }

    #[test]
    fn test_root_not_found() {
        let model = Model::new();
        let err = slice_deep(&model, "modicio:Nope").unwrap_err();
        assert!(matches!(err, ModicioError::RootNotFound { .. }));
    }

    #[test]
    fn test_follows_parents_and_compositions_only() {
        let model = Model::from_nodes([
            node("modicio:A", &["modicio:B"]),
            compose(node("modicio:B", &[]), "modicio:C"),
            node("modicio:C", &["modicio:D"]),
            node("modicio:D", &[]),
            node("modicio:Unrelated", &["modicio:A"]),
        ])
        .unwrap();

        let slice = slice_deep(&model, "modicio:A").unwrap();
        let uris: Vec<_> = slice.uris().collect();
        assert_eq!(
            uris,
            vec!["modicio:A", "modicio:B", "modicio:C", "modicio:D"]
        );
        assert_eq!(slice.root_uri(), "modicio:A");
    }

    #[test]
    fn test_cycle_terminates() {
        let model = Model::from_nodes([
            node("modicio:A", &["modicio:B"]),
            node("modicio:B", &["modicio:C"]),
            node("modicio:C", &["modicio:A"]),
        ])
        .unwrap();

        let slice = slice_deep(&model, "modicio:B").unwrap();
        assert_eq!(slice.len(), 3);
    }

    #[test]
    fn test_self_parent_terminates() {
        let model = Model::from_nodes([node("modicio:A", &["modicio:A"])]).unwrap();
        let slice = slice_deep(&model, "modicio:A").unwrap();
        assert_eq!(slice.len(), 1);
    }

    #[test]
    fn test_dangling_target_is_reported() {
        let model = Model::from_nodes([node("modicio:A", &["modicio:Ghost"])]).unwrap();
        let slice = slice_deep(&model, "modicio:A").unwrap();
        assert_eq!(slice.len(), 1);
        assert_eq!(slice.unresolved().collect::<Vec<_>>(), vec!["modicio:Ghost"]);
        assert_eq!(slice.to_model().len(), 1);
    }
}
