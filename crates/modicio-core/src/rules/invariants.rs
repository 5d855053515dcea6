use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Model, Node};

/// Find nodes that lie on an inheritance cycle
///
/// Returns, for each cycle found, the uri of the node at which it closed.
pub fn find_inheritance_cycles(model: &Model) -> Vec<String> {
    find_cycles_among(model.nodes(), |uri| model.node(uri))
}

/// Cycle search over the parent relations reachable from `starts`
///
/// Three-colour DFS; parent uris that `lookup` does not resolve are
/// treated as leaves.
pub fn find_cycles_among<'a, I, F>(starts: I, lookup: F) -> Vec<String>
where
    I: IntoIterator<Item = &'a Node>,
    F: Fn(&str) -> Option<&'a Node>,
{
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Active,
        Done,
    }

    let mut marks: BTreeMap<&str, Mark> = BTreeMap::new();
    let mut cycles = Vec::new();

    for start in starts {
        if marks.contains_key(start.uri.as_str()) {
            continue;
        }
        // (node, index of next parent to visit)
        let mut stack: Vec<(&Node, usize)> = vec![(start, 0)];
        marks.insert(start.uri.as_str(), Mark::Active);

        while let Some((node, next)) = stack.pop() {
            let parent = node.parent_relations.get(next);
            let Some(parent) = parent else {
                marks.insert(node.uri.as_str(), Mark::Done);
                continue;
            };
            stack.push((node, next + 1));

            match marks.get(parent.uri.as_str()) {
                Some(Mark::Active) => cycles.push(parent.uri.clone()),
                Some(Mark::Done) => {}
                None => {
                    if let Some(parent_node) = lookup(&parent.uri) {
                        marks.insert(parent_node.uri.as_str(), Mark::Active);
                        stack.push((parent_node, 0));
                    }
                }
            }
        }
    }

    cycles
}

/// Find attributes concretized more than once within one closure
///
/// `closure` is a node followed by its ancestors. Returns
/// `(attribute_uri, second_concretizing_node_uri)` pairs.
pub fn find_concretization_conflicts(closure: &[&Node]) -> Vec<(String, String)> {
    let mut bound: BTreeSet<&str> = BTreeSet::new();
    let mut conflicts = Vec::new();
    for node in closure {
        for concretization in &node.concretizations {
            if !bound.insert(concretization.attribute_uri()) {
                conflicts.push((
                    concretization.attribute_uri().to_string(),
                    node.uri.clone(),
                ));
            }
        }
    }
    conflicts
}
