use std::collections::BTreeSet;

use super::slice::Slice;
use crate::errors::Result;
use crate::model::{Model, Node};

/// Inheritance closure of `root` restricted to `slice`
///
/// Returns `root` first, followed by its transitive parents in
/// breadth-first discovery order, each once. Parent targets outside the
/// slice are skipped.
pub fn inheritance_closure<'a>(root: &'a Node, slice: &Slice<'a>) -> Vec<&'a Node> {
    closure_with(root, |uri| slice.get(uri))
}

/// Inheritance closure of the node at `uri` over a whole model
///
/// # Errors
///
/// * `NodeNotFound` - `uri` is not a node of `model`
pub fn model_closure<'a>(model: &'a Model, uri: &str) -> Result<Vec<&'a Node>> {
    let root = model.require_node(uri)?;
    Ok(closure_with(root, |parent| model.node(parent)))
}

fn closure_with<'a, F>(root: &'a Node, lookup: F) -> Vec<&'a Node>
where
    F: Fn(&str) -> Option<&'a Node>,
{
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut closure = vec![root];
    seen.insert(root.uri.as_str());

    let mut cursor = 0;
    while cursor < closure.len() {
        let current = closure[cursor];
        cursor += 1;
        for parent_uri in current.parent_uris() {
            if seen.contains(parent_uri) {
                continue;
            }
            if let Some(parent) = lookup(parent_uri) {
                seen.insert(parent.uri.as_str());
                closure.push(parent);
            }
        }
    }
    closure
}
