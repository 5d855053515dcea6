//! Structural digest of a type graph
//!
//! Two models share a digest iff they declare the same nodes with the same
//! children, regardless of annotations and of the order of any collection.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::model::{Interface, Model, Node};

/// SHA-256 hex of the canonical view of `model`
pub fn model_digest(model: &Model) -> String {
    let view = canonical_view(model);
    let mut hasher = Sha256::new();
    hasher.update(view.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Canonical JSON view: annotations dropped, every collection sorted
pub fn canonical_view(model: &Model) -> Value {
    // Model iterates in uri order already
    Value::Array(model.nodes().map(node_view).collect())
}

fn sorted(mut values: Vec<Value>) -> Value {
    values.sort_by_cached_key(Value::to_string);
    Value::Array(values)
}

fn interface_view(interface: &Interface) -> Value {
    sorted(
        interface
            .delimiters
            .iter()
            .filter_map(|d| serde_json::to_value(d).ok())
            .collect(),
    )
}

fn node_view(node: &Node) -> Value {
    json!({
        "uri": node.uri,
        "name": node.name,
        "is_abstract": node.is_abstract,
        "attributes": sorted(node.attributes.iter().map(|a| json!({
            "uri": a.uri,
            "name": a.name,
            "d_type": a.d_type,
        })).collect()),
        "parents": sorted(node.parent_relations.iter().map(|p| json!(p.uri)).collect()),
        "associations": sorted(node.associations.iter().map(|a| json!({
            "uri": a.uri,
            "name": a.name,
            "target": a.target,
            "interface": interface_view(&a.interface),
        })).collect()),
        "compositions": sorted(node.compositions.iter().map(|c| json!({
            "uri": c.uri,
            "role": c.role,
            "target": c.target,
            "is_public": c.is_public,
            "interface": interface_view(&c.interface),
        })).collect()),
        "concretizations": sorted(node.concretizations.iter().map(|c| json!({
            "attribute_uri": c.attribute_instance.attribute_uri,
            "value": c.attribute_instance.value,
        })).collect()),
        "scripts": sorted(node.scripts.iter().map(|s| json!({
            "uri": s.uri,
            "name": s.name,
            "action_type": s.action_type,
            "resolver": s.resolver,
            "any_value": s.any_value,
        })).collect()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::Attribute;

    fn todo(attrs: &[&str]) -> Node {
        let mut node = Node::new("modicio:Todo", "Todo", false);
        for name in attrs {
            node.attributes
                .push(Attribute::new(format!("modicio:{}", name), *name, "String"));
        }
        node
    }

    #[test]
    fn test_digest_ignores_order_and_annotations() {
        let a = Model::from_nodes([todo(&["Title", "Due"])]).unwrap();
        let mut b = Model::from_nodes([todo(&["Due", "Title"])]).unwrap();
        b.nodes_mut().for_each(|n| n.annotation.bump_version());
        assert_eq!(model_digest(&a), model_digest(&b));
        assert_eq!(model_digest(&a).len(), 64);
    }

    #[test]
    fn test_digest_sees_structural_change() {
        let a = Model::from_nodes([todo(&["Title"])]).unwrap();
        let b = Model::from_nodes([todo(&["Headline"])]).unwrap();
        assert_ne!(model_digest(&a), model_digest(&b));
        assert_ne!(model_digest(&a), model_digest(&Model::new()));
    }
}
