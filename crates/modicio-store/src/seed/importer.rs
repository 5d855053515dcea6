//! Seed importer
//!
//! Turns a validated seed into a closed, model-only Fragment of a new
//! variant. Nothing is persisted here; callers hand the Fragment to a store.

#![allow(clippy::result_large_err)]

use std::path::Path;

use modicio_core::rules::validate_model;
use modicio_core::{
    log_op_end, log_op_error, log_op_start, AssociationRelation, Attribute, Composition,
    Delimiter, Fragment, Interface, Model, Node, Point, Script,
};

use crate::errors::{seed_validation, Result};
use crate::seed::format_v0::{SeedNode, SeedV0};
use crate::seed::parser::{parse_seed_file, parse_seed_str, resolve_reference};

/// Parse and import a seed file
pub fn import_seed_file(path: &Path) -> Result<Fragment> {
    log_op_start!("seed_import", path = %path.display());
    let start = std::time::Instant::now();

    let result = parse_seed_file(path).and_then(|seed| build_fragment(&seed));

    match &result {
        Ok(fragment) => log_op_end!(
            "seed_import",
            duration_ms = start.elapsed().as_millis() as u64,
            node_count = fragment.model.len()
        ),
        Err(e) => log_op_error!(
            "seed_import",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        ),
    }
    result
}

/// Parse and import a seed held in memory
pub fn import_seed_str(content: &str) -> Result<Fragment> {
    let seed = parse_seed_str(content)?;
    build_fragment(&seed)
}

/// Build the Fragment a validated seed describes
///
/// The resulting model must be free of inheritance cycles and conflicting
/// concretizations.
pub fn build_fragment(seed: &SeedV0) -> Result<Fragment> {
    let nodes = seed.nodes.iter().map(build_node).collect::<Result<Vec<_>>>()?;
    let model = Model::from_nodes(nodes)?;
    validate_model(&model).map_err(|e| seed_validation(&e.to_string()))?;

    Ok(Fragment::new_variant(seed.variant_name.clone(), model))
}

fn interface_of(delimiters: &Option<Vec<Delimiter>>) -> Interface {
    let mut interface = Interface::new();
    match delimiters {
        Some(delimiters) => {
            for delimiter in delimiters {
                interface.add(delimiter.clone());
            }
        }
        None => {
            interface.add(Delimiter::Point(Point::default()));
        }
    }
    interface
}

fn build_node(seed: &SeedNode) -> Result<Node> {
    let uri = seed
        .uri
        .clone()
        .unwrap_or_else(|| resolve_reference(&seed.name));
    let mut node = Node::new(uri, seed.name.clone(), seed.is_abstract);

    for attribute in &seed.attributes {
        let uri = attribute
            .uri
            .clone()
            .unwrap_or_else(|| resolve_reference(&attribute.name));
        node.attributes
            .push(Attribute::new(uri, attribute.name.clone(), attribute.d_type.clone()));
    }

    for parent in &seed.parents {
        node.add_parent_relation(resolve_reference(parent));
    }

    for association in &seed.associations {
        node.associations.push(AssociationRelation {
            uri: association
                .uri
                .clone()
                .unwrap_or_else(|| resolve_reference(&association.name)),
            name: association.name.clone(),
            target: resolve_reference(&association.target),
            interface: interface_of(&association.interface),
        });
    }

    for composition in &seed.compositions {
        node.compositions.push(Composition {
            uri: composition
                .uri
                .clone()
                .unwrap_or_else(|| resolve_reference(&composition.role)),
            role: composition.role.clone(),
            target: resolve_reference(&composition.target),
            is_public: composition.is_public,
            interface: interface_of(&composition.interface),
        });
    }

    for concretization in &seed.concretizations {
        if concretization.attribute.trim().is_empty() {
            return Err(seed_validation(&format!(
                "Concretization without attribute in node {}",
                seed.name
            )));
        }
        node.set_concretization(
            resolve_reference(&concretization.attribute),
            concretization.value.clone(),
        );
    }

    for script in &seed.scripts {
        node.scripts.push(Script {
            uri: script
                .uri
                .clone()
                .unwrap_or_else(|| resolve_reference(&script.name)),
            name: script.name.clone(),
            action_type: script.action_type.clone(),
            resolver: script.resolver.clone(),
            any_value: script.any_value.clone(),
        });
    }

    Ok(node)
}
