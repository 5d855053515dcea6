//! Seed parser with validation
//!
//! Parses YAML and validates schema version, node names and uri uniqueness

#![allow(clippy::result_large_err)]

use crate::errors::{seed_validation, Result};
use crate::seed::format_v0::SeedV0;
use modicio_core::mint_uri;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path) -> Result<SeedV0> {
    let content = fs::read_to_string(path)
        .map_err(|e| seed_validation(&format!("Failed to read seed file: {}", e)))?;

    parse_seed_str(&content)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str) -> Result<SeedV0> {
    let seed: SeedV0 = serde_yaml::from_str(content)
        .map_err(|e| seed_validation(&format!("YAML parse error: {}", e)))?;

    validate_seed(&seed)?;

    Ok(seed)
}

/// Uri a seed reference stands for: full uris pass through, names are minted
pub fn resolve_reference(reference: &str) -> String {
    if reference.contains(':') {
        reference.to_string()
    } else {
        mint_uri(reference)
    }
}

fn validate_seed(seed: &SeedV0) -> Result<()> {
    if seed.schema_version != 0 {
        return Err(seed_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            seed.schema_version
        )));
    }

    let mut uris = HashSet::new();
    for node in &seed.nodes {
        if node.name.trim().is_empty() {
            return Err(seed_validation("Node name must not be empty"));
        }
        let uri = node
            .uri
            .clone()
            .unwrap_or_else(|| resolve_reference(&node.name));
        if !uris.insert(uri.clone()) {
            return Err(seed_validation(&format!("Duplicate node uri: {}", uri)));
        }

        let mut attribute_names = HashSet::new();
        for attribute in &node.attributes {
            if attribute.name.trim().is_empty() {
                return Err(seed_validation(&format!(
                    "Attribute name must not be empty in node {}",
                    node.name
                )));
            }
            if !attribute_names.insert(attribute.name.as_str()) {
                return Err(seed_validation(&format!(
                    "Duplicate attribute {} in node {}",
                    attribute.name, node.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("Todo"), "modicio:Todo");
        assert_eq!(resolve_reference("ext:Todo"), "ext:Todo");
    }

    #[test]
    fn test_wrong_schema_version_rejected() {
        let err = parse_seed_str("schema_version: 1\nnodes: []\n").unwrap_err();
        assert!(err.message().contains("schema_version"));
    }
}
