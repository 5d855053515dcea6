//! Seed Format v0 schema
//!
//! Defines the YAML structure of an initial model

use modicio_core::Delimiter;
use serde::{Deserialize, Serialize};

/// Top-level seed file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    /// Name of the variant the seed becomes
    #[serde(default)]
    pub variant_name: Option<String>,

    pub nodes: Vec<SeedNode>,
}

/// Node definition in seed
///
/// Node references (`parents`, `target`) take either a full uri or a bare
/// class name, which is minted into a uri.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedNode {
    /// Minted from `name` when absent
    #[serde(default)]
    pub uri: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub attributes: Vec<SeedAttribute>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub associations: Vec<SeedAssociation>,
    #[serde(default)]
    pub compositions: Vec<SeedComposition>,
    #[serde(default)]
    pub concretizations: Vec<SeedConcretization>,
    #[serde(default)]
    pub scripts: Vec<SeedScript>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAttribute {
    #[serde(default)]
    pub uri: Option<String>,
    pub name: String,
    #[serde(default)]
    pub d_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAssociation {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    pub target: String,
    /// Omitted means compatible with any target; `[]` means none
    #[serde(default)]
    pub interface: Option<Vec<Delimiter>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedComposition {
    pub role: String,
    #[serde(default)]
    pub uri: Option<String>,
    pub target: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub interface: Option<Vec<Delimiter>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConcretization {
    /// Uri or name of the inherited attribute
    pub attribute: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedScript {
    #[serde(default)]
    pub uri: Option<String>,
    pub name: String,
    pub action_type: String,
    #[serde(default)]
    pub resolver: String,
    #[serde(default)]
    pub any_value: String,
}
