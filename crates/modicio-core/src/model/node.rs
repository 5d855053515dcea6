use serde::{Deserialize, Serialize};

use super::annotation::Annotation;
use super::instance::AttributeInstance;
use super::interface::Interface;

/// Class-level property declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub uri: String,
    pub name: String,
    /// Resolved data type ("String", "Integer", "Date", "Default", ...)
    pub d_type: String,
}

impl Attribute {
    pub fn new(uri: impl Into<String>, name: impl Into<String>, d_type: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            d_type: d_type.into(),
        }
    }
}

/// Inheritance edge; `uri` names the parent node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRelation {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRelation {
    pub uri: String,
    pub name: String,
    /// Target node uri
    pub target: String,
    #[serde(default)]
    pub interface: Interface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub uri: String,
    pub role: String,
    /// Target node uri
    pub target: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub interface: Interface,
}

/// Constant value bound to an inherited attribute at this node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concretization {
    pub attribute_instance: AttributeInstance,
}

impl Concretization {
    pub fn new(attribute_uri: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute_instance: AttributeInstance::new(attribute_uri, value),
        }
    }

    pub fn attribute_uri(&self) -> &str {
        &self.attribute_instance.attribute_uri
    }
}

/// Behaviour hook bound to a node, dispatched through the function registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub uri: String,
    /// Registry key of the predefined function
    pub name: String,
    /// "button" scripts return their output; any other type writes it back
    pub action_type: String,
    /// Parameter binding, `{param=AttributeName, ...}`
    pub resolver: String,
    /// Fallback output attribute name
    #[serde(default)]
    pub any_value: String,
}

/// A class of the type graph
///
/// Every edge points at its target by uri; nothing here references another
/// `Node` directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub annotation: Annotation,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub parent_relations: Vec<ParentRelation>,
    #[serde(default)]
    pub associations: Vec<AssociationRelation>,
    #[serde(default)]
    pub compositions: Vec<Composition>,
    #[serde(default)]
    pub concretizations: Vec<Concretization>,
    #[serde(default)]
    pub scripts: Vec<Script>,
}

impl Node {
    pub fn new(uri: impl Into<String>, name: impl Into<String>, is_abstract: bool) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            is_abstract,
            annotation: Annotation::default(),
            attributes: Vec::new(),
            parent_relations: Vec::new(),
            associations: Vec::new(),
            compositions: Vec::new(),
            concretizations: Vec::new(),
            scripts: Vec::new(),
        }
    }

    // ----- attributes -----

    pub fn attribute_by_uri(&self, uri: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.uri == uri)
    }

    pub fn attribute_by_uri_mut(&mut self, uri: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.uri == uri)
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Remove the first attribute named `name` (case-insensitive)
    pub fn remove_attribute_by_name(&mut self, name: &str) -> Option<Attribute> {
        let pos = self
            .attributes
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(pos))
    }

    // ----- parent relations -----

    /// Parent relations behave as a set; returns false for a duplicate
    pub fn add_parent_relation(&mut self, parent_uri: impl Into<String>) -> bool {
        let relation = ParentRelation {
            uri: parent_uri.into(),
        };
        if self.parent_relations.contains(&relation) {
            return false;
        }
        self.parent_relations.push(relation);
        true
    }

    pub fn remove_parent_relation(&mut self, parent_uri: &str) -> bool {
        let before = self.parent_relations.len();
        self.parent_relations
            .retain(|p| !p.uri.eq_ignore_ascii_case(parent_uri));
        before != self.parent_relations.len()
    }

    pub fn parent_uris(&self) -> impl Iterator<Item = &str> {
        self.parent_relations.iter().map(|p| p.uri.as_str())
    }

    pub fn has_parent(&self, parent_uri: &str) -> bool {
        self.parent_relations.iter().any(|p| p.uri == parent_uri)
    }

    // ----- associations -----

    pub fn association_by_uri(&self, uri: &str) -> Option<&AssociationRelation> {
        self.associations.iter().find(|a| a.uri == uri)
    }

    pub fn association_by_uri_mut(&mut self, uri: &str) -> Option<&mut AssociationRelation> {
        self.associations.iter_mut().find(|a| a.uri == uri)
    }

    pub fn association_by_name(&self, name: &str) -> Option<&AssociationRelation> {
        self.associations
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    // ----- compositions -----

    pub fn composition_by_uri(&self, uri: &str) -> Option<&Composition> {
        self.compositions.iter().find(|c| c.uri == uri)
    }

    pub fn composition_by_uri_mut(&mut self, uri: &str) -> Option<&mut Composition> {
        self.compositions.iter_mut().find(|c| c.uri == uri)
    }

    pub fn composition_by_role(&self, role: &str) -> Option<&Composition> {
        self.compositions
            .iter()
            .find(|c| c.role.eq_ignore_ascii_case(role))
    }

    pub fn composition_targets(&self) -> impl Iterator<Item = &str> {
        self.compositions.iter().map(|c| c.target.as_str())
    }

    // ----- concretizations -----

    pub fn concretization_for(&self, attribute_uri: &str) -> Option<&Concretization> {
        self.concretizations
            .iter()
            .find(|c| c.attribute_uri() == attribute_uri)
    }

    /// Bind `attribute_uri` to `value`, replacing an existing binding.
    /// Returns the replaced value.
    pub fn set_concretization(
        &mut self,
        attribute_uri: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        let concretization = Concretization::new(attribute_uri, value);
        match self
            .concretizations
            .iter_mut()
            .find(|c| c.attribute_uri() == concretization.attribute_uri())
        {
            Some(existing) => Some(std::mem::replace(existing, concretization).attribute_instance.value),
            None => {
                self.concretizations.push(concretization);
                None
            }
        }
    }

    pub fn remove_concretization(&mut self, attribute_uri: &str) -> Option<Concretization> {
        let pos = self
            .concretizations
            .iter()
            .position(|c| c.attribute_uri() == attribute_uri)?;
        Some(self.concretizations.remove(pos))
    }

    // ----- scripts -----

    pub fn script_by_name(&self, name: &str) -> Option<&Script> {
        self.scripts.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_relations_are_a_set() {
        let mut node = Node::new("modicio:Task", "Task", false);
        assert!(node.add_parent_relation("modicio:Item"));
        assert!(!node.add_parent_relation("modicio:Item"));
        assert_eq!(node.parent_uris().collect::<Vec<_>>(), vec!["modicio:Item"]);
        assert!(node.remove_parent_relation("MODICIO:ITEM"));
        assert!(node.parent_relations.is_empty());
    }

    #[test]
    fn test_set_concretization_replaces() {
        let mut node = Node::new("modicio:Task", "Task", false);
        assert_eq!(node.set_concretization("modicio:Title", "a"), None);
        assert_eq!(
            node.set_concretization("modicio:Title", "b"),
            Some("a".to_string())
        );
        assert_eq!(node.concretizations.len(), 1);
        assert_eq!(
            node.concretization_for("modicio:Title")
                .map(|c| c.attribute_instance.value.as_str()),
            Some("b")
        );
    }

    #[test]
    fn test_remove_attribute_by_name_is_case_insensitive() {
        let mut node = Node::new("modicio:Task", "Task", false);
        node.attributes
            .push(Attribute::new("modicio:Title", "Title", "String"));
        let removed = node.remove_attribute_by_name("title");
        assert_eq!(removed.map(|a| a.uri), Some("modicio:Title".to_string()));
        assert!(node.attributes.is_empty());
    }
}
