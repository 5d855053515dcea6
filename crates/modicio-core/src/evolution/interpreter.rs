//! Statement execution against a model
//!
//! The interpreter keeps four selection slots. `OPEN` statements fill
//! them, `CLOSE` and `DELETE` statements clear them, and every editing
//! statement acts on the slot it needs, failing with `SelectionNotOpen`
//! when that slot is empty.

use chrono::{DateTime, Utc};

use super::statement::{Slot, Statement};
use crate::errors::{ModicioError, Result};
use crate::model::{
    mint_uri, Annotation, AssociationRelation, Attribute, Composition, Delimiter, Interface,
    LeftOpen, Model, Node, Point, Region, RightOpen,
};

/// A child element of a node, addressed by its owner and its own uri
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub node_uri: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvolutionState {
    pub node: Option<String>,
    pub attribute: Option<ElementRef>,
    pub association: Option<ElementRef>,
    pub composition: Option<ElementRef>,
}

impl EvolutionState {
    fn clear_node(&mut self, node_uri: &str) {
        if self.node.as_deref() == Some(node_uri) {
            self.node = None;
        }
        for slot in [
            &mut self.attribute,
            &mut self.association,
            &mut self.composition,
        ] {
            if slot.as_ref().is_some_and(|e| e.node_uri == node_uri) {
                *slot = None;
            }
        }
    }
}

/// Executes statements against one model on behalf of one variant
pub struct Interpreter<'m> {
    model: &'m mut Model,
    variant_id: String,
    variant_time: DateTime<Utc>,
    state: EvolutionState,
}

fn not_open(raw: &str, slot: Slot) -> ModicioError {
    ModicioError::SelectionNotOpen {
        statement: raw.to_string(),
        slot: slot.as_str().to_string(),
    }
}

impl<'m> Interpreter<'m> {
    pub fn new(model: &'m mut Model, variant_id: impl Into<String>, variant_time: DateTime<Utc>) -> Self {
        Self {
            model,
            variant_id: variant_id.into(),
            variant_time,
            state: EvolutionState::default(),
        }
    }

    pub fn state(&self) -> &EvolutionState {
        &self.state
    }

    fn selected_node_uri(&self, raw: &str) -> Result<String> {
        self.state.node.clone().ok_or_else(|| not_open(raw, Slot::Class))
    }

    /// The selected node, with a fresh version stamped on it
    fn touch_selected(&mut self, raw: &str) -> Result<&mut Node> {
        let uri = self.selected_node_uri(raw)?;
        self.touch(&uri)
    }

    fn touch(&mut self, node_uri: &str) -> Result<&mut Node> {
        let node = self.model.require_node_mut(node_uri)?;
        node.annotation.bump_version();
        Ok(node)
    }

    fn selected(&self, raw: &str, slot: Slot) -> Result<ElementRef> {
        let selected = match slot {
            Slot::Attribute => &self.state.attribute,
            Slot::Association => &self.state.association,
            Slot::Composition => &self.state.composition,
            Slot::Class => {
                return self.selected_node_uri(raw).map(|uri| ElementRef {
                    node_uri: uri.clone(),
                    uri,
                })
            }
        };
        selected.clone().ok_or_else(|| not_open(raw, slot))
    }

    /// Uri of the class a statement refers to by name
    fn resolve_target(&self, name: &str) -> Result<String> {
        self.model
            .resolve_class(name)
            .map(|n| n.uri.clone())
            .ok_or_else(|| ModicioError::TargetNotFound {
                name: name.to_string(),
            })
    }

    fn add_delimiter(&mut self, raw: &str, delimiter: Delimiter) -> Result<String> {
        let selected = self.selected(raw, Slot::Association)?;
        let node = self.touch(&selected.node_uri)?;
        let association = node.association_by_uri_mut(&selected.uri).ok_or_else(|| {
            ModicioError::AssociationNotFound {
                name: selected.uri.clone(),
            }
        })?;
        association.interface.add(delimiter);
        Ok(selected.uri)
    }

    fn edit_attribute<F>(&mut self, raw: &str, edit: F) -> Result<String>
    where
        F: FnOnce(&mut Node, &str) -> Result<String>,
    {
        let selected = self.selected(raw, Slot::Attribute)?;
        let node = self.touch(&selected.node_uri)?;
        if node.attribute_by_uri(&selected.uri).is_none() {
            return Err(ModicioError::AttributeNotFound { name: selected.uri });
        }
        edit(node, &selected.uri)
    }

    /// Execute one statement; returns the uri of the element it acted on
    /// (empty when there is none)
    ///
    /// # Errors
    /// * the named not-found errors when a referenced element is missing
    /// * `SelectionNotOpen` - the statement needs a slot that is empty
    /// * `NodeAlreadyExists` / `MalformedArgument` - duplicate definitions
    pub fn execute(&mut self, raw: &str, statement: Statement) -> Result<String> {
        match statement {
            Statement::CreateClass { name, is_abstract } => {
                let mut node = Node::new(mint_uri(&name), name, is_abstract);
                node.annotation = Annotation::in_variant(self.variant_id.clone(), self.variant_time);
                let uri = node.uri.clone();
                self.model.insert_node(node)?;
                Ok(uri)
            }
            Statement::DeleteClass { name } => {
                let uri = self
                    .model
                    .resolve_class(&name)
                    .map(|n| n.uri.clone())
                    .ok_or(ModicioError::ClassNotFound { name })?;
                self.model.remove_node(&uri);
                self.state.clear_node(&uri);
                Ok(uri)
            }
            Statement::OpenClass { name } => {
                let uri = self
                    .model
                    .resolve_class(&name)
                    .map(|n| n.uri.clone())
                    .ok_or(ModicioError::ClassNotFound { name })?;
                self.state.node = Some(uri.clone());
                Ok(uri)
            }
            Statement::DeleteAttribute { name } => {
                let node = self.touch_selected(raw)?;
                let removed = node
                    .remove_attribute_by_name(&name)
                    .ok_or(ModicioError::AttributeNotFound { name })?;
                node.remove_concretization(&removed.uri);
                let node_uri = node.uri.clone();
                if self
                    .state
                    .attribute
                    .as_ref()
                    .is_some_and(|a| a.node_uri == node_uri && a.uri == removed.uri)
                {
                    self.state.attribute = None;
                }
                Ok(removed.uri)
            }
            Statement::AddAttribute { name } => {
                let uri = mint_uri(&name);
                let node = self.touch_selected(raw)?;
                if node.attribute_by_uri(&uri).is_some() {
                    return Err(ModicioError::MalformedArgument {
                        statement: raw.to_string(),
                        reason: format!("attribute {} already declared on {}", uri, node.uri),
                    });
                }
                node.attributes.push(Attribute::new(uri.clone(), name, ""));
                Ok(uri)
            }
            Statement::OpenAttribute { name } => {
                let node_uri = self.selected_node_uri(raw)?;
                let node = self.model.require_node(&node_uri)?;
                let uri = node
                    .attribute_by_name(&name)
                    .map(|a| a.uri.clone())
                    .ok_or(ModicioError::AttributeNotFound { name })?;
                self.state.attribute = Some(ElementRef {
                    node_uri,
                    uri: uri.clone(),
                });
                Ok(uri)
            }
            Statement::SetType { d_type } => self.edit_attribute(raw, |node, uri| {
                if let Some(attribute) = node.attribute_by_uri_mut(uri) {
                    attribute.d_type = d_type.to_string();
                }
                Ok(uri.to_string())
            }),
            Statement::AddAssociation { name, target } => {
                let target = self.resolve_target(&target)?;
                let uri = mint_uri(&name);
                let node = self.touch_selected(raw)?;
                if node.association_by_uri(&uri).is_some() {
                    return Err(ModicioError::MalformedArgument {
                        statement: raw.to_string(),
                        reason: format!("association {} already declared on {}", uri, node.uri),
                    });
                }
                node.associations.push(AssociationRelation {
                    uri: uri.clone(),
                    name,
                    target,
                    interface: Interface::new(),
                });
                Ok(uri)
            }
            Statement::DeleteAssociation { name } => {
                let node = self.touch_selected(raw)?;
                let pos = node
                    .associations
                    .iter()
                    .position(|a| a.name.eq_ignore_ascii_case(&name))
                    .ok_or(ModicioError::AssociationNotFound { name })?;
                let removed = node.associations.remove(pos);
                self.state.association = None;
                Ok(removed.uri)
            }
            Statement::OpenAssociation { name } => {
                let node_uri = self.selected_node_uri(raw)?;
                let node = self.model.require_node(&node_uri)?;
                let uri = node
                    .association_by_name(&name)
                    .map(|a| a.uri.clone())
                    .ok_or(ModicioError::AssociationNotFound { name })?;
                self.state.association = Some(ElementRef {
                    node_uri,
                    uri: uri.clone(),
                });
                Ok(uri)
            }
            Statement::CompatibleWithVersion { version_time } => self.add_delimiter(
                raw,
                Delimiter::Point(Point {
                    version_time: Some(version_time),
                    ..Point::default()
                }),
            ),
            Statement::VersionRange { from, to } => self.add_delimiter(
                raw,
                Delimiter::Region(Region {
                    left_border_version_time: from,
                    right_border_version_time: to,
                    left_border_version_id: None,
                    right_border_version_id: None,
                }),
            ),
            Statement::CompatibleWithVariant { variant_time } => self.add_delimiter(
                raw,
                Delimiter::Point(Point {
                    variant_time: Some(variant_time),
                    ..Point::default()
                }),
            ),
            Statement::VersionUpTo { border } => self.add_delimiter(
                raw,
                Delimiter::LeftOpen(LeftOpen {
                    border_version_time: border,
                    border_version_id: None,
                }),
            ),
            Statement::VersionStartingFrom { border } => self.add_delimiter(
                raw,
                Delimiter::RightOpen(RightOpen {
                    border_version_time: border,
                    border_version_id: None,
                }),
            ),
            Statement::AddParentRelation { target } => {
                let parent = self.resolve_target(&target)?;
                let node = self.touch_selected(raw)?;
                node.add_parent_relation(parent.clone());
                Ok(parent)
            }
            Statement::DeleteParentRelation { target } => {
                let resolved = self
                    .model
                    .resolve_class(&target)
                    .map(|n| n.uri.clone())
                    .unwrap_or_else(|| mint_uri(&target));
                let node = self.touch_selected(raw)?;
                if node.remove_parent_relation(&resolved) || node.remove_parent_relation(&mint_uri(&target)) {
                    Ok(resolved)
                } else {
                    Err(ModicioError::ParentRelationNotFound { name: target })
                }
            }
            Statement::DeleteComposition { name } => {
                let minted = mint_uri(&name);
                let node = self.touch_selected(raw)?;
                let pos = node
                    .compositions
                    .iter()
                    .position(|c| c.uri.eq_ignore_ascii_case(&minted) || c.role.eq_ignore_ascii_case(&name))
                    .ok_or(ModicioError::CompositionNotFound { name })?;
                let removed = node.compositions.remove(pos);
                self.state.composition = None;
                Ok(removed.uri)
            }
            Statement::AddComposition { role, target } => {
                let target = self.resolve_target(&target)?;
                let uri = mint_uri(&role);
                let node = self.touch_selected(raw)?;
                if node.composition_by_uri(&uri).is_some() {
                    return Err(ModicioError::MalformedArgument {
                        statement: raw.to_string(),
                        reason: format!("composition {} already declared on {}", uri, node.uri),
                    });
                }
                node.compositions.push(Composition {
                    uri: uri.clone(),
                    role,
                    target,
                    is_public: false,
                    interface: Interface::new(),
                });
                let node_uri = node.uri.clone();
                self.state.composition = Some(ElementRef {
                    node_uri,
                    uri: uri.clone(),
                });
                Ok(uri)
            }
            Statement::MakeComposition { public } => {
                let selected = self.selected(raw, Slot::Composition)?;
                let node = self.touch(&selected.node_uri)?;
                let composition = node.composition_by_uri_mut(&selected.uri).ok_or_else(|| {
                    ModicioError::CompositionNotFound {
                        name: selected.uri.clone(),
                    }
                })?;
                composition.is_public = public;
                Ok(selected.uri)
            }
            Statement::OpenComposition { role } => {
                let node_uri = self.selected_node_uri(raw)?;
                let node = self.model.require_node(&node_uri)?;
                let uri = node
                    .composition_by_role(&role)
                    .map(|c| c.uri.clone())
                    .ok_or(ModicioError::CompositionNotFound { name: role })?;
                self.state.composition = Some(ElementRef {
                    node_uri,
                    uri: uri.clone(),
                });
                Ok(uri)
            }
            Statement::ChangeAttributeName { name } => self.edit_attribute(raw, |node, uri| {
                if let Some(attribute) = node.attribute_by_uri_mut(uri) {
                    attribute.name = name;
                }
                Ok(uri.to_string())
            }),
            Statement::ChangeAttributeUri { uri: new_uri } => {
                let renamed = new_uri.clone();
                let result = self.edit_attribute(raw, |node, uri| {
                    if uri != new_uri && node.attribute_by_uri(&new_uri).is_some() {
                        return Err(ModicioError::MalformedArgument {
                            statement: raw.to_string(),
                            reason: format!("attribute {} already declared on {}", new_uri, node.uri),
                        });
                    }
                    if let Some(attribute) = node.attribute_by_uri_mut(uri) {
                        attribute.uri = new_uri.clone();
                    }
                    if let Some(value) = node.remove_concretization(uri) {
                        node.set_concretization(new_uri.clone(), value.attribute_instance.value);
                    }
                    Ok(new_uri)
                })?;
                if let Some(selected) = self.state.attribute.as_mut() {
                    selected.uri = renamed;
                }
                Ok(result)
            }
            Statement::SetAttributeValue { value } => {
                let attribute = self.selected(raw, Slot::Attribute)?;
                let node = self.touch_selected(raw)?;
                node.set_concretization(attribute.uri.clone(), value);
                Ok(attribute.uri)
            }
            Statement::Close { slot, .. } => {
                let closed = match slot {
                    Slot::Class => self.state.node.take(),
                    Slot::Attribute => self.state.attribute.take().map(|e| e.uri),
                    Slot::Association => self.state.association.take().map(|e| e.uri),
                    Slot::Composition => self.state.composition.take().map(|e| e.uri),
                };
                Ok(closed.unwrap_or_default())
            }
        }
    }
}
