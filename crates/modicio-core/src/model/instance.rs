use serde::{Deserialize, Serialize};

/// Value slot of one attribute on one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInstance {
    pub attribute_uri: String,
    #[serde(default)]
    pub value: String,
}

impl AttributeInstance {
    pub fn new(attribute_uri: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute_uri: attribute_uri.into(),
            value: value.into(),
        }
    }
}

/// Link from an object to another instance along an association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationInstance {
    pub association_uri: String,
    pub target_instance_uri: String,
}

/// Composite sub-instance owned by an object
///
/// Holds the composite's own objects, one per node in the inheritance
/// closure of `model_root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionInstance {
    pub name: String,
    pub model_root: String,
    pub uri: String,
    pub composition_uri: String,
    #[serde(default)]
    pub objects: Vec<IObject>,
}

impl CompositionInstance {
    pub fn root_object(&self) -> Option<&IObject> {
        self.objects.iter().find(|o| o.instance_of == self.model_root)
    }
}

/// One instantiated object, standing for one node of a closure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IObject {
    /// Uri of the node this object instantiates
    pub instance_of: String,
    #[serde(default)]
    pub attribute_instances: Vec<AttributeInstance>,
    #[serde(default)]
    pub association_instances: Vec<AssociationInstance>,
    #[serde(default)]
    pub composition_instances: Vec<CompositionInstance>,
}

impl IObject {
    pub fn new(instance_of: impl Into<String>) -> Self {
        Self {
            instance_of: instance_of.into(),
            attribute_instances: Vec::new(),
            association_instances: Vec::new(),
            composition_instances: Vec::new(),
        }
    }

    pub fn attribute(&self, attribute_uri: &str) -> Option<&AttributeInstance> {
        self.attribute_instances
            .iter()
            .find(|a| a.attribute_uri == attribute_uri)
    }

    pub fn attribute_mut(&mut self, attribute_uri: &str) -> Option<&mut AttributeInstance> {
        self.attribute_instances
            .iter_mut()
            .find(|a| a.attribute_uri == attribute_uri)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderElement {
    pub composite_node_uri: String,
    pub composite_instance_uri: String,
}

/// Publicly visible composites of an instance
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub elements: Vec<HeaderElement>,
}

/// Deep instantiation of `model_root`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub model_root: String,
    pub uri: String,
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub objects: Vec<IObject>,
}

impl Instance {
    pub fn new(
        name: impl Into<String>,
        model_root: impl Into<String>,
        uri: impl Into<String>,
        objects: Vec<IObject>,
    ) -> Self {
        Self {
            name: name.into(),
            model_root: model_root.into(),
            uri: uri.into(),
            header: Header::default(),
            objects,
        }
    }

    pub fn object_index(&self, instance_of: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.instance_of == instance_of)
    }

    pub fn object(&self, instance_of: &str) -> Option<&IObject> {
        self.objects.iter().find(|o| o.instance_of == instance_of)
    }

    pub fn object_mut(&mut self, instance_of: &str) -> Option<&mut IObject> {
        self.objects.iter_mut().find(|o| o.instance_of == instance_of)
    }

    pub fn root_object(&self) -> Option<&IObject> {
        self.object(&self.model_root)
    }

    pub fn root_index(&self) -> Option<usize> {
        self.object_index(&self.model_root)
    }
}
