//! Data model: type graph, variability interface, instances, fragments

pub mod annotation;
pub mod fragment;
pub mod graph;
pub mod instance;
pub mod interface;
pub mod node;

pub use annotation::Annotation;
pub use fragment::{Delta, Fragment, Trace};
pub use graph::{mint_uri, Model, URI_PREFIX};
pub use instance::{
    AssociationInstance, AttributeInstance, CompositionInstance, Header, HeaderElement, IObject,
    Instance,
};
pub use interface::{Delimiter, Interface, LeftOpen, Point, Region, RightOpen};
pub use node::{
    AssociationRelation, Attribute, Composition, Concretization, Node, ParentRelation, Script,
};
