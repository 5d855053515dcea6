pub mod instance_ops;
pub mod instantiate;

pub use instance_ops::{
    add_association_instance, instantiate_composite, remove_association_instance,
    remove_composite, set_attribute_value, AssociationTarget,
};
pub use instantiate::{build_instance, create_instance, update_header};
