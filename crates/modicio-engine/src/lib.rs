//! modicio Engine - Orchestration layer
//!
//! Services coordinate the store boundary with the pure kernel: fetch a
//! Fragment, compute on a detached copy, persist the result as a new
//! snapshot. A failed computation never reaches the store.

pub mod errors;
pub mod services;

pub use services::{
    BehaviourService, EvolutionService, InstanceService, MetaData, MetadataService, ModelService,
    ScriptRun, VariantLookup,
};
