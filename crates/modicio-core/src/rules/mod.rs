//! Model and fragment invariants
//!
//! `invariants` holds the individual finders, each returning every
//! violation; `validation` runs them and fails on the first one.

pub mod invariants;
pub mod validation;

pub use validation::{validate_closure, validate_model, validate_push_source, validate_reference_candidate};
