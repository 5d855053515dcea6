//! modicio kernel
//!
//! In-memory versioned type/instance graph: the data model, the deep
//! slicer, instantiation, the accessor and the evolution engine. Nothing
//! in this crate performs I/O.

pub mod accessor;
pub mod digest;
pub mod errors;
pub mod evolution;
pub mod functions;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod rules;
pub mod traversal;

// Re-exported for the logging macros
pub use modicio_core_types;

pub use accessor::Accessor;
pub use errors::{ExError, ExErrorKind, ModicioError, Result};
pub use evolution::evolve;
pub use model::*;
pub use ops::{build_instance, create_instance};
pub use traversal::{inheritance_closure, slice_deep, Slice};
