//! Graph traversals over the type graph
//!
//! - `slice`: reachability-closed sub-graph over inheritance and composition
//! - `closure`: a node plus its transitive parents within a slice

pub mod closure;
pub mod slice;

pub use closure::{inheritance_closure, model_closure};
pub use slice::{slice_deep, Slice};
