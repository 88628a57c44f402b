//! jast_ast: Abstract syntax tree definitions for Java source.
//!
//! This crate defines the concrete node structs, the category enums grouping
//! them, the static attribute schema, generic traversal and filtering, and
//! whole-tree persistence.

pub mod node;
pub mod persist;
pub mod schema;
pub mod types;
pub mod walk;

// Re-export key types
pub use node::*;
pub use schema::{Category, NodeKind};
pub use types::Modifiers;
pub use walk::{NodeRef, Path, Pattern, Walk, Walkable};
