//! Tree node entity: model, name rules, and structural integrity checks.

pub mod model;
pub mod name;
pub mod tree;

pub use model::{Node, NodeChange, NewNode};
