//! Share entity: public, read-only, token-scoped subtree access.

pub mod model;

pub use model::{NewShare, Share};
