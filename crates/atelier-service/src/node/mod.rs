//! Node operations: CRUD with validation, and path resolution.

pub mod path;
pub mod service;

pub use path::PathService;
pub use service::{CreateNodeRequest, NodeService, UpdateNodeRequest};
