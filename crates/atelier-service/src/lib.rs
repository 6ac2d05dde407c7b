//! # atelier-service
//!
//! Business logic for the Atelier virtual file system: node CRUD with
//! validation (`NodeService`), path resolution (`PathService`), share
//! issuance and public subtree access (`ShareService`, `AccessService`),
//! and the session-scoped tree cache (`TreeCache`).

pub mod context;
pub mod node;
pub mod share;
pub mod tree;

pub use context::RequestContext;
