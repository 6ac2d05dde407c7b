//! # atelier-api
//!
//! HTTP surface for Atelier. Authenticated tree and share management
//! under `/api`, the public read-only share viewer under `/share`, and
//! health probes. Identity issuance is out of scope: handlers trust the
//! principal injected by the upstream gateway.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
