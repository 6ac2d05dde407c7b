//! Session-scoped tree view state.

pub mod cache;

pub use cache::{ActionGuard, SubtreeState, TreeCache};
