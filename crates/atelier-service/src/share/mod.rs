//! Share management: issuance, revocation, and public subtree access.

pub mod access;
pub mod service;
pub mod token;

pub use access::{AccessService, SharedListing};
pub use service::{CreateShareRequest, ShareService};
