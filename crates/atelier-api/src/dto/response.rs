//! Response DTOs.

use serde::{Deserialize, Serialize};

use atelier_entity::node::Node;
use atelier_entity::share::Share;

/// Resolved path with its breadcrumb trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodePathResponse {
    /// Canonical slash-path, root-to-leaf.
    pub path: String,
    /// Ancestor chain from the root down to the node itself.
    pub breadcrumbs: Vec<Node>,
}

/// A share together with its public URL.
#[derive(Debug, Clone, Serialize)]
pub struct ShareResponse {
    /// The share record.
    #[serde(flatten)]
    pub share: Share,
    /// Public URL for the share viewer.
    pub url: String,
}

impl ShareResponse {
    /// Attach the public viewer URL to a share.
    pub fn new(share: Share, public_base_url: &str) -> Self {
        let url = format!(
            "{}/share/{}",
            public_base_url.trim_end_matches('/'),
            share.token
        );
        Self { share, url }
    }
}
