//! Virtual file system limits and share settings.

use serde::{Deserialize, Serialize};

/// Tree limits and share behavior.
///
/// `max_depth` bounds the ancestor chain from any node to a root, which in
/// turn bounds path-resolution cost and guarantees traversal termination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VfsConfig {
    /// Maximum number of ancestor hops from any node to a root.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum node name length in bytes.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    /// Maximum file content size in bytes.
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,
    /// Default listing page size.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Maximum listing page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Share token length in characters.
    #[serde(default = "default_share_token_length")]
    pub share_token_length: usize,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_name_length: default_max_name_length(),
            max_content_bytes: default_max_content_bytes(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            share_token_length: default_share_token_length(),
        }
    }
}

fn default_max_depth() -> usize {
    32
}

fn default_max_name_length() -> usize {
    255
}

fn default_max_content_bytes() -> usize {
    1024 * 1024
}

fn default_page_size() -> u32 {
    50
}

fn default_max_page_size() -> u32 {
    200
}

fn default_share_token_length() -> usize {
    24
}
