//! Cursor pagination types for child listings.
//!
//! Listings order folders before files, then ascending by name (byte
//! order). The cursor is a keyset position in that ordering, not a row
//! reference, so deleting the item it was minted from cannot invalidate
//! it: the next page simply continues strictly after the encoded pair.

use serde::{Deserialize, Serialize};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::AppError;
use crate::result::AppResult;

/// Default page size when the caller does not specify a limit.
const DEFAULT_PAGE_SIZE: u32 = 50;
/// Maximum page size.
const MAX_PAGE_SIZE: u32 = 200;

/// Keyset continuation marker for paginated child listings.
///
/// Encodes the `(name, is_folder)` pair of the last item on the previous
/// page. The wire form is URL-safe base64 over JSON and must round-trip
/// losslessly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCursor {
    /// Name of the last item seen.
    pub last_name: String,
    /// Whether the last item seen was a folder.
    pub last_is_folder: bool,
}

impl ListCursor {
    /// Encode the cursor into its opaque wire form.
    pub fn encode(&self) -> String {
        // Serialization of a two-field struct cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a cursor from its opaque wire form.
    pub fn decode(raw: &str) -> AppResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|e| AppError::with_source(
                crate::error::ErrorKind::Serialization,
                "Malformed listing cursor",
                e,
            ))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Ordering key under the composite listing order.
    ///
    /// Folders sort before files, so the key inverts `is_folder`: an item
    /// comes after this cursor iff its key compares greater.
    pub fn sort_key(&self) -> (bool, &str) {
        (!self.last_is_folder, &self.last_name)
    }
}

/// Request parameters for paginated child listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageParams {
    /// Continuation cursor from a previous page, if any.
    pub cursor: Option<ListCursor>,
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl PageParams {
    /// Create page parameters with a clamped limit.
    pub fn new(cursor: Option<ListCursor>, limit: u32) -> Self {
        Self {
            cursor,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// First page with the default limit.
    pub fn first_page() -> Self {
        Self::default()
    }

    /// Re-clamp the limit to a configured maximum.
    pub fn clamped(mut self, max_limit: u32) -> Self {
        self.limit = self.limit.clamp(1, max_limit.max(1));
        self
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a child listing.
///
/// `next_cursor` is present only when the page is full; it is a "there may
/// be more" heuristic, not an exact count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T: Serialize> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Continuation cursor for the next page, if this one was full.
    pub next_cursor: Option<String>,
}

impl<T: Serialize> Page<T> {
    /// Build a page, minting a continuation cursor from the last item when
    /// the page came back full.
    pub fn new(items: Vec<T>, limit: u32, cursor_of: impl Fn(&T) -> ListCursor) -> Self {
        let next_cursor = if items.len() as u32 == limit {
            items.last().map(|last| cursor_of(last).encode())
        } else {
            None
        };
        Self { items, next_cursor }
    }

    /// An empty page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}
