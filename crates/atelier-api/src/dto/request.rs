//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create node request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNodeBody {
    /// Node name.
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    /// Parent folder (absent = root level).
    pub parent_id: Option<Uuid>,
    /// Whether to create a folder.
    #[serde(default)]
    pub is_folder: bool,
    /// Initial content (files only).
    pub content: Option<String>,
}

/// Update node request body.
///
/// `parent_id` distinguishes "absent" (leave alone) from "null" (move to
/// the root level), so it deserializes into a double `Option`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNodeBody {
    /// New name, if renaming.
    pub name: Option<String>,
    /// New content, if editing.
    pub content: Option<String>,
    /// New parent, if moving (`null` = root level).
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
    /// Optimistic-concurrency token from the last read.
    pub expected_updated_at: Option<DateTime<Utc>>,
}

/// Create share request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShareBody {
    /// The node to share.
    pub node_id: Uuid,
    /// Optional display label.
    #[validate(length(max = 255))]
    pub title: Option<String>,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Deserialize a present-but-possibly-null field into `Some(inner)`,
/// leaving absence to `#[serde(default)]` (`None`).
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_distinguishes_absent_from_null_parent() {
        let absent: UpdateNodeBody = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(absent.parent_id, None);

        let null: UpdateNodeBody = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
        assert_eq!(null.parent_id, Some(None));

        let id = Uuid::new_v4();
        let set: UpdateNodeBody =
            serde_json::from_str(&format!(r#"{{"parent_id":"{id}"}}"#)).unwrap();
        assert_eq!(set.parent_id, Some(Some(id)));
    }
}
