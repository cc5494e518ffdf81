use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest accepted attachment, in bytes.
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024; // 10 MiB

/// An uploaded file.
///
/// Uploads start out unattached; saving a draft or recording an action attaches them. Files
/// which stay unattached are purged after a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub owner_email: String,
    pub draft_id: Option<i64>,
    pub action_id: Option<i64>,
    pub name: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    pub fn url(&self) -> String {
        format!("/inforequests/attachments/{}", self.id)
    }
}

/// An attachment together with its bytes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AttachmentContent {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub attachment: Attachment,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct AttachmentCreate {
    pub owner_email: String,
    pub name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl AttachmentCreate {
    /// File names are reduced to their last path component.
    pub fn new(owner_email: String, name: &str, content_type: Option<&str>, content: Vec<u8>) -> Self {
        let name = name
            .rsplit(['/', '\\'])
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("attachment");
        Self {
            owner_email,
            name: name.to_string(),
            content_type: content_type
                .unwrap_or("application/octet-stream")
                .to_string(),
            content,
        }
    }
}
