use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog entry with scheduling and categorization metadata.
///
/// `pub_date` may lie in the future; such a post stays hidden from everyone
/// but its author until the date passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Path relative to the media root.
    pub image: Option<String>,
    /// `None` only for legacy rows; new posts always carry an author.
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a published post owned by `author_id`.
    pub fn new(author_id: Uuid, title: String, text: String, pub_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            text,
            pub_date,
            is_published: true,
            location_id: None,
            category_id: None,
            image: None,
            author_id: Some(author_id),
            created_at: Utc::now(),
        }
    }
}

/// A post as it appears in listings, annotated by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub post: Post,
    pub author_username: Option<String>,
    pub comment_count: u64,
}
