//! Visibility and authorization rules shared by every listing and handler.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, Post, Viewer};

/// Whether anyone, signed in or not, may see the post.
///
/// `category` must be the post's own category (or `None` when the post has
/// none). Uncategorized posts are never public.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published
        && post.pub_date <= now
        && post.author_id.is_some()
        && category.is_some_and(|c| c.is_published)
}

/// Whether `viewer` may see the post. Authors always see their own posts,
/// including drafts and scheduled ones.
pub fn is_visible_to(
    post: &Post,
    category: Option<&Category>,
    viewer: Option<&Viewer>,
    now: DateTime<Utc>,
) -> bool {
    if viewer.is_some_and(|v| v.is(post.author_id)) {
        return true;
    }
    is_publicly_visible(post, category, now)
}

/// Whether the category page itself can be shown.
pub fn category_is_listable(category: &Category) -> bool {
    category.is_published
}

/// Kind of mutation being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Delete,
}

/// A record owned by a user.
pub trait Authored {
    fn author_id(&self) -> Option<Uuid>;

    /// Superusers may delete records of this kind regardless of ownership.
    fn superuser_may_delete() -> bool {
        false
    }
}

impl Authored for Post {
    fn author_id(&self) -> Option<Uuid> {
        self.author_id
    }

    fn superuser_may_delete() -> bool {
        true
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Option<Uuid> {
        self.author_id
    }
}

/// Single authorization capability for edits and deletions.
pub fn can_mutate<R: Authored>(record: &R, viewer: Option<&Viewer>, action: Action) -> bool {
    let Some(viewer) = viewer else {
        return false;
    };
    if viewer.is(record.author_id()) {
        return true;
    }
    action == Action::Delete && viewer.is_superuser && R::superuser_may_delete()
}
