//! Description of a post listing, independent of the storage backend.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Post, Viewer};
use crate::policy;

/// Which posts a listing draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Index page: every publicly visible post.
    Published,
    /// Publicly visible posts of one category.
    Category(Uuid),
    /// Posts of one author; hidden ones only when the owner is looking.
    Author { author_id: Uuid, include_hidden: bool },
}

/// A post listing evaluated at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct PostQuery {
    pub scope: PostScope,
    pub now: DateTime<Utc>,
}

impl PostQuery {
    pub fn published(now: DateTime<Utc>) -> Self {
        Self {
            scope: PostScope::Published,
            now,
        }
    }

    pub fn in_category(category_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            scope: PostScope::Category(category_id),
            now,
        }
    }

    /// Profile listing for `author_id` as seen by `viewer`.
    pub fn by_author(author_id: Uuid, viewer: Option<&Viewer>, now: DateTime<Utc>) -> Self {
        let include_hidden = viewer.is_some_and(|v| v.user_id == author_id);
        Self {
            scope: PostScope::Author {
                author_id,
                include_hidden,
            },
            now,
        }
    }

    /// Whether listed posts must pass the public visibility predicate.
    pub fn requires_public_visibility(&self) -> bool {
        !matches!(
            self.scope,
            PostScope::Author {
                include_hidden: true,
                ..
            }
        )
    }

    /// In-memory evaluation; `category` is the post's own category if any.
    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        let in_scope = match self.scope {
            PostScope::Published => true,
            PostScope::Category(id) => post.category_id == Some(id),
            PostScope::Author { author_id, .. } => post.author_id == Some(author_id),
        };
        in_scope
            && (!self.requires_public_visibility()
                || policy::is_publicly_visible(post, category, self.now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn owner_profile_includes_hidden_posts() {
        let now = Utc::now();
        let owner = Viewer::new(Uuid::new_v4(), false);
        let mut draft = Post::new(owner.user_id, "d".into(), "x".into(), now + TimeDelta::days(3));
        draft.is_published = false;

        let own = PostQuery::by_author(owner.user_id, Some(&owner), now);
        assert!(!own.requires_public_visibility());
        assert!(own.matches(&draft, None));

        let stranger = Viewer::new(Uuid::new_v4(), false);
        let other = PostQuery::by_author(owner.user_id, Some(&stranger), now);
        assert!(other.requires_public_visibility());
        assert!(!other.matches(&draft, None));

        let anonymous = PostQuery::by_author(owner.user_id, None, now);
        assert!(!anonymous.matches(&draft, None));
    }

    #[test]
    fn category_scope_filters_by_category() {
        let now = Utc::now();
        let travel = Category::new("Travel".into(), "".into(), "travel".into());
        let food = Category::new("Food".into(), "".into(), "food".into());
        let mut post = Post::new(Uuid::new_v4(), "p".into(), "x".into(), now - TimeDelta::hours(2));
        post.category_id = Some(travel.id);

        assert!(PostQuery::in_category(travel.id, now).matches(&post, Some(&travel)));
        assert!(!PostQuery::in_category(food.id, now).matches(&post, Some(&travel)));
        assert!(PostQuery::published(now).matches(&post, Some(&travel)));
    }

    #[test]
    fn author_scope_excludes_other_authors() {
        let now = Utc::now();
        let owner = Viewer::new(Uuid::new_v4(), false);
        let post = Post::new(Uuid::new_v4(), "p".into(), "x".into(), now);

        assert!(!PostQuery::by_author(owner.user_id, Some(&owner), now).matches(&post, None));
    }
}
