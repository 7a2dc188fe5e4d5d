use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentWithAuthor, Location, Post, PostSummary, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};
use crate::query::PostQuery;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, applying the referential actions of dependents.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository. Deleting a user deletes their posts and comments.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository. Deleting a category detaches its posts.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

/// Location repository. Deleting a location detaches its posts.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {}

/// Post repository. Deleting a post deletes its comments.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Run a listing: filter by `query`, annotate comment counts, order by
    /// `pub_date` descending, and cut out the requested page.
    async fn list(
        &self,
        query: &PostQuery,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post, oldest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError>;
}
