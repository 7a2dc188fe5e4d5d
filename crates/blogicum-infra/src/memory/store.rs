//! Process-local implementation of every repository port.
//!
//! All five tables live behind one async `RwLock`, so a delete and the
//! referential actions it triggers happen under a single write guard.
//! Data is lost on process restart.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{
    Category, Comment, CommentWithAuthor, Location, Post, PostSummary, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};
use blogicum_core::{Page, PageRequest, PostQuery};

#[derive(Default)]
pub struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn username_of(&self, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| self.users.get(&id))
            .map(|u| u.username.clone())
    }

    fn remove_post(&mut self, post_id: Uuid) {
        self.posts.remove(&post_id);
        self.comments.retain(|_, c| c.post_id != post_id);
    }
}

/// A row type stored in one of the tables.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Unique and foreign-key checks performed before a write.
    fn check_constraints(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Remove the row and apply the ON DELETE actions of its dependents.
    fn delete(tables: &mut Tables, id: Uuid) -> bool {
        Self::table_mut(tables).remove(&id).is_some()
    }
}

fn missing_reference(table: &str) -> RepoError {
    RepoError::Constraint(format!("foreign key violation: no such {table}"))
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.users
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables
            .users
            .values()
            .any(|u| u.id != self.id && u.username == self.username)
        {
            return Err(RepoError::Constraint(
                "duplicate key value violates unique constraint \"users_username_key\"".into(),
            ));
        }
        Ok(())
    }

    fn delete(tables: &mut Tables, id: Uuid) -> bool {
        if tables.users.remove(&id).is_none() {
            return false;
        }
        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == Some(id))
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != Some(id));
        true
    }
}

impl Record for Category {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables
            .categories
            .values()
            .any(|c| c.id != self.id && c.slug == self.slug)
        {
            return Err(RepoError::Constraint(
                "duplicate key value violates unique constraint \"categories_slug_key\"".into(),
            ));
        }
        Ok(())
    }

    fn delete(tables: &mut Tables, id: Uuid) -> bool {
        if tables.categories.remove(&id).is_none() {
            return false;
        }
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        true
    }
}

impl Record for Location {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.locations
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.locations
    }

    fn delete(tables: &mut Tables, id: Uuid) -> bool {
        if tables.locations.remove(&id).is_none() {
            return false;
        }
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        true
    }
}

impl Record for Post {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if self.author_id.is_some_and(|id| !tables.users.contains_key(&id)) {
            return Err(missing_reference("user"));
        }
        if self
            .category_id
            .is_some_and(|id| !tables.categories.contains_key(&id))
        {
            return Err(missing_reference("category"));
        }
        if self
            .location_id
            .is_some_and(|id| !tables.locations.contains_key(&id))
        {
            return Err(missing_reference("location"));
        }
        Ok(())
    }

    fn delete(tables: &mut Tables, id: Uuid) -> bool {
        let existed = tables.posts.contains_key(&id);
        tables.remove_post(id);
        existed
    }
}

impl Record for Comment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.posts.contains_key(&self.post_id) {
            return Err(missing_reference("post"));
        }
        if self.author_id.is_some_and(|id| !tables.users.contains_key(&id)) {
            return Err(missing_reference("user"));
        }
        Ok(())
    }
}

/// In-memory store implementing all repository ports.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> BaseRepository<T, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::Constraint("duplicate primary key".into()));
        }
        entity.check_constraints(&tables)?;
        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if !T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::NotFound);
        }
        entity.check_constraints(&tables)?;
        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if T::delete(&mut tables, id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list(
        &self,
        query: &PostQuery,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&Post> = tables
            .posts
            .values()
            .filter(|post| {
                let category = post.category_id.and_then(|id| tables.categories.get(&id));
                query.matches(post, category)
            })
            .collect();
        matching.sort_by_key(|p| (Reverse(p.pub_date), Reverse(p.created_at)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .map(|post| PostSummary {
                author_username: tables.username_of(post.author_id),
                comment_count: tables
                    .comments
                    .values()
                    .filter(|c| c.post_id == post.id)
                    .count() as u64,
                post: post.clone(),
            })
            .collect();

        Ok(Page::new(items, total, page))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError> {
        let tables = self.tables.read().await;

        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));

        Ok(comments
            .into_iter()
            .map(|c| CommentWithAuthor {
                author_username: tables.username_of(c.author_id),
                comment: c.clone(),
            })
            .collect())
    }
}
