//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use blogicum_core::domain::{Category, CommentWithAuthor, Post, PostSummary, User};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_core::{Page, PageRequest, PostQuery, PostScope};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::Entity as LocationEntity;
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {}

/// A listing row: every post column plus the annotations.
#[derive(Debug, FromQueryResult)]
struct PostRow {
    id: Uuid,
    title: String,
    text: String,
    pub_date: sea_orm::prelude::DateTimeWithTimeZone,
    is_published: bool,
    location_id: Option<Uuid>,
    category_id: Option<Uuid>,
    image: Option<String>,
    author_id: Option<Uuid>,
    created_at: sea_orm::prelude::DateTimeWithTimeZone,
    author_username: Option<String>,
    comment_count: i64,
}

impl From<PostRow> for PostSummary {
    fn from(row: PostRow) -> Self {
        Self {
            post: Post {
                id: row.id,
                title: row.title,
                text: row.text,
                pub_date: row.pub_date.into(),
                is_published: row.is_published,
                location_id: row.location_id,
                category_id: row.category_id,
                image: row.image,
                author_id: row.author_id,
                created_at: row.created_at.into(),
            },
            author_username: row.author_username,
            comment_count: u64::try_from(row.comment_count).unwrap_or_default(),
        }
    }
}

/// Translate a listing into its WHERE clause. The public visibility checks
/// mirror `blogicum_core::policy::is_publicly_visible`.
pub(crate) fn listing_condition(query: &PostQuery) -> Condition {
    let mut condition = Condition::all();

    condition = match query.scope {
        PostScope::Published => condition,
        PostScope::Category(category_id) => {
            condition.add(post::Column::CategoryId.eq(category_id))
        }
        PostScope::Author { author_id, .. } => condition.add(post::Column::AuthorId.eq(author_id)),
    };

    if query.requires_public_visibility() {
        condition = condition
            .add(post::Column::IsPublished.eq(true))
            .add(post::Column::PubDate.lte(query.now))
            .add(post::Column::AuthorId.is_not_null())
            .add(category::Column::IsPublished.eq(true));
    }

    condition
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(
        &self,
        query: &PostQuery,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        tracing::debug!(scope = ?query.scope, page = page.page, "Listing posts");

        let paginator = PostEntity::find()
            .join(JoinType::LeftJoin, post::Relation::Category.def())
            .join(JoinType::LeftJoin, post::Relation::Author.def())
            .join(JoinType::LeftJoin, post::Relation::Comments.def())
            .column_as(user::Column::Username, "author_username")
            .column_as(
                Expr::col((CommentEntity, comment::Column::Id)).count(),
                "comment_count",
            )
            .filter(listing_condition(query))
            .group_by(post::Column::Id)
            .group_by(user::Column::Username)
            .order_by_desc(post::Column::PubDate)
            .into_model::<PostRow>()
            .paginate(&self.db, page.per_page);

        let total = paginator.num_items().await.map_err(map_db_err)?;
        let rows = paginator
            .fetch_page(page.page - 1)
            .await
            .map_err(map_db_err)?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            total,
            page,
        ))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .find_also_related(UserEntity)
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentWithAuthor {
                comment: comment.into(),
                author_username: author.map(|u| u.username),
            })
            .collect())
    }
}
