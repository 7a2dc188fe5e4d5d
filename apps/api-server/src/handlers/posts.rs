//! Post pages: index, detail, create, edit and delete.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use blogicum_core::domain::{Category, Post, Viewer};
use blogicum_core::policy::{self, Action};
use blogicum_core::{DomainError, PageRequest, PostQuery};
use blogicum_shared::forms::{self, PostForm};

use super::views::{self, PostDetailParts};
use super::{PageParams, post_detail_url, profile_url, profiles, see_other};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Load a post the viewer may see, together with its category.
///
/// Missing and hidden posts are indistinguishable: both are a 404.
pub(super) async fn visible_post(
    state: &AppState,
    post_id: Uuid,
    viewer: Option<&Viewer>,
    now: DateTime<Utc>,
) -> AppResult<(Post, Option<Category>)> {
    let post = load_post(state, post_id).await?;
    let category = match post.category_id {
        Some(id) => state.categories.find_by_id(id).await?,
        None => None,
    };

    if !policy::is_visible_to(&post, category.as_ref(), viewer, now) {
        tracing::debug!(post_id = %post_id, "Post hidden from viewer");
        return Err(DomainError::not_found("Post", post_id).into());
    }
    Ok((post, category))
}

pub(super) async fn load_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id).into())
}

/// Form rules that need storage: referenced category and location must exist.
async fn check_references(state: &AppState, form: &PostForm) -> AppResult<()> {
    let mut errors = form
        .validate()
        .err()
        .map(|e| forms::messages(&e))
        .unwrap_or_default();
    if let Some(id) = form.category_id {
        if state.categories.find_by_id(id).await?.is_none() {
            errors.push("category_id: select a valid choice".to_string());
        }
    }
    if let Some(id) = form.location_id {
        if state.locations.find_by_id(id).await?.is_none() {
            errors.push("location_id: select a valid choice".to_string());
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn apply_form(post: &mut Post, form: PostForm) {
    post.title = form.title;
    post.text = form.text;
    post.pub_date = form.pub_date;
    post.category_id = form.category_id;
    post.location_id = form.location_id;
    post.image = form.image;
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    params: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let request = PageRequest::new(params.page.unwrap_or(1))?;
    let page = state
        .posts
        .list(&PostQuery::published(Utc::now()), request)
        .await?
        .in_range()?;

    let media_url = state.media_url.as_str();
    Ok(HttpResponse::Ok().json(views::paged(page, |s| views::post_card(s, media_url))))
}

/// GET /posts/{post_id}
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    let (post, category) =
        visible_post(&state, path.into_inner(), viewer.as_ref(), Utc::now()).await?;

    let author = match post.author_id {
        Some(id) => state.users.find_by_id(id).await?,
        None => None,
    };
    let location = match post.location_id {
        Some(id) => state.locations.find_by_id(id).await?,
        None => None,
    };
    let comments = state.comments.find_by_post(post.id).await?;

    let body = views::post_detail(
        PostDetailParts {
            post,
            author,
            category,
            location,
            comments,
        },
        &state.media_url,
    );
    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/create - an empty form dated now.
pub async fn create_form(_identity: Identity) -> HttpResponse {
    HttpResponse::Ok().json(PostForm {
        title: String::new(),
        text: String::new(),
        pub_date: Utc::now(),
        location_id: None,
        category_id: None,
        image: None,
    })
}

/// POST /posts/create
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();
    check_references(&state, &form).await?;
    // The token may predate a rename; the redirect follows the stored name.
    let author = profiles::current_user(&state, &identity).await?;

    let mut post = Post::new(author.id, String::new(), String::new(), form.pub_date);
    apply_form(&mut post, form);
    let post = state.posts.insert(post).await?;

    tracing::info!(post_id = %post.id, author = %author.username, "Post created");
    Ok(see_other(profile_url(&author.username)))
}

/// GET /posts/{post_id}/edit
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    if !policy::can_mutate(&post, identity.viewer().as_ref(), Action::Edit) {
        return Ok(see_other(post_detail_url(post.id)));
    }
    Ok(HttpResponse::Ok().json(views::post_form(&post)))
}

/// POST /posts/{post_id}/edit
pub async fn update(
    identity: OptionalIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, path.into_inner()).await?;
    if !policy::can_mutate(&post, identity.viewer().as_ref(), Action::Edit) {
        tracing::warn!(post_id = %post.id, "Rejected edit by non-author");
        return Ok(see_other(post_detail_url(post.id)));
    }

    let form = body.into_inner();
    check_references(&state, &form).await?;
    apply_form(&mut post, form);
    let post = state.posts.update(post).await?;

    Ok(see_other(post_detail_url(post.id)))
}

/// POST /posts/{post_id}/delete
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    if !policy::can_mutate(&post, Some(&identity.viewer()), Action::Delete) {
        tracing::warn!(post_id = %post.id, user = %identity.username, "Rejected post deletion");
        return Ok(see_other(post_detail_url(post.id)));
    }

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, user = %identity.username, "Post deleted");
    Ok(see_other("/"))
}
