//! Comment submission, editing and deletion.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use blogicum_core::DomainError;
use blogicum_core::domain::Comment;
use blogicum_core::policy::{self, Action};
use blogicum_shared::forms::CommentForm;

use super::posts::visible_post;
use super::{post_detail_url, see_other};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Load a comment addressed through its post's URL.
async fn load_comment(state: &AppState, post_id: Uuid, comment_id: Uuid) -> AppResult<Comment> {
    state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|c| c.post_id == post_id)
        .ok_or_else(|| DomainError::not_found("Comment", comment_id).into())
}

/// POST /posts/{post_id}/comment
pub async fn add(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    let (post, _) = visible_post(&state, path.into_inner(), Some(&viewer), Utc::now()).await?;

    let form = body.into_inner();
    form.validate()?;

    let comment = state
        .comments
        .insert(Comment::new(post.id, identity.user_id, form.text))
        .await?;

    tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment added");
    Ok(see_other(post_detail_url(post.id)))
}

/// GET /posts/{post_id}/edit_comment/{comment_id}
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = load_comment(&state, post_id, comment_id).await?;
    if !policy::can_mutate(&comment, identity.viewer().as_ref(), Action::Edit) {
        return Ok(see_other(post_detail_url(post_id)));
    }
    Ok(HttpResponse::Ok().json(CommentForm { text: comment.text }))
}

/// POST /posts/{post_id}/edit_comment/{comment_id}
pub async fn update(
    identity: OptionalIdentity,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut comment = load_comment(&state, post_id, comment_id).await?;
    if !policy::can_mutate(&comment, identity.viewer().as_ref(), Action::Edit) {
        tracing::warn!(comment_id = %comment_id, "Rejected comment edit by non-author");
        return Ok(see_other(post_detail_url(post_id)));
    }

    let form = body.into_inner();
    form.validate()?;
    comment.text = form.text;
    state.comments.update(comment).await?;

    Ok(see_other(post_detail_url(post_id)))
}

/// POST /posts/{post_id}/delete_comment/{comment_id}
pub async fn delete(
    identity: OptionalIdentity,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = load_comment(&state, post_id, comment_id).await?;
    if !policy::can_mutate(&comment, identity.viewer().as_ref(), Action::Delete) {
        tracing::warn!(comment_id = %comment_id, "Rejected comment deletion");
        return Ok(see_other(post_detail_url(post_id)));
    }

    state.comments.delete(comment.id).await?;
    tracing::info!(comment_id = %comment_id, post_id = %post_id, "Comment deleted");
    Ok(see_other(post_detail_url(post_id)))
}
