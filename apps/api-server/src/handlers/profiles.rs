//! Profile pages and editing one's own profile.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use validator::Validate;

use blogicum_core::domain::User;
use blogicum_core::{DomainError, PageRequest, PostQuery, RepoError};
use blogicum_shared::dto::ProfilePageResponse;
use blogicum_shared::forms::ProfileForm;

use super::{PageParams, profile_url, see_other, views};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const USERNAME_TAKEN: &str = "username: A user with that username already exists.";

/// GET /profile/{username}
///
/// The owner sees every one of their posts; everyone else only the public ones.
pub async fn listing(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    params: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", &username))?;

    let request = PageRequest::new(params.page.unwrap_or(1))?;
    let query = PostQuery::by_author(user.id, identity.viewer().as_ref(), Utc::now());
    let page = state.posts.list(&query, request).await?.in_range()?;

    let media_url = state.media_url.as_str();
    Ok(HttpResponse::Ok().json(ProfilePageResponse {
        profile: views::profile_response(&user),
        posts: views::paged(page, |s| views::post_card(s, media_url)),
    }))
}

/// The signed-in user's own record. A valid token for a deleted account is
/// treated as unauthenticated.
pub(super) async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// GET /profile/edit
pub async fn edit_form(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;
    Ok(HttpResponse::Ok().json(views::profile_form(&user)))
}

/// POST /profile/edit
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<ProfileForm>,
) -> AppResult<HttpResponse> {
    let mut user = current_user(&state, &identity).await?;
    let form = body.into_inner();
    form.validate()?;

    if form.username != user.username
        && state.users.find_by_username(&form.username).await?.is_some()
    {
        return Err(AppError::Validation(vec![USERNAME_TAKEN.to_string()]));
    }

    user.username = form.username;
    user.first_name = form.first_name;
    user.last_name = form.last_name;
    user.email = form.email.unwrap_or_default();

    // A concurrent rename can still win the race to the unique index.
    let user = state.users.update(user).await.map_err(|e| match e {
        RepoError::Constraint(_) => AppError::Validation(vec![USERNAME_TAKEN.to_string()]),
        other => other.into(),
    })?;

    tracing::info!(user_id = %user.id, username = %user.username, "Profile updated");
    Ok(see_other(profile_url(&user.username)))
}
