//! Category listing.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::policy;
use blogicum_core::{DomainError, PageRequest, PostQuery};
use blogicum_shared::dto::CategoryPageResponse;

use super::PageParams;
use super::views;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /category/{slug}
///
/// Unknown and unpublished categories are both a 404.
pub async fn listing(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .filter(policy::category_is_listable)
        .ok_or_else(|| DomainError::not_found("Category", &slug))?;

    let request = PageRequest::new(params.page.unwrap_or(1))?;
    let page = state
        .posts
        .list(&PostQuery::in_category(category.id, Utc::now()), request)
        .await?
        .in_range()?;

    let media_url = state.media_url.as_str();
    Ok(HttpResponse::Ok().json(CategoryPageResponse {
        category: views::category_response(&category),
        posts: views::paged(page, |s| views::post_card(s, media_url)),
    }))
}
