//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod health;
mod posts;
mod profiles;
mod views;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, http::header, middleware::from_fn, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::throttle;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/", web::get().to(posts::index))
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/posts")
            .service(
                web::resource("/create")
                    .route(web::get().to(posts::create_form))
                    .route(web::post().to(posts::create)),
            )
            .route("/{post_id}", web::get().to(posts::detail))
            .service(
                web::resource("/{post_id}/edit")
                    .route(web::get().to(posts::edit_form))
                    .route(web::post().to(posts::update)),
            )
            .route("/{post_id}/delete", web::post().to(posts::delete))
            .route("/{post_id}/comment", web::post().to(comments::add))
            .service(
                web::resource("/{post_id}/edit_comment/{comment_id}")
                    .route(web::get().to(comments::edit_form))
                    .route(web::post().to(comments::update)),
            )
            .route(
                "/{post_id}/delete_comment/{comment_id}",
                web::post().to(comments::delete),
            ),
    )
    .route("/category/{slug}", web::get().to(categories::listing))
    .service(
        web::scope("/profile")
            // Before `/{username}` so "edit" is never taken for a username.
            .service(
                web::resource("/edit")
                    .route(web::get().to(profiles::edit_form))
                    .route(web::post().to(profiles::update)),
            )
            .route("/{username}", web::get().to(profiles::listing)),
    )
    .service(
        web::scope("/auth")
            .wrap(from_fn(throttle))
            .route("/registration", web::post().to(auth::register))
            .service(
                web::resource("/login")
                    .route(web::get().to(auth::login_form))
                    .route(web::post().to(auth::login)),
            ),
    );
}

/// `?page=N` of a listing; absent means the first page.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
}

/// `303 See Other` to `location`, the answer to a successful form POST.
pub(crate) fn see_other(location: impl Into<String>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

pub(crate) fn post_detail_url(post_id: Uuid) -> String {
    format!("/posts/{}", post_id)
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{}", username)
}
