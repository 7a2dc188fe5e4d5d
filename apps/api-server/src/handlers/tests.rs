use std::sync::Arc;

use actix_web::{App, http::StatusCode, http::header, test, web};
use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};

use blogicum_core::domain::{Category, Comment, Post, User};
use blogicum_core::ports::SUPERUSER_ROLE;
use blogicum_core::{PageRequest, PostQuery};
use blogicum_infra::InMemoryStore;
use blogicum_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::AppState;

macro_rules! app {
    ($fx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($fx.state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

struct Fixture {
    state: AppState,
    author: User,
    reader: User,
    category: Category,
}

impl Fixture {
    async fn new() -> Self {
        let state = AppState::in_memory(
            Arc::new(InMemoryStore::new()),
            Arc::new(JwtTokenService::new(JwtConfig::default())),
            Arc::new(Argon2PasswordService::new()),
        );
        let author = state
            .users
            .insert(User::new("anna".into(), "unused".into()))
            .await
            .unwrap();
        let reader = state
            .users
            .insert(User::new("boris".into(), "unused".into()))
            .await
            .unwrap();
        let category = state
            .categories
            .insert(Category::new("Travel".into(), "Trips".into(), "travel".into()))
            .await
            .unwrap();
        Self {
            state,
            author,
            reader,
            category,
        }
    }

    async fn superuser(&self) -> User {
        let mut admin = User::new("admin".into(), "unused".into());
        admin.is_superuser = true;
        self.state.users.insert(admin).await.unwrap()
    }

    fn auth(&self, user: &User) -> (header::HeaderName, String) {
        let mut roles = vec!["user".to_string()];
        if user.is_superuser {
            roles.push(SUPERUSER_ROLE.to_string());
        }
        let token = self
            .state
            .tokens
            .generate_token(user.id, &user.username, roles)
            .unwrap();
        (header::AUTHORIZATION, format!("Bearer {}", token))
    }

    /// A publicly visible post by `anna`, adjusted by `edit`.
    async fn post(&self, title: &str, edit: impl FnOnce(&mut Post)) -> Post {
        let mut post = Post::new(
            self.author.id,
            title.into(),
            "text".into(),
            Utc::now() - TimeDelta::hours(1),
        );
        post.category_id = Some(self.category.id);
        edit(&mut post);
        self.state.posts.insert(post).await.unwrap()
    }

    async fn comment(&self, post: &Post, by: &User, text: &str) -> Comment {
        self.state
            .comments
            .insert(Comment::new(post.id, by.id, text.into()))
            .await
            .unwrap()
    }
}

fn location(resp: &actix_web::dev::ServiceResponse) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn post_form(title: &str) -> Value {
    json!({
        "title": title,
        "text": "Went to the lake",
        "pub_date": Utc::now(),
    })
}

#[actix_web::test]
async fn index_lists_only_public_posts_with_comment_counts() {
    let fx = Fixture::new().await;
    let visible = fx.post("visible", |_| {}).await;
    fx.post("draft", |p| p.is_published = false).await;
    fx.post("scheduled", |p| p.pub_date = Utc::now() + TimeDelta::days(1))
        .await;
    fx.comment(&visible, &fx.reader, "nice").await;
    fx.comment(&visible, &fx.author, "thanks").await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["title"], "visible");
    assert_eq!(body["items"][0]["author"], "anna");
    assert_eq!(body["items"][0]["comment_count"], 2);
}

#[actix_web::test]
async fn listing_pages_hold_ten_posts() {
    let fx = Fixture::new().await;
    for i in 0..11 {
        fx.post(&format!("post {i}"), |p| p.pub_date -= TimeDelta::minutes(i))
            .await;
    }
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/?page=2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["title"], "post 10");
    assert_eq!(body["num_pages"], 2);
    assert_eq!(body["has_previous"], true);
    assert_eq!(body["has_next"], false);
}

#[actix_web::test]
async fn pages_outside_the_listing_are_not_found() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/?page=1").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    for uri in ["/?page=0", "/?page=2", "/?page=18446744073709551615"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn draft_detail_is_visible_to_its_author_only() {
    let fx = Fixture::new().await;
    let draft = fx.post("draft", |p| p.is_published = false).await;
    let app = app!(fx);
    let uri = format!("/posts/{}", draft.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(fx.auth(&fx.reader))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(fx.auth(&fx.author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["title"], "draft");
    assert_eq!(body["category"]["slug"], "travel");
}

#[actix_web::test]
async fn create_requires_login() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/posts/create")
        .set_json(post_form("Summer"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login?next=%2Fposts%2Fcreate");
}

#[actix_web::test]
async fn create_assigns_author_and_redirects_to_profile() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let mut form = post_form("Summer");
    form["category_id"] = json!(fx.category.id);
    form["image"] = json!("posts/lake.jpg");
    let req = test::TestRequest::post()
        .uri("/posts/create")
        .insert_header(fx.auth(&fx.author))
        .set_json(form)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/profile/anna");

    let page = fx
        .state
        .posts
        .list(&PostQuery::published(Utc::now()), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].post.author_id, Some(fx.author.id));
    assert_eq!(page.items[0].post.image.as_deref(), Some("posts/lake.jpg"));
}

#[actix_web::test]
async fn create_after_rename_redirects_to_the_new_profile() {
    let fx = Fixture::new().await;
    let app = app!(fx);
    let token = fx.auth(&fx.author);

    let req = test::TestRequest::post()
        .uri("/profile/edit")
        .insert_header(token.clone())
        .set_json(json!({ "username": "anya" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::SEE_OTHER
    );

    let req = test::TestRequest::post()
        .uri("/posts/create")
        .insert_header(token)
        .set_json(post_form("Autumn"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/profile/anya");
}

#[actix_web::test]
async fn invalid_post_form_is_rejected_with_field_messages() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let mut form = post_form("");
    form["category_id"] = json!(uuid::Uuid::new_v4());
    let req = test::TestRequest::post()
        .uri("/posts/create")
        .insert_header(fx.auth(&fx.author))
        .set_json(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    let errors: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(errors.iter().any(|e| e.starts_with("title")));
    assert!(errors.iter().any(|e| e.starts_with("category_id")));
}

#[actix_web::test]
async fn non_author_edit_redirects_to_detail_and_changes_nothing() {
    let fx = Fixture::new().await;
    let post = fx.post("original", |_| {}).await;
    let app = app!(fx);

    for auth in [Some(fx.auth(&fx.reader)), None] {
        let mut req = test::TestRequest::post()
            .uri(&format!("/posts/{}/edit", post.id))
            .set_json(post_form("hijacked"));
        if let Some(auth) = auth {
            req = req.insert_header(auth);
        }
        let resp = test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), format!("/posts/{}", post.id));
    }

    let stored = fx.state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "original");
}

#[actix_web::test]
async fn author_edit_updates_post_and_keeps_author() {
    let fx = Fixture::new().await;
    let post = fx.post("original", |_| {}).await;
    let app = app!(fx);

    let mut form = post_form("renamed");
    form["category_id"] = json!(fx.category.id);
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit", post.id))
        .insert_header(fx.auth(&fx.author))
        .set_json(form)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}", post.id));
    let stored = fx.state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "renamed");
    assert_eq!(stored.author_id, Some(fx.author.id));
    assert_eq!(stored.created_at, post.created_at);
}

#[actix_web::test]
async fn edit_form_shows_current_values_to_author() {
    let fx = Fixture::new().await;
    let post = fx.post("original", |_| {}).await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit", post.id))
        .insert_header(fx.auth(&fx.author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["title"], "original");
    assert_eq!(body["category_id"], json!(fx.category.id));
}

#[actix_web::test]
async fn missing_post_is_not_found_for_every_action() {
    let fx = Fixture::new().await;
    let app = app!(fx);
    let id = uuid::Uuid::new_v4();

    let requests = [
        test::TestRequest::get().uri(&format!("/posts/{id}")),
        test::TestRequest::get().uri(&format!("/posts/{id}/edit")),
        test::TestRequest::post().uri(&format!("/posts/{id}/delete")),
    ];
    for req in requests {
        let req = req.insert_header(fx.auth(&fx.author)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn superuser_may_delete_foreign_post_but_not_foreign_comment() {
    let fx = Fixture::new().await;
    let admin = fx.superuser().await;
    let post = fx.post("doomed", |_| {}).await;
    let comment = fx.comment(&post, &fx.reader, "first").await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}", post.id, comment.id))
        .insert_header(fx.auth(&admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(fx.state.comments.find_by_id(comment.id).await.unwrap().is_some());

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete", post.id))
        .insert_header(fx.auth(&admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert!(fx.state.posts.find_by_id(post.id).await.unwrap().is_none());
    assert!(fx.state.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn reader_cannot_delete_someone_elses_post() {
    let fx = Fixture::new().await;
    let post = fx.post("kept", |_| {}).await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete", post.id))
        .insert_header(fx.auth(&fx.reader))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}", post.id));
    assert!(fx.state.posts.find_by_id(post.id).await.unwrap().is_some());
}

#[actix_web::test]
async fn anonymous_delete_redirects_to_login() {
    let fx = Fixture::new().await;
    let post = fx.post("kept", |_| {}).await;
    let app = app!(fx);

    let uri = format!("/posts/{}/delete", post.id);
    let req = test::TestRequest::post().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("/auth/login?next={}", urlencoding::encode(&uri))
    );
}

#[actix_web::test]
async fn comment_is_added_and_shown_oldest_first() {
    let fx = Fixture::new().await;
    let post = fx.post("open", |_| {}).await;
    fx.comment(&post, &fx.author, "first").await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", post.id))
        .insert_header(fx.auth(&fx.reader))
        .set_json(json!({ "text": "second" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}", post.id));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["comments"][0]["text"], "first");
    assert_eq!(body["comments"][1]["text"], "second");
    assert_eq!(body["comments"][1]["author"], "boris");
}

#[actix_web::test]
async fn commenting_requires_login_and_a_visible_post() {
    let fx = Fixture::new().await;
    let post = fx.post("open", |_| {}).await;
    let draft = fx.post("draft", |p| p.is_published = false).await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", post.id))
        .set_json(json!({ "text": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", draft.id))
        .insert_header(fx.auth(&fx.reader))
        .set_json(json!({ "text": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", post.id))
        .insert_header(fx.auth(&fx.reader))
        .set_json(json!({ "text": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn comment_edit_is_limited_to_its_author() {
    let fx = Fixture::new().await;
    let post = fx.post("open", |_| {}).await;
    let comment = fx.comment(&post, &fx.reader, "typo").await;
    let app = app!(fx);
    let uri = format!("/posts/{}/edit_comment/{}", post.id, comment.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(fx.auth(&fx.author))
        .set_json(json!({ "text": "rewritten" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let stored = fx.state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "typo");

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(fx.auth(&fx.reader))
        .set_json(json!({ "text": "fixed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let stored = fx.state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "fixed");
}

#[actix_web::test]
async fn comment_addressed_through_another_post_is_not_found() {
    let fx = Fixture::new().await;
    let post = fx.post("one", |_| {}).await;
    let other = fx.post("two", |_| {}).await;
    let comment = fx.comment(&post, &fx.reader, "here").await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit_comment/{}", other.id, comment.id))
        .insert_header(fx.auth(&fx.reader))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn author_deletes_own_comment() {
    let fx = Fixture::new().await;
    let post = fx.post("open", |_| {}).await;
    let comment = fx.comment(&post, &fx.reader, "oops").await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}", post.id, comment.id))
        .insert_header(fx.auth(&fx.reader))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(fx.state.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn category_page_lists_its_public_posts() {
    let fx = Fixture::new().await;
    let other = fx
        .state
        .categories
        .insert(Category::new("Food".into(), "".into(), "food".into()))
        .await
        .unwrap();
    fx.post("trip", |_| {}).await;
    fx.post("dinner", |p| p.category_id = Some(other.id)).await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/category/travel").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["category"]["title"], "Travel");
    assert_eq!(body["posts"]["total"], 1);
    assert_eq!(body["posts"]["items"][0]["title"], "trip");
}

#[actix_web::test]
async fn unknown_or_unpublished_category_is_not_found() {
    let fx = Fixture::new().await;
    let mut hidden = Category::new("Secret".into(), "".into(), "secret".into());
    hidden.is_published = false;
    fx.state.categories.insert(hidden).await.unwrap();
    let app = app!(fx);

    for uri in ["/category/nope", "/category/secret"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(fx.auth(&fx.author))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn profile_owner_sees_hidden_posts_others_do_not() {
    let fx = Fixture::new().await;
    fx.post("public", |_| {}).await;
    fx.post("draft", |p| p.is_published = false).await;
    fx.post("uncategorized", |p| p.category_id = None).await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri("/profile/anna")
        .insert_header(fx.auth(&fx.reader))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["profile"]["username"], "anna");
    assert_eq!(body["posts"]["total"], 1);

    let req = test::TestRequest::get()
        .uri("/profile/anna")
        .insert_header(fx.auth(&fx.author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"]["total"], 3);

    let req = test::TestRequest::get().uri("/profile/nobody").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn profile_edit_renames_the_current_user() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/profile/edit")
        .insert_header(fx.auth(&fx.author))
        .set_json(json!({ "username": "anya", "first_name": "Anna" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/profile/anya");
    let stored = fx.state.users.find_by_id(fx.author.id).await.unwrap().unwrap();
    assert_eq!(stored.username, "anya");
    assert_eq!(stored.first_name, "Anna");
}

#[actix_web::test]
async fn profile_edit_rejects_taken_username() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/profile/edit")
        .insert_header(fx.auth(&fx.author))
        .set_json(json!({ "username": "boris" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["errors"][0],
        "username: A user with that username already exists."
    );
}

#[actix_web::test]
async fn profile_edit_form_requires_login() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/profile/edit").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login?next=%2Fprofile%2Fedit");

    let req = test::TestRequest::get()
        .uri("/profile/edit")
        .insert_header(fx.auth(&fx.author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["username"], "anna");
}

#[actix_web::test]
async fn register_then_login() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/auth/registration")
        .set_json(json!({ "username": "vera", "password": "correct horse" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");

    let req = test::TestRequest::post()
        .uri("/auth/registration")
        .set_json(json!({ "username": "vera", "password": "another one" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    for (username, password) in [("vera", "wrong password"), ("nobody", "correct horse")] {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": username, "password": password }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED,
            "{username}"
        );
    }

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "vera", "password": "correct horse" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["access_token"].as_str().unwrap();
    let claims = fx.state.tokens.validate_token(token).unwrap();
    assert_eq!(claims.username, "vera");
}

#[actix_web::test]
async fn login_redirect_can_be_followed() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri("/profile/edit?tab=names")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let target = location(&resp).to_string();

    let req = test::TestRequest::get().uri(&target).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["next"], "/profile/edit?tab=names");
    assert_eq!(body["username"], "");
}

#[actix_web::test]
async fn short_password_is_a_validation_error() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/auth/registration")
        .set_json(json!({ "username": "vera", "password": "short" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .insert_header(header::ContentType::json())
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn health_reports_ok() {
    let fx = Fixture::new().await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}
