//! Account handlers: registration and login.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use validator::Validate;

use blogicum_core::DomainError;
use blogicum_core::domain::User;
use blogicum_core::ports::{AuthError, SUPERUSER_ROLE};
use blogicum_shared::dto::{AuthResponse, LoginFormResponse};
use blogicum_shared::forms::{LoginRequest, RegisterUserRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn roles_of(user: &User) -> Vec<String> {
    let mut roles = vec!["user".to_string()];
    if user.is_superuser {
        roles.push(SUPERUSER_ROLE.to_string());
    }
    roles
}

fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username, roles_of(user))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    })
}

/// POST /auth/registration
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(DomainError::Duplicate(format!("username {}", req.username)).into());
    }

    let password_hash = state.passwords.hash(&req.password)?;

    let mut user = User::new(req.username, password_hash);
    user.email = req.email.unwrap_or_default();
    user.first_name = req.first_name;
    user.last_name = req.last_name;
    let user = state.users.insert(user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(HttpResponse::Created().json(issue_token(&state, &user)?))
}

#[derive(Debug, Deserialize)]
pub struct NextParams {
    pub next: Option<String>,
}

/// GET /auth/login - the fields to POST back, plus where to go afterwards.
pub async fn login_form(params: web::Query<NextParams>) -> HttpResponse {
    HttpResponse::Ok().json(LoginFormResponse {
        username: String::new(),
        password: String::new(),
        next: params.into_inner().next,
    })
}

/// POST /auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(username = %req.username, "Login rejected");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(HttpResponse::Ok().json(issue_token(&state, &user)?))
}
