//! Authentication extractors.

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, http::StatusCode,
    http::header, web,
};
use std::fmt;
use std::future::{Ready, ready};

use blogicum_core::domain::Viewer;
use blogicum_core::ports::{AuthError, SUPERUSER_ROLE, TokenClaims};

use crate::state::AppState;

/// Where anonymous callers of login-only endpoints are sent.
pub const LOGIN_URL: &str = "/auth/login";

/// Signed-in user identity extractor.
///
/// Handlers that take an `Identity` are login-only: an anonymous caller is
/// redirected to the login page with the original path and query in `next`.
/// ```ignore
/// async fn create(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Check if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn viewer(&self) -> Viewer {
        Viewer::new(self.user_id, self.has_role(SUPERUSER_ROLE))
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

/// Rejection for anonymous callers: a `302 Found` to the login page.
#[derive(Debug)]
pub struct LoginRequired {
    next: String,
}

impl LoginRequired {
    fn for_request(req: &HttpRequest) -> Self {
        Self {
            next: req
                .uri()
                .path_and_query()
                .map_or_else(|| req.path().to_string(), |pq| pq.as_str().to_string()),
        }
    }

    pub fn location(&self) -> String {
        format!("{}?next={}", LOGIN_URL, urlencoding::encode(&self.next))
    }
}

impl fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login required for {}", self.next)
    }
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.location()))
            .finish()
    }
}

/// Decode the bearer token of a request, if it carries a valid one.
fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AuthError::InvalidToken("Server configuration error".to_string())
    })?;

    let auth_str = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    state.tokens.validate_token(token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|e| {
            if !matches!(e, AuthError::MissingAuth) {
                tracing::debug!("Rejected credentials: {}", e);
            }
            LoginRequired::for_request(req)
        }))
    }
}

/// Optional identity extractor - anonymous callers get `None`.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn viewer(&self) -> Option<Viewer> {
        self.0.as_ref().map(Identity::viewer)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}
