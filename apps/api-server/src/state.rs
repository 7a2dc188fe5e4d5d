//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PasswordService, PostRepository,
    RateLimiter, TokenService, UserRepository,
};
use blogicum_infra::InMemoryStore;
use blogicum_infra::auth::{Argon2PasswordService, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    /// Throttle for the account endpoints; `None` disables it.
    pub auth_limiter: Option<Arc<dyn RateLimiter>>,
    /// URL prefix under which post images are served.
    pub media_url: String,
}

/// The five repositories, from whichever backend is available.
struct Repositories {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    locations: Arc<dyn LocationRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            categories: store.clone(),
            locations: store.clone(),
            posts: store.clone(),
            comments: store,
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = match connect_database(config).await {
            Some(repos) => repos,
            None => Repositories::in_memory(Arc::new(InMemoryStore::new())),
        };

        let state = Self::from_parts(
            repos,
            Arc::new(JwtTokenService::from_env()),
            Arc::new(Argon2PasswordService::new()),
            auth_limiter(),
            config.media.url.clone(),
        );

        tracing::info!("Application state initialized");
        state
    }

    /// State backed entirely by one in-memory store, without throttling.
    #[cfg(test)]
    pub fn in_memory(
        store: Arc<InMemoryStore>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self::from_parts(
            Repositories::in_memory(store),
            tokens,
            passwords,
            None,
            "/media".to_string(),
        )
    }

    fn from_parts(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        auth_limiter: Option<Arc<dyn RateLimiter>>,
        media_url: String,
    ) -> Self {
        Self {
            users: repos.users,
            categories: repos.categories,
            locations: repos.locations,
            posts: repos.posts,
            comments: repos.comments,
            tokens,
            passwords,
            auth_limiter,
            media_url,
        }
    }
}

#[cfg(feature = "postgres")]
async fn connect_database(config: &AppConfig) -> Option<Repositories> {
    use blogicum_infra::database::{
        PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
        PostgresPostRepository, PostgresUserRepository, connect,
    };

    let Some(db_config) = config.database.as_ref() else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return None;
    };

    match connect(db_config).await {
        Ok(conn) => Some(Repositories {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
            locations: Arc::new(PostgresLocationRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn)),
        }),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            None
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn connect_database(_config: &AppConfig) -> Option<Repositories> {
    tracing::info!("Running without postgres feature - using in-memory store");
    None
}

#[cfg(feature = "rate-limit")]
fn auth_limiter() -> Option<Arc<dyn RateLimiter>> {
    use blogicum_infra::rate_limit::{InMemoryRateLimiter, RateLimitConfig};

    match InMemoryRateLimiter::new(RateLimitConfig::from_env()) {
        Ok(limiter) => Some(Arc::new(limiter)),
        Err(e) => {
            tracing::error!("Invalid rate limit configuration: {}. Throttling disabled.", e);
            None
        }
    }
}

#[cfg(not(feature = "rate-limit"))]
fn auth_limiter() -> Option<Arc<dyn RateLimiter>> {
    None
}
