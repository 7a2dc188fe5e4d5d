//! Rate limiting middleware for the account endpoints.

use actix_web::{
    Error, HttpResponse,
    body::{BoxBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};
use blogicum_shared::ErrorResponse;

use crate::state::AppState;

/// Throttle requests per client address using the state's limiter.
///
/// Limiter failures fail open; a missing limiter disables throttling.
pub async fn throttle(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let limiter = req
        .app_data::<web::Data<AppState>>()
        .and_then(|state| state.auth_limiter.clone());

    if let Some(limiter) = limiter {
        let key = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        match limiter.check(&key) {
            Ok(result) if !result.allowed => {
                tracing::warn!("Rate limit exceeded for key: {}", key);

                let wait = result.retry_after.as_secs().max(1);
                let error = ErrorResponse::new(429, "Too Many Requests").with_detail(format!(
                    "Rate limit exceeded. Try again in {} seconds.",
                    wait
                ));
                let response = HttpResponse::TooManyRequests()
                    .insert_header(("Retry-After", wait.to_string()))
                    .json(error);

                return Ok(req.into_response(response));
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Rate limiter error, failing open: {}", e),
        }
    }

    next.call(req).await.map(ServiceResponse::map_into_boxed_body)
}
