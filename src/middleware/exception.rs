//! Rendering of authentication and authorization failures.
//!
//! Inner middleware and extractors never build 401/403 bodies themselves. They
//! return an [`AuthRejection`], which travels outward as a marker in the response
//! extensions until [`translate_auth_failures`] replaces it with the client-facing
//! response. A request that fails authentication gets a 401 and one that fails
//! authorization gets a 403 through [`access_denied`].

use anyhow::anyhow;
use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use todo_auth::AuthError;
use todo_core::AppError;

#[derive(Debug, Clone)]
pub struct AuthRejection(pub AuthError);

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = if self.0.is_access_denied() {
            StatusCode::FORBIDDEN
        } else {
            StatusCode::UNAUTHORIZED
        };

        let mut response = status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Outermost auth layer. Leaves every other response untouched.
pub async fn translate_auth_failures(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = next.run(req).await;
    match response.extensions_mut().remove::<AuthRejection>() {
        Some(AuthRejection(err)) if err.is_access_denied() => access_denied(&method, &path, &err),
        Some(AuthRejection(err)) => authentication_required(&method, &path, &err),
        None => response,
    }
}

/// 403 for callers that are authenticated but not allowed.
pub fn access_denied(method: &Method, path: &str, err: &AuthError) -> Response {
    tracing::warn!(method = %method, path = %path, reason = %err, "Access denied");
    AppError::forbidden(anyhow!("Access denied")).into_response()
}

/// 401 with the same body whatever the cause.
fn authentication_required(method: &Method, path: &str, err: &AuthError) -> Response {
    tracing::info!(method = %method, path = %path, reason = %err, "Authentication required");

    let mut response = AppError::unauthorized(anyhow!("Authentication required")).into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}
