use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use todo_auth::{AuthError, Identity};

use crate::middleware::exception::AuthRejection;
use crate::state::AppState;

/// Sent by some clients in place of a token when they have none.
const ABSENT_TOKEN_MARKER: &str = "null";

/// Verified caller identity for the current request.
///
/// Lives only in the request's extensions; nothing about it is shared between
/// requests.
#[derive(Debug, Clone)]
pub struct AuthContext {
    identity: Identity,
    authority: String,
}

impl AuthContext {
    pub fn new(identity: Identity) -> Self {
        let authority = identity.authority();
        Self {
            identity,
            authority,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// `ROLE_<role>` label for the identity's role.
    pub fn authority(&self) -> &str {
        &self.authority
    }
}

/// Returns the bearer token from the `Authorization` header, if there is a usable one.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty() && *token != ABSENT_TOKEN_MARKER)
}

/// Resolves the bearer token into an [`AuthContext`].
///
/// Exempt paths pass through without an identity even if a token is sent. Every
/// other request needs a token that verifies; otherwise the chain stops with an
/// [`AuthRejection`] that the exception translation layer renders.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    if state.exemptions.is_exempt(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let Some(token) = bearer_token(req.headers()) else {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            "Protected route called without a bearer token"
        );
        return Err(AuthError::MissingCredential.into());
    };

    let identity = state.tokens.authenticate(token)?;
    tracing::debug!(
        subject = %identity.subject_id(),
        role = %identity.role(),
        "Request authenticated"
    );

    req.extensions_mut().insert(AuthContext::new(identity));
    Ok(next.run(req).await)
}

/// Extractor for the identity attached by [`authenticate`].
///
/// Rejects with 401 when no identity is present, which only happens on exempt
/// routes.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .map(|ctx| AuthUser(ctx.identity().clone()))
            .ok_or_else(|| AuthError::MissingCredential.into())
    }
}
