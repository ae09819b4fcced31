use anyhow::anyhow;
use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;
use utoipa::ToSchema;

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::{
    EmailCheckQuery, LoginRequest, LoginResponse, ProfileResponse, SignUpRequest, SignUpResponse,
};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use todo_core::AppError;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Check whether an email is already registered
#[utoipa::path(
    get,
    path = "/api/auth/check",
    params(EmailCheckQuery),
    responses(
        (status = 200, description = "`true` if the email is taken", body = bool),
        (status = 400, description = "Email is blank", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn check_email(
    State(state): State<AppState>,
    Query(query): Query<EmailCheckQuery>,
) -> Result<Json<bool>, AppError> {
    let email = query.email.trim();
    if email.is_empty() {
        return Err(AppError::bad_request(anyhow!("Email is required")));
    }

    let duplicated = UserService::is_duplicated(state.users.as_ref(), email).await?;
    Ok(Json(duplicated))
}

/// Register a new COMMON account
#[utoipa::path(
    post,
    path = "/api/auth",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "User registered", body = SignUpResponse),
        (status = 400, description = "Email already registered or malformed body", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SignUpRequest>,
) -> Result<Json<SignUpResponse>, AppError> {
    let response = UserService::sign_up(state.users.as_ref(), dto).await?;
    Ok(Json(response))
}

/// Sign in and receive an access token
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = UserService::authenticate(state.users.as_ref(), &state.tokens, dto).await?;
    Ok(Json(response))
}

/// Upgrade the caller from COMMON to PREMIUM
///
/// The response carries a new token; tokens issued before keep the old role.
#[utoipa::path(
    put,
    path = "/api/auth/promote",
    responses(
        (status = 200, description = "Promoted; token reflects the new role", body = LoginResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not COMMON", body = ErrorResponse),
        (status = 404, description = "Token refers to a missing user", body = ErrorResponse),
        (status = 409, description = "Stored role no longer allows promotion", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn promote(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<LoginResponse>, AppError> {
    let response = UserService::promote_to_premium(state.users.as_ref(), &state.tokens, &auth_user.0)
        .await
        .map_err(|e| e.into_app_error())?;
    Ok(Json(response))
}

/// Load the caller's profile
#[utoipa::path(
    get,
    path = "/api/auth/load-profile",
    responses(
        (status = 200, description = "Profile of the caller", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn load_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = UserService::load_profile(state.users.as_ref(), &auth_user.0).await?;
    Ok(Json(profile))
}
