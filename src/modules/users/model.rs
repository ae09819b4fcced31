//! User records and the request/response DTOs of the auth endpoints.
//!
//! # Core Types
//!
//! - [`User`] - Persisted user record, including the password hash
//! - [`NewUser`] - Insert payload built by the service after hashing
//!
//! # Request DTOs
//!
//! - [`SignUpRequest`] - Register a new account
//! - [`LoginRequest`] - Exchange credentials for a token
//! - [`EmailCheckQuery`] - Duplicate-email lookup
//!
//! # Response DTOs
//!
//! - [`SignUpResponse`], [`LoginResponse`], [`ProfileResponse`]

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use todo_auth::Role;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A user as stored. Only the repository and the service see the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub user_name: String,
    pub role: Role,
    pub join_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub user_name: String,
    pub role: Role,
}

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 8, max = 20, message = "Password must be 8 to 20 characters"))]
    pub password: String,
    #[validate(length(min = 2, max = 20, message = "User name must be 2 to 20 characters"))]
    #[schema(example = "kim")]
    pub user_name: String,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("user_name", &self.user_name)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub email: String,
    pub user_name: String,
    pub join_date: NaiveDate,
}

impl From<&User> for SignUpResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            user_name: user.user_name.clone(),
            join_date: user.join_date.date_naive(),
        }
    }
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Returned by sign-in and by promotion; `token` reflects the role shown.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub email: String,
    pub user_name: String,
    pub join_date: NaiveDate,
    pub token: String,
    pub role: Role,
}

impl LoginResponse {
    pub fn new(user: &User, token: String) -> Self {
        Self {
            email: user.email.clone(),
            user_name: user.user_name.clone(),
            join_date: user.join_date.date_naive(),
            token,
            role: user.role,
        }
    }
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub email: String,
    pub user_name: String,
    pub join_date: NaiveDate,
    pub role: Role,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            user_name: user.user_name.clone(),
            join_date: user.join_date.date_naive(),
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailCheckQuery {
    #[serde(default)]
    pub email: String,
}
