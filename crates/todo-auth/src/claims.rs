//! Roles, token claims and the request identity derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::UnknownRole;

/// Account tier. Variants are declared in promotion order, so `Ord` follows it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Common,
    Premium,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Common => "COMMON",
            Role::Premium => "PREMIUM",
            Role::Admin => "ADMIN",
        }
    }

    /// Authority label attached to authenticated requests, e.g. `ROLE_COMMON`.
    pub fn authority(&self) -> String {
        format!("ROLE_{}", self.as_str())
    }

    /// Whether a user may move themselves from `self` to `target`.
    ///
    /// `COMMON -> PREMIUM` is the only self-service transition.
    pub fn can_transition_to(&self, target: Role) -> bool {
        matches!((self, target), (Role::Common, Role::Premium))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COMMON" => Ok(Role::Common),
            "PREMIUM" => Ok(Role::Premium),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Payload signed into every access token.
///
/// The role is a snapshot taken at issuance; it is never refreshed from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issuer, checked on verification
    pub iss: String,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
    /// Expiry (Unix timestamp); absent for non-expiring tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

/// Who is making the current request.
///
/// Built only from verified claims and never persisted. Fields are private so an
/// identity cannot be edited after verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    subject_id: String,
    email: String,
    role: Role,
}

impl Identity {
    pub fn new(subject_id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: email.into(),
            role,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// The subject as a user id, if it is a UUID.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.subject_id).ok()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn authority(&self) -> String {
        self.role.authority()
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}
