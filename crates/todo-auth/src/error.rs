//! Authentication error taxonomy.
//!
//! [`CodecError`] describes why a token could not be produced or accepted. It is
//! detailed on purpose so the server log can tell a forged token from an expired
//! one. [`AuthError`] is what the request pipeline sees; every codec failure
//! collapses into [`AuthError::AuthenticationFailed`] and is rendered to clients
//! as the same 401.

use thiserror::Error;

use crate::claims::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The token could not be parsed, or its claims were not acceptable.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The signature does not match the payload under the configured key.
    #[error("token signature does not match")]
    InvalidSignature,

    /// The `exp` claim is in the past.
    #[error("token has expired")]
    Expired,

    /// The codec is misconfigured (missing or unusable key).
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl CodecError {
    /// Short, stable label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::Malformed(_) => "malformed",
            CodecError::InvalidSignature => "invalid_signature",
            CodecError::Expired => "expired",
            CodecError::Signing(_) => "signing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A protected route was called without a usable bearer token.
    #[error("missing bearer credential")]
    MissingCredential,

    /// A bearer token was presented but did not verify.
    #[error("authentication failed ({})", .0.kind())]
    AuthenticationFailed(#[source] CodecError),

    /// The caller is authenticated but its role does not satisfy the route.
    #[error("access denied: requires {required}, caller has {actual}")]
    AccessDenied { required: Role, actual: Role },
}

impl AuthError {
    /// `true` for failures that mean "authenticated but not allowed" (403)
    /// rather than "not authenticated" (401).
    pub fn is_access_denied(&self) -> bool {
        matches!(self, AuthError::AccessDenied { .. })
    }
}

impl From<CodecError> for AuthError {
    fn from(err: CodecError) -> Self {
        AuthError::AuthenticationFailed(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_collapses_into_authentication_failed() {
        let err: AuthError = CodecError::Expired.into();
        assert_eq!(err, AuthError::AuthenticationFailed(CodecError::Expired));
        assert!(!err.is_access_denied());
    }

    #[test]
    fn test_access_denied_is_distinct() {
        let err = AuthError::AccessDenied {
            required: Role::Common,
            actual: Role::Premium,
        };
        assert!(err.is_access_denied());
        assert!(!AuthError::MissingCredential.is_access_denied());
    }

    #[test]
    fn test_display_keeps_kind_only() {
        let err = AuthError::AuthenticationFailed(CodecError::Malformed(
            "Base64 error at offset 3".to_string(),
        ));
        assert_eq!(err.to_string(), "authentication failed (malformed)");
    }
}
