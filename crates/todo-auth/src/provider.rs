//! Issuing access tokens and resolving bearer tokens into identities.

use chrono::Utc;
use todo_config::JwtConfig;
use uuid::Uuid;

use crate::claims::{Claims, Identity, Role};
use crate::codec::TokenCodec;
use crate::error::{AuthError, CodecError};

/// Builds claims from user records and verifies presented tokens.
///
/// Holds no per-request state; cloning shares the underlying codec keys.
#[derive(Clone)]
pub struct TokenProvider {
    codec: TokenCodec,
    issuer: String,
    access_token_expiry: Option<i64>,
}

impl TokenProvider {
    pub fn new(config: &JwtConfig) -> Result<Self, CodecError> {
        Ok(Self {
            codec: TokenCodec::new(config)?,
            issuer: config.issuer.clone(),
            access_token_expiry: config.access_token_expiry,
        })
    }

    /// Issues an access token carrying the user's id, email and current role.
    ///
    /// The role is embedded as-is; later role changes require a new token.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Signing`] if the codec cannot sign.
    pub fn issue(&self, user_id: Uuid, email: &str, role: Role) -> Result<String, CodecError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iss: self.issuer.clone(),
            iat: now as usize,
            exp: self
                .access_token_expiry
                .map(|secs| now.saturating_add(secs) as usize),
        };

        let token = self.codec.sign(&claims)?;
        tracing::debug!(user_id = %user_id, role = %role, "Issued access token");
        Ok(token)
    }

    /// Verifies `token` and returns the identity it carries.
    ///
    /// Every codec failure becomes [`AuthError::AuthenticationFailed`]. The specific
    /// kind and whatever subject the unverified payload names are logged here and
    /// go no further than the error value.
    pub fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        match self.codec.verify(token) {
            Ok(claims) => Ok(Identity::from(claims)),
            Err(err) => {
                let claimed = TokenCodec::inspect(token).ok();
                tracing::warn!(
                    kind = err.kind(),
                    detail = %err,
                    claimed_subject = claimed.as_ref().map(|c| c.sub.as_str()),
                    claimed_role = claimed.as_ref().map(|c| c.role.as_str()),
                    "Rejected bearer token"
                );
                Err(AuthError::AuthenticationFailed(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "todo-api".to_string(),
            access_token_expiry: Some(3600),
            leeway_secs: 0,
        }
    }

    #[test]
    fn test_issue_and_authenticate() {
        let provider = TokenProvider::new(&get_test_jwt_config()).unwrap();
        let user_id = Uuid::new_v4();

        let token = provider.issue(user_id, "test@example.com", Role::Common).unwrap();
        let identity = provider.authenticate(&token).unwrap();

        assert_eq!(identity.user_id(), Some(user_id));
        assert_eq!(identity.email(), "test@example.com");
        assert_eq!(identity.role(), Role::Common);
    }

    #[test]
    fn test_issue_sets_expiry_from_config() {
        let config = get_test_jwt_config();
        let provider = TokenProvider::new(&config).unwrap();

        let token = provider.issue(Uuid::new_v4(), "a@test.com", Role::Premium).unwrap();
        let claims = TokenCodec::new(&config).unwrap().verify(&token).unwrap();

        assert_eq!(claims.exp, Some(claims.iat + 3600));
        assert_eq!(claims.iss, "todo-api");
    }

    #[test]
    fn test_issue_without_expiry() {
        let config = JwtConfig {
            access_token_expiry: None,
            ..get_test_jwt_config()
        };
        let provider = TokenProvider::new(&config).unwrap();

        let token = provider.issue(Uuid::new_v4(), "a@test.com", Role::Common).unwrap();
        assert_eq!(TokenCodec::new(&config).unwrap().verify(&token).unwrap().exp, None);
    }

    #[test]
    fn test_huge_expiry_saturates() {
        let provider = TokenProvider::new(&JwtConfig {
            access_token_expiry: Some(i64::MAX),
            ..get_test_jwt_config()
        })
        .unwrap();

        let token = provider.issue(Uuid::new_v4(), "a@test.com", Role::Common).unwrap();
        let claims = TokenCodec::inspect(&token).unwrap();

        assert_eq!(claims.exp, Some(i64::MAX as usize));
        assert_eq!(provider.authenticate(&token).unwrap().role(), Role::Common);
    }

    #[test]
    fn test_authenticate_collapses_failures() {
        let provider = TokenProvider::new(&get_test_jwt_config()).unwrap();

        let err = provider.authenticate("invalid.token.here").unwrap_err();
        assert!(matches!(err, AuthError::AuthenticationFailed(CodecError::Malformed(_))));

        let token = provider.issue(Uuid::new_v4(), "a@test.com", Role::Common).unwrap();
        let other = TokenProvider::new(&JwtConfig {
            secret: "another-secret-key-at-least-32-characters".to_string(),
            ..get_test_jwt_config()
        })
        .unwrap();

        assert_eq!(
            other.authenticate(&token),
            Err(AuthError::AuthenticationFailed(CodecError::InvalidSignature))
        );
    }

    #[test]
    fn test_role_is_a_snapshot() {
        let provider = TokenProvider::new(&get_test_jwt_config()).unwrap();
        let user_id = Uuid::new_v4();

        let before = provider.issue(user_id, "snap@test.com", Role::Common).unwrap();
        let after = provider.issue(user_id, "snap@test.com", Role::Premium).unwrap();

        assert_eq!(provider.authenticate(&before).unwrap().role(), Role::Common);
        assert_eq!(provider.authenticate(&after).unwrap().role(), Role::Premium);
    }
}
