//! Compact signed tokens (JWT, HS512).
//!
//! [`TokenCodec`] is a pure function of its input and the configured key. Keys and
//! validation rules are built once and shared behind `Arc`, so clones are cheap
//! and safe to use from any number of concurrent requests.
//!
//! Signature comparison is delegated to `jsonwebtoken`, which recomputes the HMAC
//! and compares it in constant time.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use todo_config::JwtConfig;

use crate::claims::Claims;
use crate::error::CodecError;

const ALGORITHM: Algorithm = Algorithm::HS512;

/// Secrets shorter than this are accepted but logged as weak.
const RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenCodec {
    /// Builds a codec from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Signing`] when no secret is configured.
    pub fn new(config: &JwtConfig) -> Result<Self, CodecError> {
        if config.secret.trim().is_empty() {
            return Err(CodecError::Signing("JWT secret is not configured".to_string()));
        }
        if config.secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                "JWT secret is shorter than the recommended {} bytes",
                RECOMMENDED_SECRET_LEN
            );
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[&config.issuer]);
        // `exp` is optional; when present it is still checked.
        validation.set_required_spec_claims(&["iss"]);
        validation.validate_exp = true;
        validation.leeway = config.leeway_secs;

        Ok(Self {
            encoding_key: Arc::new(EncodingKey::from_secret(config.secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(config.secret.as_bytes())),
            validation: Arc::new(validation),
        })
    }

    /// Serializes `claims` and signs them.
    pub fn sign(&self, claims: &Claims) -> Result<String, CodecError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| CodecError::Signing(e.to_string()))
    }

    /// Checks the signature, issuer and expiry of `token` and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, CodecError> {
        if token.matches('.').count() > 2 {
            return Err(extra_segment_error(token));
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)
    }

    /// Decodes claims without checking the signature or expiry.
    ///
    /// For log context only. Never trust the result for access decisions.
    pub fn inspect(token: &str) -> Result<Claims, CodecError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(classify)
    }
}

/// A token with more than three segments. If the header and payload still
/// decode, the extra separator sits in the signature.
fn extra_segment_error(token: &str) -> CodecError {
    let mut segments = token.splitn(3, '.');
    let (Some(header), Some(payload)) = (segments.next(), segments.next()) else {
        return CodecError::Malformed("unexpected number of segments".to_string());
    };

    match TokenCodec::inspect(&format!("{header}.{payload}.")) {
        Ok(_) => CodecError::InvalidSignature,
        Err(_) => CodecError::Malformed("unexpected number of segments".to_string()),
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> CodecError {
    match err.kind() {
        ErrorKind::ExpiredSignature => CodecError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => CodecError::InvalidSignature,
        _ => CodecError::Malformed(err.to_string()),
    }
}
