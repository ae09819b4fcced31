//! # Todo Auth
//!
//! Stateless token authentication for the Todo API.
//!
//! This crate provides:
//!
//! - [`claims`]: [`Role`], the signed [`Claims`] payload and the per-request [`Identity`]
//! - [`codec`]: [`TokenCodec`], HMAC-SHA512 signing and verification of compact tokens
//! - [`provider`]: [`TokenProvider`], issuing tokens for users and turning bearer
//!   strings back into identities
//! - [`error`]: the [`CodecError`] / [`AuthError`] taxonomy
//!
//! Nothing here performs I/O or holds mutable state; the only shared input is the
//! signing key, read once from [`todo_config::JwtConfig`].
//!
//! # Example
//!
//! ```ignore
//! use todo_auth::{Role, TokenProvider};
//! use todo_config::JwtConfig;
//!
//! let provider = TokenProvider::new(&JwtConfig::from_env())?;
//!
//! let token = provider.issue(user_id, "user@example.com", Role::Common)?;
//! let identity = provider.authenticate(&token)?;
//! assert_eq!(identity.role(), Role::Common);
//! ```

pub mod claims;
pub mod codec;
pub mod error;
pub mod provider;

pub use claims::{Claims, Identity, Role};
pub use codec::TokenCodec;
pub use error::{AuthError, CodecError, UnknownRole};
pub use provider::TokenProvider;
