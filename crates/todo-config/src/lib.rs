//! # Todo Config
//!
//! Configuration structures loaded from environment variables (a `.env` file is
//! honoured by the binary through `dotenvy`):
//!
//! - [`jwt`]: signing key, issuer and token lifetime
//! - [`security`]: path patterns exempt from authentication
//! - [`cors`]: allowed browser origins
//! - [`server`]: listen address
//!
//! All of these are read once at startup and never mutated afterwards.
//!
//! # Example
//!
//! ```ignore
//! use todo_config::{JwtConfig, SecurityConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let security_config = SecurityConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod security;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use security::SecurityConfig;
pub use server::ServerConfig;

/// Splits a comma separated list, trimming entries and dropping empty ones.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
