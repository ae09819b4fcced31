//! Request authentication and authorization.
//!
//! # Modules
//!
//! - [`exemption`]: Compiled path patterns that skip authentication
//! - [`auth`]: Bearer token resolution and the [`AuthUser`](auth::AuthUser) extractor
//! - [`policy`]: Ordered rule table applied after authentication
//! - [`exception`]: Turns auth failures into 401/403 responses
//!
//! # Request Flow
//!
//! 1. `translate_auth_failures` wraps everything below it
//! 2. `authenticate` skips exempt paths, otherwise verifies the bearer token and
//!    attaches an `AuthContext` to the request
//! 3. `authorize` looks up the first matching policy rule and checks it against
//!    the attached identity
//! 4. The handler runs, optionally extracting `AuthUser`
//!
//! A failure in steps 2 to 4 short-circuits with an `AuthRejection`, which step 1
//! renders.
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn load_profile(AuthUser(identity): AuthUser) -> impl IntoResponse {
//!     let user_id = identity.user_id();
//!     // ...
//! }
//! ```

pub mod auth;
pub mod exception;
pub mod exemption;
pub mod policy;
