//! # Todo Core
//!
//! Foundational types shared by every crate of the Todo API:
//!
//! - [`errors`]: the application error type and its HTTP rendering
//! - [`password`]: bcrypt hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use todo_core::{AppError, hash_password, verify_password};
//!
//! let hash = hash_password("secure_password")?;
//! if !verify_password("secure_password", &hash)? {
//!     return Err(AppError::unauthorized(anyhow::anyhow!("Invalid email or password")));
//! }
//! ```

pub mod errors;
pub mod password;

pub use errors::AppError;
pub use password::{hash_password, verify_password};
