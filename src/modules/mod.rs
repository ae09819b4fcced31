pub mod users;

pub use self::users::model::{LoginRequest, LoginResponse, User};
pub use self::users::repository::{InMemoryUserRepository, PgUserRepository, UserRepository};
