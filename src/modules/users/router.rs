use crate::modules::users::controller::{check_email, load_profile, promote, sign_in, sign_up};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

/// Auth routes, mounted under `/api`.
pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth", post(sign_up))
        .route("/auth/check", get(check_email))
        .route("/auth/signin", post(sign_in))
        .route("/auth/promote", put(promote))
        .route("/auth/load-profile", get(load_profile))
}
