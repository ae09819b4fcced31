#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use todo_api::modules::users::model::User;
use todo_api::modules::users::repository::{InMemoryUserRepository, UserRepository};
use todo_api::router::init_router;
use todo_api::state::AppState;
use todo_auth::{Role, TokenProvider};
use todo_config::{CorsConfig, JwtConfig, SecurityConfig};
use todo_core::hash_password;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpass123";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        issuer: "todo-api".to_string(),
        access_token_expiry: Some(3600),
        leeway_secs: 0,
    }
}

pub fn token_provider() -> TokenProvider {
    TokenProvider::new(&jwt_config()).unwrap()
}

pub fn setup_state(users: Arc<dyn UserRepository>) -> AppState {
    AppState::new(
        users,
        &jwt_config(),
        &SecurityConfig::default(),
        CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
    )
    .unwrap()
}

pub fn setup_app_with(users: Arc<dyn UserRepository>) -> Router {
    init_router(setup_state(users))
}

pub fn setup_app() -> (Router, Arc<InMemoryUserRepository>) {
    let repo = Arc::new(InMemoryUserRepository::new());
    (setup_app_with(repo.clone()), repo)
}

pub fn generate_unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

/// Stores a user directly, bypassing sign-up.
pub fn seed_user(repo: &InMemoryUserRepository, email: &str, role: Role) -> User {
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password: hash_password(TEST_PASSWORD).unwrap(),
        user_name: "tester".to_string(),
        role,
        join_date: Utc::now(),
    };
    repo.insert(user.clone());
    user
}

pub fn token_for(user: &User) -> String {
    token_provider()
        .issue(user.id, &user.email, user.role)
        .unwrap()
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
