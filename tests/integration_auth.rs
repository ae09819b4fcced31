mod common;

use axum::http::{StatusCode, header};
use chrono::Utc;
use common::{
    TEST_PASSWORD, body_json, generate_unique_email, jwt_config, request, seed_user, setup_app,
    token_for, token_provider,
};
use serde_json::json;
use todo_auth::{Claims, Role, TokenCodec};
use tower::ServiceExt;

#[tokio::test]
async fn test_root_is_public() {
    let (app, _) = setup_app();

    let response = app.oneshot(request("GET", "/", None, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_exempt_path_without_header() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(request("GET", "/api/auth/check?email=nobody@example.com", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(false));
}

#[tokio::test]
async fn test_exempt_path_ignores_bad_token() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(request(
            "GET",
            "/api/auth/check?email=nobody@example.com",
            Some("garbage"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_check_email_blank_is_bad_request() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(request("GET", "/api/auth/check?email=", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_email_reports_duplicate() {
    let (app, repo) = setup_app();
    let email = generate_unique_email();
    seed_user(&repo, &email, Role::Common);

    let response = app
        .oneshot(request("GET", &format!("/api/auth/check?email={}", email), None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(true));
}

#[tokio::test]
async fn test_openapi_document_is_public() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(request("GET", "/api-docs/openapi.json", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"].get("/api/auth/promote").is_some());
}

#[tokio::test]
async fn test_load_profile_requires_token_despite_exemption() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(request("GET", "/api/auth/load-profile", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    assert_eq!(
        body_json(response).await,
        json!({"error": "Authentication required"})
    );
}

#[tokio::test]
async fn test_protected_path_without_token() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(request("GET", "/api/todos", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_null_placeholder_token_is_missing() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(request("GET", "/api/auth/load-profile", Some("null"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failures_share_one_body() {
    let (app, repo) = setup_app();
    let user = seed_user(&repo, &generate_unique_email(), Role::Common);
    let valid = token_for(&user);

    let mut tampered = valid.clone().into_bytes();
    let last = tampered.len() - 1;
    tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    let now = Utc::now().timestamp() as usize;
    let expired = TokenCodec::new(&jwt_config())
        .unwrap()
        .sign(&Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: Role::Common,
            iss: "todo-api".to_string(),
            iat: now - 7200,
            exp: Some(now - 3600),
        })
        .unwrap();

    let mut bodies = Vec::new();
    for token in [None, Some(tampered.as_str()), Some(expired.as_str()), Some("not-a-jwt")] {
        let response = app
            .clone()
            .oneshot(request("GET", "/api/auth/load-profile", token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{token:?}");
        bodies.push(body_json(response).await);
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_sign_up_sign_in_and_load_profile() {
    let (app, _) = setup_app();
    let email = generate_unique_email();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth",
            None,
            Some(json!({
                "email": email,
                "password": TEST_PASSWORD,
                "userName": "kim"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], email.as_str());
    assert_eq!(body["userName"], "kim");

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/signin",
            None,
            Some(json!({"email": email, "password": TEST_PASSWORD})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["role"], "COMMON");
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(token_provider().authenticate(&token).unwrap().role(), Role::Common);

    let response = app
        .oneshot(request("GET", "/api/auth/load-profile", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], email.as_str());
    assert_eq!(body["role"], "COMMON");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_sign_up_duplicate_email() {
    let (app, repo) = setup_app();
    let email = generate_unique_email();
    seed_user(&repo, &email, Role::Common);

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth",
            None,
            Some(json!({"email": email, "password": TEST_PASSWORD, "userName": "lee"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_up_validation_error() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth",
            None,
            Some(json!({"email": "not-an-email", "password": TEST_PASSWORD, "userName": "lee"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_sign_in_failures_are_indistinguishable() {
    let (app, repo) = setup_app();
    let email = generate_unique_email();
    seed_user(&repo, &email, Role::Common);

    let wrong_password = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/signin",
            None,
            Some(json!({"email": email, "password": "wrong-password"})),
        ))
        .await
        .unwrap();
    let unknown_email = app
        .oneshot(request(
            "POST",
            "/api/auth/signin",
            None,
            Some(json!({"email": generate_unique_email(), "password": TEST_PASSWORD})),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
}
