//! Router tests driven through an in-memory user store

use std::{sync::Arc, time::Instant};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::jwt::{JwtConfig, JwtService};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::create_router;
use crate::{
    AppState,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    test_support::InMemoryUserStore,
};

const PASSWORD: &str = "Str0ng!Pass";

struct TestApp {
    router: Router,
    store: Arc<InMemoryUserStore>,
    jwt: JwtService,
}

fn test_app(store: InMemoryUserStore) -> TestApp {
    let store = Arc::new(store);
    let jwt = JwtService::new(JwtConfig {
        secret: "auth-route-test-secret".to_string(),
        access_token_expiry: 900,
    });

    let state = AppState {
        users: store.clone(),
        jwt_service: jwt.clone(),
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
    };

    TestApp {
        router: create_router(state),
        store,
        jwt,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn me(token: Option<&str>) -> Request<Body> {
    let mut request = Request::get("/auth/me");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    request.body(Body::empty()).expect("request")
}

async fn register(app: &TestApp, username: &str) -> (StatusCode, Value) {
    let body = json!({
        "username": username,
        "email": format!("{username}@example.org"),
        "password": PASSWORD,
    });
    send(&app.router, post_json("/auth/register", &body)).await
}

async fn login(app: &TestApp, username: &str, password: &str) -> (StatusCode, Value) {
    let body = json!({ "username": username, "password": password });
    send(&app.router, post_json("/auth/login", &body)).await
}

#[tokio::test]
async fn test_health() {
    let app = test_app(InMemoryUserStore::default());
    let (status, body) = send(
        &app.router,
        Request::get("/health").body(Body::empty()).expect("request"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "auth-service");
}

#[tokio::test]
async fn test_register_returns_user_without_password() {
    let app = test_app(InMemoryUserStore::default());

    let (status, body) = register(&app, "ward_watch").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "ward_watch");
    assert_eq!(body["email"], "ward_watch@example.org");
    assert_eq!(body["is_admin"], false);
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let stored = app.store.users();
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].password_hash, PASSWORD);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app(InMemoryUserStore::default());
    assert_eq!(register(&app, "ward_watch").await.0, StatusCode::CREATED);

    let (status, body) = register(&app, "ward_watch").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username or email already registered");
    assert_eq!(app.store.users().len(), 1);
}

#[tokio::test]
async fn test_register_validation() {
    let app = test_app(InMemoryUserStore::default());

    let weak = json!({ "username": "ward_watch", "email": "w@example.org", "password": "password" });
    let (status, body) = send(&app.router, post_json("/auth/register", &weak)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must contain at least one uppercase letter");

    let bad_name = json!({ "username": "ward watch", "email": "w@example.org", "password": PASSWORD });
    let (status, _) = send(&app.router, post_json("/auth/register", &bad_name)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = json!({ "username": "ward_watch", "password": PASSWORD });
    let (status, body) = send(&app.router, post_json("/auth/register", &missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(app.store.users().is_empty());
}

#[tokio::test]
async fn test_login_issues_verifiable_token() {
    let app = test_app(InMemoryUserStore::default());
    let (_, registered) = register(&app, "ward_watch").await;

    let (status, body) = login(&app, "ward_watch", PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    assert_eq!(body["user"]["id"], registered["id"]);
    assert!(body["user"].get("password_hash").is_none());

    let claims = app
        .jwt
        .validate_token(body["access_token"].as_str().expect("token"))
        .expect("valid token");
    assert_eq!(claims.sub.to_string(), registered["id"]);
    assert_eq!(claims.username, "ward_watch");
    assert!(!claims.admin);
}

#[tokio::test]
async fn test_login_accepts_email() {
    let app = test_app(InMemoryUserStore::default());
    register(&app, "ward_watch").await;

    let (status, body) = login(&app, "ward_watch@example.org", PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "ward_watch");
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let app = test_app(InMemoryUserStore::default());
    register(&app, "ward_watch").await;

    let (status, body) = login(&app, "ward_watch", "Wr0ng!Pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");

    let (status, body) = login(&app, "nobody", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_unknown_user_costs_a_password_verification() {
    let app = test_app(InMemoryUserStore::default());
    register(&app, "ward_watch").await;

    let started = Instant::now();
    assert_eq!(
        login(&app, "ward_watch", "Wr0ng!Pass").await.0,
        StatusCode::UNAUTHORIZED
    );
    let known = started.elapsed();

    // warm the one-off dummy hash so only the verification is timed
    login(&app, "nobody", PASSWORD).await;

    let started = Instant::now();
    assert_eq!(
        login(&app, "someone_else", PASSWORD).await.0,
        StatusCode::UNAUTHORIZED
    );
    let unknown = started.elapsed();

    assert!(
        unknown * 4 >= known,
        "unknown user answered in {unknown:?}, known user in {known:?}"
    );
}

#[tokio::test]
async fn test_repeated_failures_are_throttled() {
    let app = test_app(InMemoryUserStore::default());
    register(&app, "ward_watch").await;

    for _ in 0..5 {
        assert_eq!(
            login(&app, "ward_watch", "Wr0ng!Pass").await.0,
            StatusCode::UNAUTHORIZED
        );
    }

    // banned even with the right password
    let (status, body) = login(&app, "ward_watch", PASSWORD).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many login attempts, try again later");
}

#[tokio::test]
async fn test_successful_login_resets_failures() {
    let app = test_app(InMemoryUserStore::default());
    register(&app, "ward_watch").await;

    for _ in 0..4 {
        login(&app, "ward_watch", "Wr0ng!Pass").await;
    }
    assert_eq!(login(&app, "ward_watch", PASSWORD).await.0, StatusCode::OK);

    for _ in 0..5 {
        assert_eq!(
            login(&app, "ward_watch", "Wr0ng!Pass").await.0,
            StatusCode::UNAUTHORIZED
        );
    }
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let app = test_app(InMemoryUserStore::default());
    let (_, registered) = register(&app, "ward_watch").await;
    let (_, session) = login(&app, "ward_watch", PASSWORD).await;
    let token = session["access_token"].as_str().expect("token");

    let (status, body) = send(&app.router, me(Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], registered["id"]);
    assert!(body.get("password_hash").is_none());

    let (status, body) = send(&app.router, me(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(&app.router, me(Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_rejects_token_of_deleted_user() {
    let app = test_app(InMemoryUserStore::default());
    register(&app, "ward_watch").await;
    let (_, session) = login(&app, "ward_watch", PASSWORD).await;
    let token = session["access_token"].as_str().expect("token");

    let id = app.store.users()[0].id;
    app.store.remove(id);

    let (status, _) = send(&app.router, me(Some(token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_store_failure_is_generic_500() {
    let app = test_app(InMemoryUserStore::failing());

    let (status, body) = register(&app, "ward_watch").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}
