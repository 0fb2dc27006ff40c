use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{json, Value};
use tower::ServiceExt;

use configs::AppConfig;
use server::startup::build_app;

const KEY: &str = "test-secret";

fn build_test_app() -> anyhow::Result<Router> {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_sign_key = KEY.into();
    Ok(build_app(&cfg)?)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?;
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

fn subject_of(token: &str) -> String {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Value>(token, &DecodingKey::from_secret(KEY.as_bytes()), &validation).unwrap();
    data.claims["sub"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let app = build_test_app()?;
    let req = Request::builder().uri("/health").body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn test_register_and_login_flow() -> anyhow::Result<()> {
    let app = build_test_app()?;

    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({"username": "gholi", "email": "gholi@gmail.com", "password": "1234567", "repeatPassword": "1234567"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let registered_sub = subject_of(body["token"].as_str().unwrap());

    let (status, body) = post_json(&app, "/auth/login", json!({"email": "gholi@gmail.com", "password": "1234567"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(subject_of(body["token"].as_str().unwrap()), registered_sub);
    Ok(())
}

#[tokio::test]
async fn test_login_seeded_user() -> anyhow::Result<()> {
    let app = build_test_app()?;
    let (status, body) = post_json(&app, "/auth/login", json!({"email": "jack@gmail.com", "password": "1234567"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(subject_of(body["token"].as_str().unwrap()), "54215f2a-b752-11eb-8529-0242ac130003");
    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password_matches_unknown_email() -> anyhow::Result<()> {
    let app = build_test_app()?;

    let (wrong_status, wrong_body) =
        post_json(&app, "/auth/login", json!({"email": "jack@gmail.com", "password": "wrong"})).await?;
    let (unknown_status, unknown_body) =
        post_json(&app, "/auth/login", json!({"email": "ghost@gmail.com", "password": "wrong"})).await?;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "email and the password don't match");
    Ok(())
}

#[tokio::test]
async fn test_register_conflicts() -> anyhow::Result<()> {
    let app = build_test_app()?;

    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({"username": "jackie", "email": "jack@gmail.com", "password": "1234567", "repeatPassword": "1234567"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email is already taken");

    // both fields collide: the email conflict wins
    let (status, _) = post_json(
        &app,
        "/auth/register",
        json!({"username": "twice", "email": "twice@gmail.com", "password": "1234567", "repeatPassword": "1234567"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({"username": "twice", "email": "twice@gmail.com", "password": "1234567", "repeatPassword": "1234567"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email is already taken");
    Ok(())
}

#[tokio::test]
async fn test_register_username_taken() -> anyhow::Result<()> {
    let app = build_test_app()?;
    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({"username": "john_", "email": "fresh@gmail.com", "password": "1234567", "repeatPassword": "1234567"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({"username": "john_", "email": "other@gmail.com", "password": "1234567", "repeatPassword": "1234567"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "username is already taken");
    Ok(())
}

#[tokio::test]
async fn test_register_password_mismatch() -> anyhow::Result<()> {
    let app = build_test_app()?;
    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({"username": "gholi", "email": "gholi@gmail.com", "password": "1234567", "repeatPassword": "7654321"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "passwords don't match");

    // nothing was stored
    let (status, _) = post_json(&app, "/auth/login", json!({"email": "gholi@gmail.com", "password": "1234567"})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_field_validation() -> anyhow::Result<()> {
    let app = build_test_app()?;
    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({"username": "abc", "email": "not-an-email", "password": "1234567", "repeatPassword": "1234567"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "FieldError");
    assert!(body["more"]["username"].is_string());
    assert!(body["more"]["email"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_malformed_body() -> anyhow::Result<()> {
    let app = build_test_app()?;
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["message"], "can't parse body to json");
    Ok(())
}

#[tokio::test]
async fn test_openapi_document_served() -> anyhow::Result<()> {
    let app = build_test_app()?;
    let req = Request::builder().uri("/api-docs/openapi.json").body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let doc: Value = serde_json::from_slice(&bytes)?;
    assert!(doc["paths"]["/auth/login"].is_object());
    Ok(())
}
