//! End-to-end HTTP tests over the in-memory account store.

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Request, StatusCode,
    },
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use totp_rs::{Algorithm, Secret, TOTP};
use tower::ServiceExt;

use crate::api::router;
use crate::auth::{AuthConfig, AuthService};
use crate::store::MemoryAccountStore;

fn app() -> Router {
    let service = AuthService::new(
        Arc::new(MemoryAccountStore::new()),
        AuthConfig::new("EPL Zone".to_string()),
    );
    router(Arc::new(service))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json_with_cookie(uri: &str, cookie: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// First `name=value` pair of the Set-Cookie header.
fn session_cookie_of(response: &Response) -> String {
    let header = response
        .headers()
        .get(SET_COOKIE)
        .expect("missing set-cookie header")
        .to_str()
        .unwrap();
    header.split(';').next().unwrap().to_string()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn current_code(secret: &str) -> String {
    let secret_bytes = Secret::Encoded(secret.to_string()).to_bytes().unwrap();
    let totp = TOTP::new(
        Algorithm::SHA1,
        6,
        0,
        30,
        secret_bytes,
        Some("EPL Zone".to_string()),
        "account".to_string(),
    )
    .unwrap();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    totp.generate(now)
}

#[tokio::test]
async fn full_client_journey_over_http() {
    let app = app();

    // register
    let response = app
        .clone()
        .oneshot(post_json(
            "/register/client",
            json!({"username": "alice", "email": "alice@example.com", "password": "pw1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let setup_cookie = session_cookie_of(&response);
    assert!(setup_cookie.contains("mfa_setup_"));

    // enrollment material
    let response = app
        .clone()
        .oneshot(get_with_cookie("/setup-mfa", &setup_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let secret = body["secret"].as_str().unwrap().to_string();
    assert!(body["otpauth_url"].as_str().unwrap().contains("EPL%20Zone"));

    // confirm enrollment; cookie is cleared and login is next
    let code = current_code(&secret);
    let response = app
        .clone()
        .oneshot(post_json_with_cookie(
            "/setup-mfa",
            &setup_cookie,
            json!({"code": code}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));
    let body = body_json(response).await;
    assert_eq!(body["redirect"], "/client-login");

    // password login yields a pending challenge
    let response = app
        .clone()
        .oneshot(post_json(
            "/client-login",
            json!({"username": "alice", "password": "pw1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let challenge_cookie = session_cookie_of(&response);
    assert!(challenge_cookie.contains("mfa_challenge_"));
    let body = body_json(response).await;
    assert_eq!(body["mfa_required"], true);
    assert_eq!(body["redirect"], "/verify-2fa");

    // the pending token opens the challenge page and nothing else
    let response = app
        .clone()
        .oneshot(get_with_cookie("/verify-2fa", &challenge_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app
        .clone()
        .oneshot(get_with_cookie("/live", &challenge_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // pass the challenge
    let code = current_code(&secret);
    let response = app
        .clone()
        .oneshot(post_json_with_cookie(
            "/verify-2fa",
            &challenge_cookie,
            json!({"code": code}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session_cookie = session_cookie_of(&response);
    let body = body_json(response).await;
    assert_eq!(body["mfa_required"], false);
    assert_eq!(body["redirect"], "/live");

    // full session works for the client landing, not the admin one
    let response = app
        .clone()
        .oneshot(get_with_cookie("/session", &session_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "client");

    let response = app
        .clone()
        .oneshot(get_with_cookie("/live", &session_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app
        .clone()
        .oneshot(get_with_cookie("/dashboard", &session_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // logout kills the session
    let response = app
        .clone()
        .oneshot(get_with_cookie("/logout", &session_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app
        .clone()
        .oneshot(get_with_cookie("/session", &session_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn admin_without_mfa_logs_in_directly() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/register/admin",
            json!({"username": "root", "password": "pw1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // enrollment was never finished; login is password-only
    let response = app
        .clone()
        .oneshot(post_json(
            "/admin-login",
            json!({"username": "root", "password": "pw1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie_of(&response);
    let body = body_json(response).await;
    assert_eq!(body["mfa_required"], false);
    assert_eq!(body["redirect"], "/dashboard");

    let response = app
        .clone()
        .oneshot(get_with_cookie("/dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = app();
    app.clone()
        .oneshot(post_json(
            "/register/client",
            json!({"username": "alice", "password": "pw1"}),
        ))
        .await
        .unwrap();

    let mut bodies = Vec::new();
    for payload in [
        json!({"username": "alice", "password": "wrong"}),
        json!({"username": "nobody", "password": "pw1"}),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/client-login", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        bodies.push(bytes);
    }
    assert_eq!(bodies[0], bodies[1]);

    // cross-role: correct client credentials on the admin route
    let response = app
        .clone()
        .oneshot(post_json(
            "/admin-login",
            json!({"username": "alice", "password": "pw1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let app = app();
    let first = app
        .clone()
        .oneshot(post_json(
            "/register/client",
            json!({"username": "alice", "password": "pw1"}),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .clone()
        .oneshot(post_json(
            "/register/admin",
            json!({"username": "alice", "password": "pw2"}),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_requests_are_bad_requests() {
    let app = app();

    // unknown role segment
    let response = app
        .clone()
        .oneshot(post_json(
            "/register/referee",
            json!({"username": "alice", "password": "pw1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // bad email shape
    let response = app
        .clone()
        .oneshot(post_json(
            "/register/client",
            json!({"username": "alice", "email": "not-an-email", "password": "pw1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // missing payload
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/client-login")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recovery_is_gated_on_enrolled_mfa() {
    let app = app();
    app.clone()
        .oneshot(post_json(
            "/register/client",
            json!({"username": "alice", "email": "alice@example.com", "password": "pw1"}),
        ))
        .await
        .unwrap();

    // not enrolled: recovery refused outright
    let response = app
        .clone()
        .oneshot(post_json(
            "/forgot-password",
            json!({"email": "alice@example.com", "code": "123456", "new_password": "pw2"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // unknown email
    let response = app
        .clone()
        .oneshot(post_json(
            "/forgot-password",
            json!({"email": "nobody@example.com", "code": "123456", "new_password": "pw2"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // empty replacement password
    let response = app
        .clone()
        .oneshot(post_json(
            "/forgot-password",
            json!({"email": "alice@example.com", "code": "123456", "new_password": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pending_setup_token_unlocks_only_setup() {
    let app = app();
    let response = app
        .clone()
        .oneshot(post_json(
            "/register/client",
            json!({"username": "alice", "password": "pw1"}),
        ))
        .await
        .unwrap();
    let setup_cookie = session_cookie_of(&response);

    for uri in ["/live", "/dashboard", "/verify-2fa"] {
        let response = app
            .clone()
            .oneshot(get_with_cookie(uri, &setup_cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
    // and the session probe reports none
    let response = app
        .clone()
        .oneshot(get_with_cookie("/session", &setup_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
