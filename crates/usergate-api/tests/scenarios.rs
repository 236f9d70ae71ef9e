//! 로그인부터 관리자 전용 엔드포인트까지의 전체 요청 흐름 테스트.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE},
        Request, StatusCode,
    },
    response::Response,
    Router,
};
use chrono::Utc;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use usergate_api::{create_api_router, create_test_state, seed_admin, AppState};
use usergate_core::{AdminSeedConfig, IdentityStore, Role};

const ADMIN_USERNAME: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "Adm1nPassw0rd";

struct TestApp {
    state: Arc<AppState>,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let state = Arc::new(create_test_state());
        seed_admin(
            state.store.as_ref(),
            &AdminSeedConfig {
                username: Some(ADMIN_USERNAME.to_string()),
                password: Some(SecretString::from(ADMIN_PASSWORD)),
                name: Some("Admin".to_string()),
                last_name: Some("User".to_string()),
            },
        )
        .await
        .unwrap();

        let router = create_api_router().with_state(state.clone());
        Self { state, router }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn delete(&self, uri: &str, token: &str) -> Response {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn create_user(&self, username: &str, password: &str) -> Value {
        let response = self
            .post_json(
                "/v1/users",
                json!({ "username": username, "password": password, "role": "user" }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    async fn login(&self, username: &str, password: &str) -> Response {
        self.post_json(
            "/v1/login",
            json!({ "username": username, "password": password }),
            None,
        )
        .await
    }

    async fn token_for(&self, username: &str, password: &str) -> String {
        let response = self.login(username, password).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_user_login_issues_user_token() {
    let app = TestApp::new().await;
    app.create_user("alice", "secret123").await;

    let response = app.login("alice", "secret123").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap();
    let claims = app.state.tokens.verify(token, Utc::now()).unwrap();
    assert_eq!(claims.role, Role::User);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password").is_none());

    // 프로필이 없어도 name/lastName 키는 null로 존재
    let user = body["user"].as_object().unwrap();
    assert_eq!(user.get("name"), Some(&Value::Null));
    assert_eq!(user.get("lastName"), Some(&Value::Null));
}

#[tokio::test]
async fn test_short_password_without_digits_is_accepted() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/v1/users",
            json!({ "username": "carol", "password": "abcdef" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.login("carol", "abcdef").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_password_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/v1/users", json!({ "username": "dave", "password": "" }), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = TestApp::new().await;
    app.create_user("alice", "secret123").await;

    let response = app.login("alice", "wrongpass").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_token_on_admin_endpoint_is_forbidden() {
    let app = TestApp::new().await;
    app.create_user("alice", "secret123").await;
    let token = app.token_for("alice", "secret123").await;

    let response = app.get("/v1/users", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_can_list_users() {
    let app = TestApp::new().await;
    app.create_user("alice", "secret123").await;
    let token = app.token_for(ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = app.get("/v1/users", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    let usernames: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(usernames, vec![ADMIN_USERNAME, "alice"]);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new().await;
    let token = app.token_for(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let admin = app
        .state
        .store
        .find_by_username(ADMIN_USERNAME)
        .await
        .unwrap()
        .unwrap();

    let response = app.delete(&format!("/v1/users/{}", admin.id), &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert!(app.state.store.find_by_id(admin.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admin_deletes_user_and_token_stops_working() {
    let app = TestApp::new().await;
    let created = app.create_user("alice", "secret123").await;
    let alice_id = created["user"]["id"].as_i64().unwrap();
    let alice_token = app.token_for("alice", "secret123").await;
    let admin_token = app.token_for(ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = app.delete(&format!("/v1/users/{}", alice_id), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let again = app.delete(&format!("/v1/users/{}", alice_id), &admin_token).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    // 삭제된 사용자의 토큰은 서명이 유효해도 거부됨
    let response = app.get("/v1/users", Some(&alice_token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_authorization_header_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.get("/v1/users", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[tokio::test]
async fn test_malformed_token_is_unauthorized() {
    let app = TestApp::new().await;

    for token in ["not-a-token", "a.b.c", ""] {
        let response = app.get("/v1/users", Some(token)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "token: {:?}", token);
    }
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = TestApp::new().await;
    app.create_user("alice", "secret123").await;

    let response = app
        .post_json(
            "/v1/users",
            json!({ "username": "alice", "password": "another123" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_role_creation_requires_admin_token() {
    let app = TestApp::new().await;
    let body = json!({ "username": "root", "password": "r00tpassword", "role": "admin" });

    let anonymous = app.post_json("/v1/users", body.clone(), None).await;
    assert_eq!(anonymous.status(), StatusCode::FORBIDDEN);

    app.create_user("alice", "secret123").await;
    let user_token = app.token_for("alice", "secret123").await;
    let as_user = app.post_json("/v1/users", body.clone(), Some(&user_token)).await;
    assert_eq!(as_user.status(), StatusCode::FORBIDDEN);

    let admin_token = app.token_for(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let as_admin = app.post_json("/v1/users", body, Some(&admin_token)).await;
    assert_eq!(as_admin.status(), StatusCode::CREATED);
    assert_eq!(body_json(as_admin).await["user"]["role"], "admin");
}

#[tokio::test]
async fn test_create_user_validation_errors() {
    let app = TestApp::new().await;

    let cases = [
        json!({ "username": "bob" }),
        json!({ "password": "secret123" }),
        json!({ "username": "bob", "password": "secret123", "role": "superuser" }),
        json!({ "username": "bob", "password": "secret123", "birthDate": "31/12/1990" }),
    ];

    for body in cases {
        let response = app.post_json("/v1/users", body.clone(), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_root_and_health_are_public() {
    let app = TestApp::new().await;

    assert_eq!(app.get("/", None).await.status(), StatusCode::OK);
    assert_eq!(app.get("/health", None).await.status(), StatusCode::OK);
    assert_eq!(app.get("/health/ready", None).await.status(), StatusCode::OK);
}
