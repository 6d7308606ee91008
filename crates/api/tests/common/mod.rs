#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use dealergpt_api::auth::jwt::{generate_access_token, JwtConfig};
use dealergpt_api::auth::password::hash_password;
use dealergpt_api::config::{DealerGptConfig, ServerConfig};
use dealergpt_api::router::build_app_router;
use dealergpt_api::state::AppState;
use dealergpt_db::models::user::{CreateUser, User};
use dealergpt_db::repositories::UserRepo;
use dealergpt_llm::{ChatCompletion, ChatMessage, LlmError};

pub const TEST_PASSWORD: &str = "forecourt-password-1";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
        dealergpt: DealerGptConfig::default(),
    }
}

/// Model double: answers with a fixed string, or fails every call.
pub struct ScriptedLlm {
    answer: Option<String>,
}

impl ScriptedLlm {
    pub fn answering(answer: &str) -> Arc<dyn ChatCompletion> {
        Arc::new(Self {
            answer: Some(answer.to_string()),
        })
    }

    pub fn failing() -> Arc<dyn ChatCompletion> {
        Arc::new(Self { answer: None })
    }
}

#[async_trait]
impl ChatCompletion for ScriptedLlm {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.answer.clone().ok_or(LlmError::NotConfigured)
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        self.answer.is_some()
    }
}

/// The full application over `pool`, with a model that always answers.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, ScriptedLlm::answering("Here is what I found."))
}

pub fn build_test_app_with(pool: PgPool, llm: Arc<dyn ChatCompletion>) -> Router {
    let state = AppState::new(pool, test_config(), llm, Duration::from_secs(5));
    build_app_router(state)
}

/// Insert a user with [`TEST_PASSWORD`] and return it with a bearer token.
pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@dealer.test"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            first_name: "Test".to_string(),
            last_name: username.to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap();
    let token = generate_access_token(user.id, role, &test_config().jwt).unwrap();
    (user, token)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}
