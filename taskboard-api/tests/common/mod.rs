//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An app wired to the in-memory store
//! - Signed-in test users (plain, admin, banned)
//! - Request helpers returning status, headers and JSON body

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{ApiConfig, Config, DatabaseConfig, SessionConfig};
use taskboard_api::cookie::SESSION_COOKIE;
use taskboard_shared::auth::session::{generate_token, hash_token, ClientInfo, SignUp};
use taskboard_shared::models::session::CreateSession;
use taskboard_shared::models::user::{BanUpdate, User};
use taskboard_shared::store::Repositories;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "correct horse battery";

/// A signed-in user and the cookie that carries their session
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn cookie(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.token)
    }
}

/// Response as seen by a test
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub state: AppState,
    pub app: Router,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:3000".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        session: SessionConfig { ttl_hours: 1 },
    }
}

impl TestContext {
    /// Creates a new test context over an empty in-memory store
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let state = AppState::new(config, Repositories::in_memory());
        let app = build_router(state.clone());
        Self { state, app }
    }

    /// Signs up a fresh user through the session manager
    pub async fn user(&self) -> TestUser {
        let issued = self
            .state
            .sessions
            .sign_up(
                SignUp {
                    email: format!("test-{}@example.com", Uuid::new_v4()),
                    password: PASSWORD.to_string(),
                    name: "Test User".to_string(),
                    image: None,
                },
                ClientInfo::default(),
            )
            .await
            .unwrap();

        TestUser {
            user: issued.user,
            token: issued.token,
        }
    }

    /// A signed-in user holding the `admin` role
    pub async fn admin(&self) -> TestUser {
        let mut admin = self.user().await;
        admin.user = self
            .state
            .admin
            .set_role(&admin.user.id, &["admin".to_string()])
            .await
            .unwrap();
        admin
    }

    /// A signed-in user whose ban lifts at `expires` (`None` = never)
    pub async fn banned_user(&self, expires: Option<chrono::DateTime<Utc>>) -> TestUser {
        let mut user = self.user().await;
        user.user = self
            .state
            .repos
            .auth
            .set_user_ban(
                &user.user.id,
                BanUpdate {
                    banned: true,
                    reason: Some("test".to_string()),
                    expires,
                },
            )
            .await
            .unwrap()
            .unwrap();
        user
    }

    /// A cookie for a session that expired a minute ago
    pub async fn expired_session(&self, user: &User) -> String {
        let token = generate_token();
        self.state
            .repos
            .auth
            .create_session(CreateSession {
                token_hash: hash_token(&token),
                user_id: user.id.clone(),
                expires_at: Utc::now() - Duration::minutes(1),
                ip_address: None,
                user_agent: None,
            })
            .await
            .unwrap();
        format!("{}={}", SESSION_COOKIE, token)
    }

    /// Sends a request; `body` is sent as JSON when present
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, cookie, Some(body)).await
    }

    pub async fn put(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, cookie, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, cookie, None).await
    }

    /// Creates a project through the API and returns its JSON
    pub async fn create_project(&self, cookie: &str, name: &str) -> Value {
        let res = self
            .post(
                "/api/projects",
                Some(cookie),
                serde_json::json!({ "name": name }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["data"].clone()
    }

    /// Creates a task through the API and returns its JSON
    pub async fn create_task(&self, cookie: &str, project_id: &str, title: &str) -> Value {
        let res = self
            .post(
                "/api/tasks",
                Some(cookie),
                serde_json::json!({ "projectId": project_id, "title": title }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["data"].clone()
    }
}
