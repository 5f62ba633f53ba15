//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - A fresh in-memory database per test, with migrations applied
//! - The real router, driven in-process with `oneshot`
//! - Helpers for registering, signing in and issuing form posts

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use sqlx::SqlitePool;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::{ApiConfig, Config, DatabaseConfig, PasswordConfig, SessionConfig};
use taskdeck_shared::db::migrations::run_migrations;
use taskdeck_shared::db::pool::{self, create_pool};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> anyhow::Result<Self> {
        let db = create_pool(pool::DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let config = test_config();
        let app = build_router(AppState::new(db.clone(), config.clone()));

        Ok(TestContext { db, app, config })
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Router should not fail")
    }

    /// GET `uri`, optionally with a session cookie
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// POST a urlencoded form to `uri`, optionally with a session cookie
    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(encode_form(fields))).unwrap())
            .await
    }

    /// Registers a user and asserts success
    pub async fn register(&self, username: &str, password: &str) {
        let response = self
            .post_form(
                "/register",
                &[("username", username), ("password", password)],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    /// Signs in and returns the `Cookie` header value for the new session
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/login",
                &[("username", username), ("password", password)],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/tasks");

        session_cookie_pair(&response)
    }

    /// Registers and signs in, returning the session cookie
    pub async fn sign_up(&self, username: &str, password: &str) -> String {
        self.register(username, password).await;
        self.login(username, password).await
    }

    /// Creates a task through the API and asserts success
    pub async fn create_task(&self, cookie: &str, fields: &[(&str, &str)]) {
        let response = self.post_form("/tasks", fields, Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/tasks");
    }

    /// Fetches the dashboard JSON for `query` (e.g. "?filter=active")
    pub async fn dashboard(&self, cookie: &str, query: &str) -> serde_json::Value {
        let response = self.get(&format!("/tasks{}", query), Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }

    /// Titles of the dashboard's tasks, in display order
    pub async fn titles(&self, cookie: &str, query: &str) -> Vec<String> {
        self.dashboard(cookie, query).await["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect()
    }

    /// ID of the dashboard task titled `title`
    pub async fn task_id(&self, cookie: &str, title: &str) -> i64 {
        self.dashboard(cookie, "").await["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["title"] == title)
            .and_then(|t| t["id"].as_i64())
            .unwrap_or_else(|| panic!("No task titled {:?}", title))
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        session: SessionConfig {
            secret: TEST_SECRET.to_string(),
            ttl_hours: 1,
            secure_cookies: false,
        },
        // Minimum cost keeps hashing fast in tests
        password: PasswordConfig { bcrypt_cost: 4 },
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).expect("Form fields should encode")
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// The raw `Set-Cookie` header of a response
pub fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Missing Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` part of the `Set-Cookie` header, usable as a `Cookie` header
pub fn session_cookie_pair(response: &Response<Body>) -> String {
    set_cookie(response)
        .split(';')
        .next()
        .unwrap()
        .trim()
        .to_string()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
