//! Shared infrastructure for the HTTP integration tests
//!
//! Each [`TestContext`] builds the real router over fresh in-memory
//! repositories, so tests are isolated and need no database.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service as _;
use uuid::Uuid;

use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::Config;
use taskdeck_shared::models::{Task, TaskFields};
use taskdeck_shared::store::{
    MemoryTaskRepository, MemoryUserRepository, StoreError, TaskRepository,
};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Task store that counts every call before delegating
#[derive(Default)]
pub struct CountingTasks {
    inner: MemoryTaskRepository,
    calls: AtomicUsize,
}

impl CountingTasks {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskRepository for CountingTasks {
    async fn list(&self, owner: Uuid) -> Result<Vec<Task>, StoreError> {
        self.hit();
        self.inner.list(owner).await
    }

    async fn create(&self, owner: Uuid, fields: TaskFields) -> Result<Task, StoreError> {
        self.hit();
        self.inner.create(owner, fields).await
    }

    async fn update(&self, id: Uuid, owner: Uuid, fields: TaskFields) -> Result<Task, StoreError> {
        self.hit();
        self.inner.update(id, owner, fields).await
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), StoreError> {
        self.hit();
        self.inner.delete(id, owner).await
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}

/// Test context containing the router and a handle on its task store
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub tasks: Arc<CountingTasks>,
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();
        let tasks = Arc::new(CountingTasks::default());

        let state = AppState::new(
            config,
            Arc::new(MemoryUserRepository::new()),
            tasks.clone(),
            None,
        )
        .expect("state");

        Self {
            app: build_router(state.clone()),
            state,
            tasks,
        }
    }

    /// Sends a request and returns the status and parsed JSON body
    ///
    /// An empty body comes back as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    /// Signs up a fresh user and returns their token and ID
    pub async fn signup(&self, name: &str) -> (String, Uuid) {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/signup",
                None,
                Some(json!({
                    "username": name,
                    "email": format!("{name}-{}@example.com", Uuid::new_v4()),
                    "password": "correct horse battery staple",
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");

        let token = body["token"].as_str().unwrap().to_string();
        let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
        (token, id)
    }

    /// Creates a task through the API, returning its JSON
    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let (status, task) = self.send(Method::POST, "/tasks", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {task}");
        task
    }

    pub async fn list_tasks(&self, token: &str) -> Vec<Value> {
        let (status, body) = self.send(Method::GET, "/tasks", Some(token), None).await;
        assert_eq!(status, StatusCode::OK, "list failed: {body}");
        body.as_array().cloned().unwrap()
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "STORAGE_BACKEND" => Some("memory".to_string()),
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        _ => None,
    })
    .expect("test config")
}
