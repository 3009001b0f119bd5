//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{NaiveDate, NaiveDateTime};
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use coresuit_core::clock::FixedClock;
use coresuit_core::config::AppConfig;
use coresuit_core::config::database::Backend;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Clock behind every audit stamp
    pub clock: FixedClock,
}

impl TestApp {
    /// Create a new test application on the in-memory store
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.backend = Backend::Memory;

        let clock = FixedClock::new(Self::start());
        let state = coresuit_api::build_state(config, Arc::new(clock.clone()))
            .await
            .expect("Failed to build application state");

        Self {
            router: coresuit_api::build_app(state),
            clock,
        }
    }

    /// The instant the clock starts at
    pub fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    /// Create an example through the API and return its id
    pub async fn create_example(&self, name: &str, description: &str) -> i64 {
        let response = self
            .request(
                "POST",
                "/example",
                Some(serde_json::json!({ "Name": name, "Description": description })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_i64().expect("Created example has no id")
    }

    /// Send a request through the router
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// `errorType` of an error payload
    pub fn error_type(&self) -> &str {
        self.body["errorType"].as_str().unwrap_or_default()
    }

    /// First message of an error payload
    pub fn message(&self) -> &str {
        self.body["messages"][0].as_str().unwrap_or_default()
    }
}
