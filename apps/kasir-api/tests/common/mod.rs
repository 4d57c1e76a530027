//! Test helpers for kasir-api integration tests.
//!
//! Each [`TestApp`] owns a fresh in-memory database with migrations applied
//! and drives the router directly, without binding a socket.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use kasir_api::{build_router, AppState};
use kasir_db::{CheckoutSettings, Database, DbConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_settings(CheckoutSettings::default()).await
    }

    pub async fn with_settings(settings: CheckoutSettings) -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let router = build_router(AppState::new(db.clone(), settings));
        TestApp { router, db }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    // -------------------------------------------------------------------------
    // Fixtures
    // -------------------------------------------------------------------------

    pub async fn category(&self, name: &str) -> String {
        let (status, body) = self.post("/categories", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    pub async fn sale_type(&self) -> String {
        let (status, body) = self
            .post("/transaction-types", json!({ "name": "Penjualan" }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    pub async fn supplier(&self, name: &str) -> String {
        let (status, body) = self.post("/suppliers", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    pub async fn product(&self, category_id: &str, name: &str, price: Option<i64>) -> String {
        let mut body = json!({ "name": name, "stock": 10, "categoryId": category_id });
        if let Some(price) = price {
            body["price"] = json!(price);
        }
        let (status, body) = self.post("/products", body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }
}

pub fn id_of(body: &Value) -> String {
    body["id"].as_str().unwrap().to_string()
}

pub fn msg_of(body: &Value) -> &str {
    body["msg"].as_str().unwrap()
}

pub const MISSING_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
