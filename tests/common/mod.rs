//! Helpers compartidos por los tests de integración
//!
//! Levantan el router completo sobre el almacenamiento en memoria y lo
//! ejercitan con `oneshot`, sin abrir sockets.

#![allow(dead_code)]

use std::str::FromStr;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use parkly_api::{
    build_app, config::EnvironmentConfig, controllers::auth_controller::AuthController,
    state::AppState,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@parkly.co";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const PASSWORD: &str = "password123";

pub struct TestResponse {
    pub status: StatusCode,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or(Value::Null)
    }

    pub fn data(&self) -> Value {
        self.json()["data"].clone()
    }
}

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

pub fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        bcrypt_cost: 4,
        rate_limit_requests: 1_000,
        ..EnvironmentConfig::default()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: EnvironmentConfig) -> Self {
        let state = AppState::in_memory(config).unwrap();
        AuthController::new(&state)
            .bootstrap_admin("Admin", ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();

        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        self.request_with_headers(method, uri, token, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            text: String::from_utf8_lossy(&bytes).to_string(),
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// POST como si viniera de `ip` a través de un proxy
    pub async fn post_forwarded(&self, uri: &str, ip: &str, body: Value) -> TestResponse {
        self.request_with_headers(Method::POST, uri, None, Some(body), &[("x-forwarded-for", ip)])
            .await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/api/login", None, json!({ "email": email, "password": password }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.json()["token"].as_str().unwrap().to_string()
    }

    /// Registrar un usuario y devolver su token
    pub async fn register(&self, name: &str, email: &str, role: &str) -> String {
        let response = self
            .post(
                "/api/register",
                None,
                json!({ "name": name, "email": email, "password": PASSWORD, "role": role }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        self.login(email, PASSWORD).await
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Enviar una solicitud como owner y devolver su id
    pub async fn submit_request(&self, owner_token: &str, name: &str, total_spots: i32) -> String {
        let response = self
            .post(
                "/api/spots/request",
                Some(owner_token),
                spot_request_body(name, total_spots),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.data()["id"].as_str().unwrap().to_string()
    }

    /// Publicar un spot (solicitud + aprobación) y devolver su id
    pub async fn published_spot(&self, owner_token: &str, name: &str, total_spots: i32) -> String {
        let request_id = self.submit_request(owner_token, name, total_spots).await;
        let admin = self.admin_token().await;
        let response = self
            .post(
                &format!("/api/admin/requests/{}/approve", request_id),
                Some(&admin),
                json!({}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.data()["spot"]["id"].as_str().unwrap().to_string()
    }
}

pub fn spot_request_body(name: &str, total_spots: i32) -> Value {
    json!({
        "name": name,
        "address": "Calle 93 #11-20",
        "zone": "Chicó",
        "hourly_price": 5000,
        "total_spots": total_spots,
        "schedule": "24h",
        "features": ["Cubierto"],
        "has_security": true,
        "certificate": "certificado-tradicion.pdf"
    })
}

/// Decimal serializado como string o número
pub fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {}", other),
    }
}
