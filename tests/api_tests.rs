mod common;

use axum::http::{Method, StatusCode};
use common::{spot_request_body, test_config, TestApp, PASSWORD};
use parkly_api::services::chatbot_service::{EMPTY_MESSAGE_REPLY, INVALID_CONVERSATION_REPLY};
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["redis"], "disabled");
}

#[tokio::test]
async fn test_metrics_exposition() {
    let app = TestApp::new().await;
    let response = app.get("/metrics", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("parkly_bookings_created_total 0"));
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new().await;
    let token = app.register("Sofía Ruiz", "Sofia@Parkly.co", "client").await;

    let response = app.get("/api/me", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let me = response.data();
    assert_eq!(me["email"], "sofia@parkly.co");
    assert_eq!(me["role"], "client");
    assert!(me.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_admin_role_and_duplicates() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/register",
            None,
            json!({ "name": "Root", "email": "root@parkly.co", "password": PASSWORD, "role": "admin" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    app.register("Ana", "ana@parkly.co", "owner").await;
    let response = app
        .post(
            "/api/register",
            None,
            json!({ "name": "Ana 2", "email": "ANA@parkly.co", "password": PASSWORD, "role": "client" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json()["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/register",
            None,
            json!({ "name": "Leo", "email": "no-es-email", "password": "corta", "role": "client" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = TestApp::new().await;
    app.register("Leo", "leo@parkly.co", "client").await;

    let response = app
        .post("/api/login", None, json!({ "email": "leo@parkly.co", "password": "incorrecta" }))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    let response = app.get("/api/reservations", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.get("/api/me", Some("not-a-jwt")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = TestApp::new().await;
    let client = app.register("Leo", "leo@parkly.co", "client").await;

    let response = app.get("/api/admin/stats", Some(&client)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let response = app.get("/api/admin/stats", Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_filters_sort_and_zones() {
    let app = TestApp::new().await;
    let owner = app.register("Olga", "olga@parkly.co", "owner").await;
    let admin = app.admin_token().await;

    // Un spot barato sin seguridad en otra zona
    let mut cheap = spot_request_body("Zeta Parking", 3);
    cheap["zone"] = json!("Usaquén");
    cheap["hourly_price"] = json!(3000);
    cheap["has_security"] = json!(false);
    let response = app.post("/api/spots/request", Some(&owner), cheap).await;
    let cheap_id = response.data()["id"].as_str().unwrap().to_string();
    app.post(&format!("/api/admin/requests/{}/approve", cheap_id), Some(&admin), json!({}))
        .await;

    app.published_spot(&owner, "Alfa Parking", 2).await;

    let response = app.get("/api/spots", None).await;
    let names: Vec<String> = response
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Alfa Parking", "Zeta Parking"]);

    let response = app.get("/api/spots?sort=price", None).await;
    assert_eq!(response.data()[0]["name"], "Zeta Parking");

    let response = app.get("/api/spots?has_security=true&max_price=6000", None).await;
    let data = response.data();
    assert_eq!(data.as_array().unwrap().len(), 1);
    assert_eq!(data[0]["name"], "Alfa Parking");
    assert_eq!(data[0]["available"], true);
    assert!(data[0].get("earnings").is_none());

    let response = app.get("/api/spots?q=usaqu", None).await;
    assert_eq!(response.data().as_array().unwrap().len(), 1);

    let response = app.get("/api/zones", None).await;
    assert_eq!(response.data(), json!(["Chicó", "Usaquén"]));
}

#[tokio::test]
async fn test_unknown_spot_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .get("/api/spots/00000000-0000-0000-0000-000000000000", None)
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_spot_request_validation() {
    let app = TestApp::new().await;
    let owner = app.register("Olga", "olga@parkly.co", "owner").await;

    let mut body = spot_request_body("Sin dirección", 4);
    body["address"] = json!("   ");
    let response = app.post("/api/spots/request", Some(&owner), body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut body = spot_request_body("Gratis", 4);
    body["hourly_price"] = json!(0);
    let response = app.post("/api/spots/request", Some(&owner), body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post("/api/spots/request", Some(&owner), spot_request_body("Sin cupo", 0))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut body = spot_request_body("Carísimo", 4);
    body["hourly_price"] = json!("79228162514264337593543950335");
    let response = app.post("/api/spots/request", Some(&owner), body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["code"], "VALIDATION_ERROR");

    let mut body = spot_request_body("Mensual carísimo", 4);
    body["monthly_price"] = json!("100000000");
    let response = app.post("/api/spots/request", Some(&owner), body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/api/owner/requests", Some(&owner)).await;
    assert!(response.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_clients_cannot_submit_spots() {
    let app = TestApp::new().await;
    let client = app.register("Leo", "leo@parkly.co", "client").await;

    let response = app
        .post("/api/spots/request", Some(&client), spot_request_body("Mío", 2))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_approve_publishes_spot_and_notifies_owner() {
    let app = TestApp::new().await;
    let owner = app.register("Olga", "olga@parkly.co", "owner").await;
    let admin = app.admin_token().await;
    let request_id = app.submit_request(&owner, "Parqueadero 93", 10).await;

    let response = app.get("/api/admin/requests?status=pending", Some(&admin)).await;
    assert_eq!(response.data().as_array().unwrap().len(), 1);

    let response = app
        .post(&format!("/api/admin/requests/{}/approve", request_id), Some(&admin), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let decision = response.data();
    assert_eq!(decision["request"]["status"], "approved");
    assert_eq!(decision["spot"]["verified"], true);
    assert_eq!(decision["spot"]["request_id"], request_id.as_str());
    assert_eq!(decision["notification"]["kind"], "approved");

    // Una segunda decisión no crea nada más
    let response = app
        .post(&format!("/api/admin/requests/{}/approve", request_id), Some(&admin), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app.get("/api/owner/spots", Some(&owner)).await;
    assert_eq!(response.data().as_array().unwrap().len(), 1);

    let response = app.get("/api/owner/notifications", Some(&owner)).await;
    let notifications = response.data();
    assert_eq!(notifications.as_array().unwrap().len(), 1);
    assert_eq!(
        notifications[0]["message"],
        "Your spot has been approved and is now live on PARKLY!"
    );

    let response = app.get("/api/owner/requests?status=approved", Some(&owner)).await;
    assert_eq!(response.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reject_requires_known_reason() {
    let app = TestApp::new().await;
    let owner = app.register("Olga", "olga@parkly.co", "owner").await;
    let admin = app.admin_token().await;
    let request_id = app.submit_request(&owner, "Lote 7", 5).await;
    let uri = format!("/api/admin/requests/{}/reject", request_id);

    let response = app.post(&uri, Some(&admin), json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Please select a rejection reason");

    let response = app.post(&uri, Some(&admin), json!({ "reason": "No me gusta" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post(&uri, Some(&admin), json!({ "reason": "Address cannot be verified" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let decision = response.data();
    assert!(decision["spot"].is_null());
    assert_eq!(decision["request"]["rejection_reason"], "Address cannot be verified");
    assert_eq!(decision["notification"]["kind"], "rejected");
    assert_eq!(decision["notification"]["reason"], "Address cannot be verified");

    let response = app.get("/api/admin/spots", Some(&admin)).await;
    assert!(response.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_dismiss_notification_is_owner_only_and_idempotent() {
    let app = TestApp::new().await;
    let owner = app.register("Olga", "olga@parkly.co", "owner").await;
    let other = app.register("Pablo", "pablo@parkly.co", "owner").await;
    app.published_spot(&owner, "Parqueadero 93", 3).await;

    let response = app.get("/api/owner/notifications", Some(&owner)).await;
    let id = response.data()[0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/owner/notifications/{}/dismiss", id);

    let response = app.post(&uri, Some(&other), json!({})).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    for _ in 0..2 {
        let response = app.post(&uri, Some(&owner), json!({})).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.data()["dismissed"], true);
    }

    let response = app.get("/api/owner/notifications", Some(&owner)).await;
    assert!(response.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejection_reasons_and_user_search() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.register("Marta Gómez", "marta@parkly.co", "client").await;
    app.register("Pedro", "pedro@parkly.co", "owner").await;

    let response = app.get("/api/admin/rejection-reasons", Some(&admin)).await;
    assert_eq!(response.data().as_array().unwrap().len(), 7);

    let response = app.get("/api/admin/users?q=MARTA", Some(&admin)).await;
    let users = response.data();
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["email"], "marta@parkly.co");
}

#[tokio::test]
async fn test_chat_keyword_mode() {
    let app = TestApp::new().await;

    let response = app.post("/chat", None, json!({ "message": "" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["reply"], EMPTY_MESSAGE_REPLY);

    let response = app
        .post("/chat", None, json!({ "message": "How do I make a reservation?" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.json()["reply"].as_str().unwrap().is_empty());

    // Sin Redis no hay historial en el servidor ni id de conversación
    assert!(response.json().get("conversation_id").is_none());

    let response = app
        .post(
            "/chat",
            None,
            json!({ "message": "hola", "conversation_id": "abc-123" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["reply"], INVALID_CONVERSATION_REPLY);

    let response = app.request(Method::DELETE, "/chat/abc-123", None, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let id = uuid::Uuid::new_v4();
    let response = app
        .request(Method::DELETE, &format!("/chat/{}", id), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data(), json!(id.to_string()));
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let config = parkly_api::config::EnvironmentConfig {
        rate_limit_requests: 2,
        ..test_config()
    };
    let app = TestApp::with_config(config).await;
    let body = json!({ "email": "nadie@parkly.co", "password": "x" });

    for _ in 0..2 {
        let response = app.post("/api/login", None, body.clone()).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let response = app.post("/api/login", None, body).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.json()["code"], "RATE_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn test_chat_traffic_does_not_exhaust_login_budget() {
    let config = parkly_api::config::EnvironmentConfig {
        rate_limit_requests: 3,
        ..test_config()
    };
    let app = TestApp::with_config(config).await;

    for _ in 0..3 {
        let response = app.post("/chat", None, json!({ "message": "hola" })).await;
        assert_eq!(response.status, StatusCode::OK);
    }
    let response = app.post("/chat", None, json!({ "message": "hola" })).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    // El login conserva su propio cupo
    app.admin_token().await;
}

#[tokio::test]
async fn test_forwarded_for_only_counts_behind_trusted_proxy() {
    let body = json!({ "email": "nadie@parkly.co", "password": "x" });

    // Sin proxy de confianza, rotar la cabecera no abre ventanas nuevas
    let app = TestApp::with_config(parkly_api::config::EnvironmentConfig {
        rate_limit_requests: 2,
        ..test_config()
    })
    .await;
    for ip in ["1.1.1.1", "2.2.2.2"] {
        let response = app.post_forwarded("/api/login", ip, body.clone()).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    let response = app.post_forwarded("/api/login", "3.3.3.3", body.clone()).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    // Detrás del proxy cada cliente tiene su ventana
    let app = TestApp::with_config(parkly_api::config::EnvironmentConfig {
        rate_limit_requests: 2,
        trust_proxy_headers: true,
        ..test_config()
    })
    .await;
    for _ in 0..2 {
        let response = app.post_forwarded("/api/login", "1.1.1.1", body.clone()).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    let response = app.post_forwarded("/api/login", "1.1.1.1", body.clone()).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    let response = app.post_forwarded("/api/login", "2.2.2.2", body).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
