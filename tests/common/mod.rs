#![allow(dead_code)]

use actix_web::{http::header, test};
use chrono::Duration;
use serde_json::json;
use tasktrack::auth::{CredentialStore, TokenResponse, TokenService};
use tasktrack::repository::TaskRepository;
use tasktrack::AppState;

pub const SECRET: &str = "integration-test-secret";

/// Fresh state with the cheapest bcrypt cost so the suite stays fast.
pub fn test_state() -> AppState {
    AppState::new(
        CredentialStore::with_cost(4),
        TokenService::new(SECRET, Duration::minutes(30)),
        TaskRepository::new(),
    )
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> Result<String, String> {
    let credentials = json!({ "username": username, "password": password });

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(app, req).await;
    if !resp.status().is_success() {
        return Err(format!("Failed to register user. Status: {}", resp.status()));
    }

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    if !status.is_success() {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let token: TokenResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;
    Ok(token.access_token)
}
