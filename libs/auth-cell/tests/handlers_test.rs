use axum::{extract::{Json, State}, http::StatusCode};
use assert_matches::assert_matches;
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, body_json};

use auth_cell::handlers::{login, register};
use shared_models::auth::{LoginRequest, RegisterRequest};
use shared_models::error::AppError;
use shared_utils::test_utils::{mount_backend_json, MockBackendResponses, TestConfig};

fn login_request(user: &str, password: &str) -> LoginRequest {
    LoginRequest {
        user_name: user.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/autenticar"))
        .and(body_json(json!({ "userName": "admin", "password": "Senha@123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::token_response("jwt-abc", "2030-01-01T00:00:00Z"),
        ))
        .mount(&mock_server)
        .await;

    let config = TestConfig::for_mock_server(&mock_server).to_arc();
    let result = login(State(config), Json(login_request("admin", "Senha@123"))).await;

    let token = result.unwrap().0;
    assert_eq!(token.chave, "jwt-abc");
    assert_eq!(token.usuario.email, "admin@organizamed.com");
}

#[tokio::test]
async fn test_login_rejected_by_backend() {
    let mock_server = MockServer::start().await;
    mount_backend_json(&mock_server, "POST", "/auth/autenticar", 401, json!({
        "sucesso": false, "erros": ["Login ou senha incorretos"]
    })).await;

    let config = TestConfig::for_mock_server(&mock_server).to_arc();
    let result = login(State(config), Json(login_request("admin", "errada"))).await;

    assert_matches!(result, Err(AppError::Auth(msg)) if msg.starts_with("Login failed"));
}

#[tokio::test]
async fn test_login_without_token_in_response() {
    let mock_server = MockServer::start().await;
    mount_backend_json(&mock_server, "POST", "/auth/autenticar", 200, json!({ "sucesso": true, "dados": {} })).await;

    let config = TestConfig::for_mock_server(&mock_server).to_arc();
    let result = login(State(config), Json(login_request("admin", "x"))).await;

    assert_matches!(result, Err(AppError::Auth(msg)) if msg.contains("access token missing"));
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let config = TestConfig::default().to_arc();
    let result = login(State(config), Json(login_request("admin", "  "))).await;

    assert_matches!(result, Err(AppError::BadRequest(msg)) if msg == "password is required");
}

#[tokio::test]
async fn test_register_success() {
    let mock_server = MockServer::start().await;
    mount_backend_json(&mock_server, "POST", "/auth/registrar", 200,
        MockBackendResponses::token_response("jwt-new", "2030-01-01T00:00:00Z")).await;

    let config = TestConfig::for_mock_server(&mock_server).to_arc();
    let request = RegisterRequest {
        user_name: "novo".to_string(),
        email: "novo@organizamed.com".to_string(),
        password: "Senha@123".to_string(),
    };

    let (status, token) = register(State(config), Json(request)).await.unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(token.0.chave, "jwt-new");
}

#[tokio::test]
async fn test_register_backend_failure() {
    let mock_server = MockServer::start().await;
    mount_backend_json(&mock_server, "POST", "/auth/registrar", 500, json!({ "erro": "db down" })).await;

    let config = TestConfig::for_mock_server(&mock_server).to_arc();
    let request = RegisterRequest {
        user_name: "novo".to_string(),
        email: "novo@organizamed.com".to_string(),
        password: "Senha@123".to_string(),
    };

    let result = register(State(config), Json(request)).await;
    assert_matches!(result, Err(AppError::ExternalService(_)));
}
