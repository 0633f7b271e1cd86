use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::auth::{LoginRequest, RegisterRequest, TokenResponse, Usuario};
use shared_models::error::AppError;
use shared_models::medical::parse_timestamp;
use shared_utils::envelope::extract_object;

const TOKEN_KEYS: [&str; 4] = ["chave", "Chave", "token", "accessToken"];
const EXPIRY_KEYS: [&str; 4] = ["dataExpiracao", "DataExpiracao", "expires", "expiration"];
const USER_KEYS: [&str; 4] = ["usuario", "Usuario", "user", "usuarioDto"];

pub struct SessionService {
    backend: BackendClient,
}

impl SessionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, AppError> {
        debug!("Authenticating user {}", request.user_name);

        let body = serde_json::to_value(request).map_err(|e| AppError::Internal(e.to_string()))?;
        let raw: Value = self.backend
            .request(Method::POST, "/auth/autenticar", None, Some(body))
            .await
            .map_err(|e| AppError::Auth(format!("Login failed: {}", e)))?;

        parse_token_response(&raw, Utc::now())
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<TokenResponse, AppError> {
        debug!("Registering user {}", request.user_name);

        let body = serde_json::to_value(request).map_err(|e| AppError::Internal(e.to_string()))?;
        let raw: Value = self.backend
            .request(Method::POST, "/auth/registrar", None, Some(body))
            .await
            .map_err(|e| AppError::ExternalService(format!("Registration failed: {}", e)))?;

        parse_token_response(&raw, Utc::now())
    }

    /// Best effort: the caller's session ends regardless of what the backend says.
    pub async fn logout(&self, auth_token: &str) {
        if let Err(e) = self.backend
            .request::<Value>(Method::POST, "/auth/sair", Some(auth_token), Some(Value::Object(Default::default())))
            .await
        {
            warn!("Backend logout failed, ignoring: {}", e);
        }
    }
}

/// Reads the token, expiry and user out of the backend's auth response,
/// tolerating the casing and envelope variants it has used over time.
pub fn parse_token_response(raw: &Value, now: DateTime<Utc>) -> Result<TokenResponse, AppError> {
    let payload = extract_object(raw);

    let chave = TOKEN_KEYS
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Auth("Invalid server response: access token missing".to_string()))?;

    let data_expiracao = EXPIRY_KEYS
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .and_then(parse_timestamp)
        .unwrap_or(now);

    let usuario = USER_KEYS
        .iter()
        .find_map(|key| payload.get(*key).filter(|v| v.is_object()))
        .and_then(|user| serde_json::from_value::<Usuario>(user.clone()).ok())
        .unwrap_or_default();

    Ok(TokenResponse {
        chave: chave.to_string(),
        data_expiracao,
        usuario,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_enveloped_response() {
        let raw = json!({
            "sucesso": true,
            "dados": {
                "chave": "jwt-abc",
                "dataExpiracao": "2025-10-16T20:00:00Z",
                "usuario": { "id": "u-1", "userName": "admin", "email": "a@b.com" }
            }
        });

        let token = parse_token_response(&raw, now()).unwrap();
        assert_eq!(token.chave, "jwt-abc");
        assert_eq!(token.data_expiracao, now() + Duration::hours(8));
        assert_eq!(token.usuario.user_name, "admin");
        assert!(!token.is_expired(now()));
    }

    #[test]
    fn test_pascal_case_response() {
        let raw = json!({
            "Chave": "jwt-xyz",
            "DataExpiracao": "2025-10-16T11:00:00",
            "Usuario": { "Id": "ignored", "UserName": "medico", "Email": "m@b.com" }
        });

        let token = parse_token_response(&raw, now()).unwrap();
        assert_eq!(token.chave, "jwt-xyz");
        assert_eq!(token.usuario.user_name, "medico");
        assert_eq!(token.usuario.email, "m@b.com");
        assert!(token.is_expired(now()));
    }

    #[test]
    fn test_missing_expiry_and_user_default() {
        let token = parse_token_response(&json!({ "accessToken": "t" }), now()).unwrap();
        assert_eq!(token.data_expiracao, now());
        assert_eq!(token.usuario, Usuario::default());
        assert!(token.is_expired(now()));
    }

    #[test]
    fn test_missing_token_is_auth_error() {
        assert_matches!(
            parse_token_response(&json!({ "dados": { "chave": "  " } }), now()),
            Err(AppError::Auth(msg)) if msg.contains("access token missing")
        );
        assert_matches!(parse_token_response(&json!(null), now()), Err(AppError::Auth(_)));
    }
}
