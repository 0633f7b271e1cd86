use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "UserName", alias = "username")]
    pub user_name: String,
    #[serde(default, alias = "Email")]
    pub email: String,
}

/// Session issued by the backend after login or registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub chave: String,
    pub data_expiracao: DateTime<Utc>,
    pub usuario: Usuario,
}

impl TokenResponse {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.data_expiracao
    }
}
