use std::sync::Arc;

use axum::{
    extract::{State, Json},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{LoginRequest, RegisterRequest, TokenResponse};
use shared_models::error::AppError;

use crate::services::session::SessionService;

fn require_credentials(fields: &[(&str, &str)]) -> Result<(), AppError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(AppError::BadRequest(format!("{} is required", name))),
        None => Ok(()),
    }
}

pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    require_credentials(&[("userName", request.user_name.as_str()), ("password", request.password.as_str())])?;

    let service = SessionService::new(&config);
    let token = service.login(&request).await?;

    debug!("User {} authenticated", request.user_name);
    Ok(Json(token))
}

pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    require_credentials(&[
        ("userName", request.user_name.as_str()),
        ("email", request.email.as_str()),
        ("password", request.password.as_str()),
    ])?;

    let service = SessionService::new(&config);
    let token = service.register(&request).await?;

    Ok((StatusCode::CREATED, Json(token)))
}

pub async fn logout(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> StatusCode {
    let service = SessionService::new(&config);
    service.logout(auth.token()).await;

    StatusCode::NO_CONTENT
}
