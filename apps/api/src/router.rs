use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use auth_cell::router::auth_routes;
use chat_cell::router::chat_routes;
use dashboard_cell::router::dashboard_routes;
use shared_config::AppConfig;
use shared_models::error::AppError;

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "OrganizaMed API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/dashboard", dashboard_routes(state.clone()))
        .nest("/chat", chat_routes(state))
        .fallback(route_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(Arc::new(AppConfig::default()))
    }

    #[tokio::test]
    async fn test_root_is_alive() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dashboard_requires_token() {
        let response = app()
            .oneshot(Request::builder().uri("/dashboard/rest-windows").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_chat_requires_token() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat/commands")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"mensagem":"oi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let response = app()
            .oneshot(Request::builder().uri("/agenda").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json_response["error"], "Route not found");
    }
}
