use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

/// HTTP client for the OrganizaMed REST backend.
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: build_http_client(config),
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Auth token contains invalid header characters, sending request without it"),
            }
        }

        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_query(method, path, &[], auth_token, body).await
    }

    pub async fn request_with_query<T>(&self, method: Method, path: &str,
                                       query: &[(&str, String)],
                                       auth_token: Option<&str>, body: Option<Value>)
                                       -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url)
            .headers(self.get_headers(auth_token));

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        // 204 and empty 200 bodies decode as JSON null
        let text = response.text().await?;
        let data = if text.trim().is_empty() {
            serde_json::from_value(Value::Null)?
        } else {
            serde_json::from_str(&text)?
        };
        Ok(data)
    }

    pub async fn get_json(&self, path: &str, auth_token: Option<&str>) -> Result<Value> {
        self.request(Method::GET, path, auth_token, None).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

/// Builds a reqwest client honouring the configured timeout and TLS leniency.
pub fn build_http_client(config: &AppConfig) -> Client {
    Client::builder()
        .timeout(config.request_timeout())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build configured HTTP client ({}), falling back to defaults", e);
            Client::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{MockServer, Mock, ResponseTemplate};
    use wiremock::matchers::{method, path, header, query_param};

    fn config_for(server: &MockServer) -> AppConfig {
        AppConfig {
            backend_url: format!("{}/api/", server.uri()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = AppConfig {
            backend_url: "https://localhost:7043/api/".to_string(),
            ..AppConfig::default()
        };
        let client = BackendClient::new(&config);
        assert_eq!(client.get_base_url(), "https://localhost:7043/api");
    }

    #[tokio::test]
    async fn test_get_forwards_bearer_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/medicos/top-10"))
            .and(query_param("dataInicio", "2025-01-01T00:00:00Z"))
            .and(header("Authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dados": [] })))
            .mount(&server)
            .await;

        let client = BackendClient::new(&config_for(&server));
        let body: Value = client
            .request_with_query(
                Method::GET,
                "/medicos/top-10",
                &[("dataInicio", "2025-01-01T00:00:00Z".to_string())],
                Some("abc"),
                None,
            )
            .await
            .unwrap();

        assert_eq!(body, json!({ "dados": [] }));
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/sair"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = BackendClient::new(&config_for(&server));
        let body: Value = client.request(Method::POST, "/auth/sair", None, None).await.unwrap();
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/medicos"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let client = BackendClient::new(&config_for(&server));
        let err = client.get_json("/medicos", Some("old")).await.unwrap_err();
        assert!(err.to_string().starts_with("Authentication error"));
    }
}
