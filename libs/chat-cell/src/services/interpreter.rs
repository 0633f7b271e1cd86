use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{debug, error, warn};

use shared_backend::client::build_http_client;
use shared_config::AppConfig;

use crate::models::{ChatError, InterpretedCommand, InterpreterResponse};

const NO_DATA: &str = "interpreter returned no data";

/// Client for the natural-language command interpreter.
pub struct InterpreterClient {
    client: Client,
    url: String,
}

impl InterpreterClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: build_http_client(config),
            url: config.interpreter_url.clone(),
        }
    }

    pub async fn interpret(&self, text: &str) -> Result<InterpretedCommand, ChatError> {
        debug!("Sending command to interpreter at {}", self.url);

        let response = self.client
            .post(&self.url)
            .json(&json!({ "mensagem": text }))
            .send()
            .await
            .map_err(|e| {
                warn!("Interpreter unreachable: {}", e);
                ChatError::InterpreterUnreachable
            })?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let detail = response.text().await.unwrap_or_default();
            return Err(ChatError::InvalidRequest(detail));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Interpreter error ({}): {}", status, detail);
            return Err(ChatError::InterpreterFailure(format!("{} {}", status, detail).trim().to_string()));
        }

        let body: InterpreterResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InterpreterFailure(e.to_string()))?;

        match body {
            InterpreterResponse { sucesso: true, dados: Some(command), .. } => Ok(command),
            InterpreterResponse { erro, .. } => {
                Err(ChatError::Rejected(erro.unwrap_or_else(|| NO_DATA.to_string())))
            }
        }
    }
}
