use std::sync::Arc;
use serde_json::{json, Value};
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path};

use shared_config::AppConfig;

pub const TEST_TOKEN: &str = "test-bearer-token";

pub struct TestConfig {
    pub backend_url: String,
    pub interpreter_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:7043/api".to_string(),
            interpreter_url: "http://localhost:8000/comando".to_string(),
        }
    }
}

impl TestConfig {
    /// Points both the backend and the interpreter at a wiremock server.
    pub fn for_mock_server(server: &MockServer) -> Self {
        Self {
            backend_url: format!("{}/api", server.uri()),
            interpreter_url: format!("{}/comando", server.uri()),
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            backend_url: self.backend_url.clone(),
            interpreter_url: self.interpreter_url.clone(),
            request_timeout_secs: 5,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Mounts a JSON response for `verb` + `/api{api_path}` on the mock backend.
pub async fn mount_backend_json(server: &MockServer, verb: &str, api_path: &str, status: u16, body: Value) {
    Mock::given(method(verb))
        .and(path(format!("/api{}", api_path)))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn doctor(id: &str, nome: &str, crm: &str) -> Value {
        json!({ "id": id, "nome": nome, "crm": crm })
    }

    pub fn patient(id: &str, nome: &str) -> Value {
        json!({
            "id": id,
            "nome": nome,
            "email": format!("{}@example.com", id),
            "telefone": "(49) 99999-0000"
        })
    }

    pub fn activity(id: &str, kind: &str, inicio: Option<&str>, termino: Option<&str>, doctors: Vec<Value>) -> Value {
        json!({
            "id": id,
            "inicio": inicio,
            "termino": termino,
            "tipoAtividade": kind,
            "paciente": Self::patient("p-1", "Paciente Teste"),
            "medicos": doctors
        })
    }

    /// The `{ sucesso, dados: { registros } }` envelope the .NET backend uses for listings.
    pub fn listing(records: Vec<Value>) -> Value {
        json!({
            "sucesso": true,
            "dados": {
                "quantidadeRegistros": records.len(),
                "registros": records
            }
        })
    }

    pub fn interpreter_success(kind: &str, patient: &str, doctor: &str, inicio: &str, fim: Option<&str>) -> Value {
        json!({
            "sucesso": true,
            "dados": {
                "tipoAtividade": kind,
                "pacienteNome": patient,
                "medicoNome": doctor,
                "inicio": inicio,
                "fim": fim
            }
        })
    }

    pub fn interpreter_failure(erro: &str) -> Value {
        json!({ "sucesso": false, "erro": erro })
    }

    pub fn token_response(chave: &str, expires: &str) -> Value {
        json!({
            "sucesso": true,
            "dados": {
                "chave": chave,
                "dataExpiracao": expires,
                "usuario": { "id": "u-1", "userName": "admin", "email": "admin@organizamed.com" }
            }
        })
    }
}
