use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::medical::ActivityKind;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCommandRequest {
    #[serde(alias = "message", alias = "comando")]
    pub mensagem: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: ChatSender,
    pub text: String,
    pub ts: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatSender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(ChatSender::Bot, text)
    }

    fn new(sender: ChatSender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            ts: Utc::now(),
        }
    }
}

/// Conversation produced by one command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub messages: Vec<ChatMessage>,
    pub activity_created: bool,
}

/// Body returned by the natural-language interpreter.
#[derive(Debug, Clone, Deserialize)]
pub struct InterpreterResponse {
    #[serde(default)]
    pub sucesso: bool,
    pub dados: Option<InterpretedCommand>,
    pub erro: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretedCommand {
    pub tipo_atividade: Option<String>,
    #[serde(default)]
    pub paciente_nome: String,
    #[serde(default)]
    pub medico_nome: String,
    #[serde(default)]
    pub inicio: String,
    pub fim: Option<String>,
}

/// Payload for `POST /atividades-medicas`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityPayload {
    pub inicio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termino: Option<String>,
    pub tipo_atividade: ActivityKind,
    pub paciente_id: String,
    pub medicos: Vec<String>,
}

/// Ways a chat command can fail; the message doubles as the bot's reply.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Error: could not reach the interpreter (check that the interpreter service is running).")]
    InterpreterUnreachable,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown interpreter error: {0}")]
    InterpreterFailure(String),

    #[error("Error: {0}")]
    Rejected(String),

    #[error("Error fetching {0}.")]
    Lookup(&'static str),

    #[error("Patient \"{0}\" not found.")]
    PatientNotFound(String),

    #[error("Doctor \"{0}\" not found.")]
    DoctorNotFound(String),

    #[error("Failed to create activity: {0}")]
    CreateFailed(String),
}
