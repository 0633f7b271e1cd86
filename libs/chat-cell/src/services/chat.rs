use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, warn};

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::medical::{names_match, ActivityKind, DoctorRef, PatientRef};
use shared_utils::envelope::extract_typed;

use crate::models::{
    ChatError, ChatMessage, ChatReply, CreateActivityPayload, InterpretedCommand,
};
use crate::services::interpreter::InterpreterClient;

pub const ACTIVITY_CREATED: &str = "Medical activity created successfully.";

/// Turns a free-text command into a medical activity on the backend.
pub struct ChatService {
    interpreter: InterpreterClient,
    backend: BackendClient,
}

impl ChatService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            interpreter: InterpreterClient::new(config),
            backend: BackendClient::new(config),
        }
    }

    /// Runs the whole pipeline. Failures never escape: each one becomes the
    /// bot's last message and `activity_created` stays false.
    pub async fn handle_command(&self, text: &str, auth_token: &str) -> ChatReply {
        let mut messages = vec![ChatMessage::user(text)];

        let command = match self.interpreter.interpret(text).await {
            Ok(command) => command,
            Err(e) => {
                messages.push(ChatMessage::bot(e.to_string()));
                return ChatReply { messages, activity_created: false };
            }
        };

        messages.push(ChatMessage::bot(
            serde_json::to_string(&command).unwrap_or_else(|_| format!("{:?}", command)),
        ));

        match self.create_activity(&command, auth_token).await {
            Ok(()) => {
                info!("Activity created from chat for patient {}", command.paciente_nome);
                messages.push(ChatMessage::bot(ACTIVITY_CREATED));
                ChatReply { messages, activity_created: true }
            }
            Err(e) => {
                warn!("Chat command did not create an activity: {}", e);
                messages.push(ChatMessage::bot(e.to_string()));
                ChatReply { messages, activity_created: false }
            }
        }
    }

    async fn create_activity(&self, command: &InterpretedCommand, auth_token: &str) -> Result<(), ChatError> {
        let patient = self.find_patient(&command.paciente_nome, auth_token).await?;
        let doctor = self.find_doctor(&command.medico_nome, auth_token).await?;

        let payload = build_payload(command, &patient, &doctor);
        let body = serde_json::to_value(&payload).map_err(|e| ChatError::CreateFailed(e.to_string()))?;

        debug!("Creating activity for patient {} with doctor {}", patient.id, doctor.id);
        self.backend
            .request::<Value>(Method::POST, "/atividades-medicas", Some(auth_token), Some(body))
            .await
            .map_err(|e| ChatError::CreateFailed(e.to_string()))?;

        Ok(())
    }

    async fn find_patient(&self, name: &str, auth_token: &str) -> Result<PatientRef, ChatError> {
        let raw = self.backend.get_json("/pacientes", Some(auth_token)).await.map_err(|e| {
            warn!("Failed to fetch patients: {}", e);
            ChatError::Lookup("patients")
        })?;

        extract_typed::<PatientRef>(&raw)
            .into_iter()
            .find(|patient| names_match(&patient.name, name))
            .ok_or_else(|| ChatError::PatientNotFound(name.to_string()))
    }

    async fn find_doctor(&self, name: &str, auth_token: &str) -> Result<DoctorRef, ChatError> {
        let raw = self.backend.get_json("/medicos", Some(auth_token)).await.map_err(|e| {
            warn!("Failed to fetch doctors: {}", e);
            ChatError::Lookup("doctors")
        })?;

        extract_typed::<DoctorRef>(&raw)
            .into_iter()
            .find(|doctor| names_match(&doctor.name, name))
            .ok_or_else(|| ChatError::DoctorNotFound(name.to_string()))
    }
}

pub fn build_payload(command: &InterpretedCommand, patient: &PatientRef, doctor: &DoctorRef) -> CreateActivityPayload {
    let kind = match command.tipo_atividade.as_deref() {
        None => ActivityKind::default(),
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{}, defaulting to {}", e, ActivityKind::default());
            ActivityKind::default()
        }),
    };

    CreateActivityPayload {
        inicio: command.inicio.clone(),
        termino: command.fim.clone().filter(|fim| !fim.trim().is_empty()),
        tipo_atividade: kind,
        paciente_id: patient.id.clone(),
        medicos: vec![doctor.id.clone()],
    }
}
