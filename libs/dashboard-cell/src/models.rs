use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use shared_models::medical::{
    lenient_opt_string, lenient_timestamp, ActivityKind, DoctorRef, PatientRef,
};

/// Shown in place of identity fields the backend did not provide.
pub const PLACEHOLDER: &str = "—";

/// A scheduled medical activity as listed by `/atividades-medicas`.
#[derive(Debug, Clone, Deserialize)]
pub struct Activity {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub id: Option<String>,
    #[serde(rename = "inicio", alias = "Inicio", alias = "start", default, deserialize_with = "lenient_timestamp")]
    pub start: Option<DateTime<Utc>>,
    #[serde(rename = "termino", alias = "Termino", alias = "end", default, deserialize_with = "lenient_timestamp")]
    pub end: Option<DateTime<Utc>>,
    #[serde(rename = "tipoAtividade", alias = "TipoAtividade", alias = "kind", default)]
    pub kind: ActivityKind,
    #[serde(rename = "paciente", alias = "Paciente", default, deserialize_with = "lenient_patient")]
    pub patient: Option<PatientRef>,
    #[serde(rename = "medicos", alias = "Medicos", default, deserialize_with = "activity_doctors")]
    pub doctors: Vec<DoctorRef>,
}

impl Activity {
    /// The instant the activity concludes: `end`, or `start` for zero-duration events.
    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.end.or(self.start)
    }
}

fn lenient_patient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PatientRef>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(raw).ok())
}

// `medicos` holds full doctor objects on reads but bare ids on some older payloads.
fn activity_doctors<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<DoctorRef>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    let Value::Array(entries) = raw else {
        return Ok(Vec::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(id) => Some(DoctorRef { id, name: String::new(), crm: None }),
            Value::Number(n) => Some(DoctorRef { id: n.to_string(), name: String::new(), crm: None }),
            other => serde_json::from_value::<DoctorRef>(other)
                .map_err(|e| warn!("Skipping malformed doctor reference: {}", e))
                .ok(),
        })
        .collect())
}

/// Interval during which a doctor is recovering from an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RestWindow {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRestSchedule {
    pub doctor_id: String,
    pub doctor_name: String,
    pub crm: String,
    pub windows: Vec<RestWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadRankEntry {
    pub doctor_id: Option<String>,
    pub doctor_name: String,
    pub crm: String,
    pub hours_worked: f64,
}

/// Period sent to `/medicos/top-10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WorkloadPeriod {
    /// The `days` days ending at `now`.
    pub fn trailing(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("dataInicio", self.start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("dataFim", self.end.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ]
    }
}

/// What the home dashboard currently displays.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub rest_schedules: Vec<DoctorRestSchedule>,
    pub rest_loading: bool,
    pub rest_updated_at: Option<DateTime<Utc>>,
    pub workload: Vec<WorkloadRankEntry>,
    pub workload_loading: bool,
    pub workload_updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_activity_from_backend_record() {
        let activity: Activity = serde_json::from_value(json!({
            "id": "a-1",
            "inicio": "2025-10-16T09:00:00",
            "termino": "2025-10-16T11:30:00",
            "tipoAtividade": "Cirurgia",
            "paciente": { "id": "p-1", "nome": "Carlos", "email": "c@x.com", "telefone": "1" },
            "medicos": [{ "id": "d-1", "nome": "Dr. Bob", "crm": "123-SC" }, "d-2"]
        }))
        .unwrap();

        assert_eq!(activity.kind, ActivityKind::Surgery);
        assert_eq!(activity.end, Some(Utc.with_ymd_and_hms(2025, 10, 16, 11, 30, 0).unwrap()));
        assert_eq!(activity.patient.as_ref().map(|p| p.name.as_str()), Some("Carlos"));
        assert_eq!(activity.doctors.len(), 2);
        assert_eq!(activity.doctors[1].id, "d-2");
    }

    #[test]
    fn test_activity_anchor_falls_back_to_start() {
        let activity: Activity = serde_json::from_value(json!({
            "inicio": "2025-10-16T09:00:00Z",
            "termino": null,
            "tipoAtividade": "Consulta",
            "paciente": null,
            "medicos": []
        }))
        .unwrap();

        assert_eq!(activity.anchor(), activity.start);
        assert!(activity.patient.is_none());
    }

    #[test]
    fn test_activity_without_times_has_no_anchor() {
        let activity: Activity = serde_json::from_value(json!({ "tipoAtividade": "Consulta" })).unwrap();
        assert!(activity.anchor().is_none());
        assert!(activity.doctors.is_empty());
    }

    #[test]
    fn test_workload_period_query_params() {
        let now = Utc.with_ymd_and_hms(2025, 10, 31, 12, 0, 0).unwrap();
        let period = WorkloadPeriod::trailing(now, 30);
        assert_eq!(
            period.query_params(),
            vec![
                ("dataInicio", "2025-10-01T12:00:00.000Z".to_string()),
                ("dataFim", "2025-10-31T12:00:00.000Z".to_string()),
            ]
        );
    }
}
