use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;

use crate::models::{WorkloadRankEntry, PLACEHOLDER};

/// Candidate fields for the hours worked, in priority order, with the
/// divisor that converts each one to hours.
const HOURS_FIELDS: [(&str, f64); 5] = [
    ("totalDeHorasTrabalhadas", 1.0),
    ("horas", 1.0),
    ("horasTrabalhadas", 1.0),
    ("totalEmMinutos", 60.0),
    ("totalEmSegundos", 3600.0),
];

/// Coerces the loosely-shaped `/medicos/top-10` entries into [`WorkloadRankEntry`].
#[derive(Debug, Clone, Copy)]
pub struct WorkloadNormalizer {
    /// Treat integral values above 24 as minutes that were never converted.
    /// Workaround for inconsistent backend units, not a domain rule.
    pub minutes_heuristic: bool,
}

impl Default for WorkloadNormalizer {
    fn default() -> Self {
        Self { minutes_heuristic: true }
    }
}

impl WorkloadNormalizer {
    pub fn new(minutes_heuristic: bool) -> Self {
        Self { minutes_heuristic }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.workload_minutes_heuristic)
    }

    /// Normalizes every entry, keeping the backend's ranking order.
    pub fn normalize(&self, entries: &[Value]) -> Vec<WorkloadRankEntry> {
        entries.iter().map(|entry| self.normalize_entry(entry)).collect()
    }

    pub fn normalize_entry(&self, entry: &Value) -> WorkloadRankEntry {
        let nested = entry.get("medico").filter(|m| m.is_object());

        WorkloadRankEntry {
            doctor_id: nested
                .and_then(|m| string_field(m, "id"))
                .or_else(|| first_string(entry, &["medicoId", "id"])),
            doctor_name: resolve_name(entry, nested).unwrap_or_else(|| PLACEHOLDER.to_string()),
            crm: nested
                .and_then(|m| string_field(m, "crm"))
                .or_else(|| first_string(entry, &["crm", "medicoCrm"]))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            hours_worked: self.resolve_hours(entry),
        }
    }

    fn resolve_hours(&self, entry: &Value) -> f64 {
        let Some((field, mut hours)) = HOURS_FIELDS
            .iter()
            .find_map(|(field, divisor)| entry.get(*field).and_then(as_number).map(|n| (*field, n / divisor)))
        else {
            debug!("Workload entry has no recognizable hours field");
            return 0.0;
        };

        if self.minutes_heuristic && hours.fract() == 0.0 && hours > 24.0 {
            debug!("Treating {} = {} as minutes", field, hours);
            hours /= 60.0;
        }

        round_hours(hours)
    }
}

fn resolve_name(entry: &Value, nested: Option<&Value>) -> Option<String> {
    if let Some(Value::String(name)) = entry.get("medico") {
        return non_empty(name);
    }
    nested
        .and_then(|m| string_field(m, "nome"))
        .or_else(|| first_string(entry, &["nome", "medicoNome"]))
}

fn first_string(entry: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| string_field(entry, field))
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

/// Rounds to two decimals, nudging by epsilon so values like 1.005 round up.
/// Non-finite and negative inputs clamp to zero.
pub fn round_hours(hours: f64) -> f64 {
    if !hours.is_finite() || hours <= 0.0 {
        return 0.0;
    }
    ((hours + f64::EPSILON) * 100.0).round() / 100.0
}
