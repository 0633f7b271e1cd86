use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Kind of a scheduled medical activity.
///
/// The backend serializes these as `"Consulta"` / `"Cirurgia"`; older
/// payloads carry the numeric enum value instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActivityKind {
    #[default]
    Consultation,
    Surgery,
}

impl ActivityKind {
    pub fn wire_name(&self) -> &'static str {
        match self {
            ActivityKind::Consultation => "Consulta",
            ActivityKind::Surgery => "Cirurgia",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consulta" | "consultation" | "0" => Ok(ActivityKind::Consultation),
            "cirurgia" | "surgery" | "1" => Ok(ActivityKind::Surgery),
            other => Err(format!("Unknown activity kind: {}", other)),
        }
    }
}

impl Serialize for ActivityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for ActivityKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => s.parse().map_err(serde::de::Error::custom),
            Value::Number(n) => match n.as_u64() {
                Some(0) => Ok(ActivityKind::Consultation),
                Some(1) => Ok(ActivityKind::Surgery),
                _ => Err(serde::de::Error::custom(format!("Unknown activity kind: {}", n))),
            },
            Value::Null => Ok(ActivityKind::default()),
            other => Err(serde::de::Error::custom(format!("Unknown activity kind: {}", other))),
        }
    }
}

/// Minimal doctor projection as returned by `/medicos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRef {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(rename = "nome", alias = "Nome", alias = "name", default)]
    pub name: String,
    #[serde(alias = "Crm", default, deserialize_with = "lenient_opt_string")]
    pub crm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRef {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(rename = "nome", alias = "Nome", alias = "name", default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub email: Option<String>,
    #[serde(rename = "telefone", alias = "phone", default, deserialize_with = "lenient_opt_string")]
    pub phone: Option<String>,
}

/// Case-insensitive, whitespace-trimmed name equality used to match
/// free-text names against backend records.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Accepts ids serialized as strings or numbers.
pub fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("Invalid id: {}", other))),
    }
}

pub fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Parses RFC 3339 timestamps, and offset-less ISO 8601 ones as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Missing, null or unparseable timestamps all deserialize to `None`.
pub fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}
