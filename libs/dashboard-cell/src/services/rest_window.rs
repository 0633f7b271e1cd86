use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use shared_models::medical::{ActivityKind, DoctorRef};

use crate::models::{Activity, DoctorRestSchedule, RestWindow, PLACEHOLDER};

/// Length of the rolling horizon the dashboard looks ahead.
pub const REST_HORIZON_DAYS: i64 = 30;

/// Mandatory recovery time after an activity of the given kind.
pub fn recovery_duration(kind: ActivityKind) -> Duration {
    match kind {
        ActivityKind::Surgery => Duration::hours(4),
        ActivityKind::Consultation => Duration::minutes(10),
    }
}

/// Closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Horizon {
    pub fn rolling(now: DateTime<Utc>) -> Self {
        Self {
            start: now,
            end: now + Duration::days(REST_HORIZON_DAYS),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Rest window implied by `activity`, if it is upcoming or still being recovered from at `now`.
pub fn rest_window_for(activity: &Activity, now: DateTime<Utc>) -> Option<RestWindow> {
    let end = activity.anchor()?;
    let rest_end = end + recovery_duration(activity.kind);
    let horizon = Horizon::rolling(now);

    let ends_in_horizon = horizon.contains(end);
    let starts_in_horizon = activity.start.is_some_and(|start| horizon.contains(start));
    let still_recovering = end < now && rest_end > now;

    if ends_in_horizon || starts_in_horizon || still_recovering {
        Some(RestWindow { start: end, end: rest_end })
    } else {
        None
    }
}

/// Groups the rest windows of every relevant activity by assigned doctor.
///
/// Windows are kept as-is (overlaps are not merged) and sorted by start within
/// each doctor; schedules are sorted by doctor name. Doctors missing from
/// `doctors` keep their id but get placeholder name and crm.
pub fn compute_rest_schedules(
    activities: &[Activity],
    doctors: &[DoctorRef],
    now: DateTime<Utc>,
) -> Vec<DoctorRestSchedule> {
    let mut buckets: BTreeMap<&str, Vec<RestWindow>> = BTreeMap::new();

    for activity in activities {
        let Some(window) = rest_window_for(activity, now) else {
            continue;
        };
        for doctor in &activity.doctors {
            buckets.entry(doctor.id.as_str()).or_default().push(window);
        }
    }

    let directory: HashMap<&str, &DoctorRef> =
        doctors.iter().map(|doctor| (doctor.id.as_str(), doctor)).collect();

    let mut schedules: Vec<DoctorRestSchedule> = buckets
        .into_iter()
        .map(|(doctor_id, mut windows)| {
            windows.sort_by_key(|window| window.start);

            let known = directory.get(doctor_id);
            if known.is_none() {
                debug!("Doctor {} referenced by an activity is missing from the doctor list", doctor_id);
            }

            DoctorRestSchedule {
                doctor_id: doctor_id.to_string(),
                doctor_name: known
                    .map(|d| d.name.trim())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(PLACEHOLDER)
                    .to_string(),
                crm: known
                    .and_then(|d| d.crm.as_deref())
                    .map(str::trim)
                    .filter(|crm| !crm.is_empty())
                    .unwrap_or(PLACEHOLDER)
                    .to_string(),
                windows,
            }
        })
        .collect();

    schedules.sort_by(|a, b| collate(&a.doctor_name, &b.doctor_name));
    schedules
}

/// Name ordering for pt-BR display: punctuation and symbols before digits
/// before letters, case and accents ignored, raw strings break ties.
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b)).then_with(|| a.cmp(b))
}

fn collation_key(s: &str) -> Vec<(u8, char)> {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .map(|c| {
            let class = if c.is_alphabetic() {
                2
            } else if c.is_numeric() {
                1
            } else {
                0
            };
            (class, c)
        })
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
