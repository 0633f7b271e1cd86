use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::medical::DoctorRef;
use shared_utils::envelope::{extract_records, extract_typed};

use crate::models::{
    Activity, DashboardSnapshot, DoctorRestSchedule, WorkloadPeriod, WorkloadRankEntry,
};
use crate::services::board::{DashboardBoard, Section};
use crate::services::rest_window::compute_rest_schedules;
use crate::services::workload::WorkloadNormalizer;

/// Default length of the workload ranking period, in days.
pub const DEFAULT_WORKLOAD_DAYS: i64 = 30;

pub struct DashboardService {
    backend: BackendClient,
    workload: WorkloadNormalizer,
}

impl DashboardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
            workload: WorkloadNormalizer::from_config(config),
        }
    }

    /// All activities; the backend has no date-range filter so the horizon is applied locally.
    pub async fn fetch_activities(&self, auth_token: &str) -> Result<Vec<Activity>> {
        debug!("Fetching medical activities");
        let raw = self.backend.get_json("/atividades-medicas", Some(auth_token)).await?;
        Ok(extract_typed(&raw))
    }

    pub async fn fetch_doctors(&self, auth_token: &str) -> Result<Vec<DoctorRef>> {
        debug!("Fetching doctors");
        let raw = self.backend.get_json("/medicos", Some(auth_token)).await?;
        Ok(extract_typed(&raw))
    }

    pub async fn fetch_workload_ranking(&self, period: &WorkloadPeriod, auth_token: &str) -> Result<Vec<Value>> {
        debug!("Fetching top-10 workload from {} to {}", period.start, period.end);
        let raw: Value = self.backend.request_with_query(
            Method::GET,
            "/medicos/top-10",
            &period.query_params(),
            Some(auth_token),
            None,
        ).await?;
        Ok(extract_records(&raw))
    }

    /// Per-doctor rest windows at `now`. Any fetch failure yields an empty list.
    pub async fn rest_schedules(&self, now: DateTime<Utc>, auth_token: &str) -> Vec<DoctorRestSchedule> {
        let (activities, doctors) = tokio::join!(
            self.fetch_activities(auth_token),
            self.fetch_doctors(auth_token),
        );

        match (activities, doctors) {
            (Ok(activities), Ok(doctors)) => {
                let schedules = compute_rest_schedules(&activities, &doctors, now);
                debug!(
                    "Computed rest windows for {} doctors from {} activities",
                    schedules.len(),
                    activities.len()
                );
                schedules
            }
            (Err(e), _) => {
                warn!("Failed to load activities for rest windows: {}", e);
                Vec::new()
            }
            (_, Err(e)) => {
                warn!("Failed to load doctors for rest windows: {}", e);
                Vec::new()
            }
        }
    }

    /// Normalized workload ranking. A fetch failure yields an empty list.
    pub async fn workload_ranking(&self, period: &WorkloadPeriod, auth_token: &str) -> Vec<WorkloadRankEntry> {
        match self.fetch_workload_ranking(period, auth_token).await {
            Ok(entries) => self.workload.normalize(&entries),
            Err(e) => {
                warn!("Failed to load workload ranking: {}", e);
                Vec::new()
            }
        }
    }

    /// Refreshes both dashboard sections concurrently and returns what the board now shows.
    pub async fn refresh_board(
        &self,
        board: &DashboardBoard,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> DashboardSnapshot {
        let rest_ticket = board.begin(Section::RestWindows);
        let workload_ticket = board.begin(Section::Workload);
        let period = WorkloadPeriod::trailing(now, DEFAULT_WORKLOAD_DAYS);

        let (schedules, ranking) = tokio::join!(
            self.rest_schedules(now, auth_token),
            self.workload_ranking(&period, auth_token),
        );

        board.apply_rest_schedules(rest_ticket, schedules).await;
        board.apply_workload(workload_ticket, ranking).await;

        board.snapshot().await
    }
}
