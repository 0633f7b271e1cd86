use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::medical::parse_timestamp;
use shared_utils::extractor::BearerToken;

use crate::models::{DashboardSnapshot, DoctorRestSchedule, WorkloadPeriod, WorkloadRankEntry};
use crate::services::board::DashboardBoard;
use crate::services::dashboard::{DashboardService, DEFAULT_WORKLOAD_DAYS};

#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<AppConfig>,
    pub board: Arc<DashboardBoard>,
}

impl DashboardState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            board: Arc::new(DashboardBoard::new()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RestWindowQuery {
    pub now: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkloadQuery {
    #[serde(rename = "dataInicio")]
    pub data_inicio: Option<String>,
    #[serde(rename = "dataFim")]
    pub data_fim: Option<String>,
}

fn parse_instant(field: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    parse_timestamp(raw)
        .ok_or_else(|| AppError::ValidationError(format!("{} is not a valid ISO 8601 timestamp: {}", field, raw)))
}

impl WorkloadQuery {
    /// Explicit bounds win; a missing start defaults to 30 days before the end.
    pub fn period(&self, now: DateTime<Utc>) -> Result<WorkloadPeriod, AppError> {
        let end = match &self.data_fim {
            Some(raw) => parse_instant("dataFim", raw)?,
            None => now,
        };
        let start = match &self.data_inicio {
            Some(raw) => parse_instant("dataInicio", raw)?,
            None => WorkloadPeriod::trailing(end, DEFAULT_WORKLOAD_DAYS).start,
        };

        if start > end {
            return Err(AppError::ValidationError("dataInicio must not be after dataFim".to_string()));
        }

        Ok(WorkloadPeriod { start, end })
    }
}

#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<DashboardState>,
) -> Json<DashboardSnapshot> {
    Json(state.board.snapshot().await)
}

#[axum::debug_handler]
pub async fn refresh_dashboard(
    State(state): State<DashboardState>,
    Extension(token): Extension<BearerToken>,
) -> Json<DashboardSnapshot> {
    let service = DashboardService::new(&state.config);

    let snapshot = service.refresh_board(&state.board, Utc::now(), token.as_str()).await;

    Json(snapshot)
}

#[axum::debug_handler]
pub async fn get_rest_windows(
    State(state): State<DashboardState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<RestWindowQuery>,
) -> Result<Json<Vec<DoctorRestSchedule>>, AppError> {
    let now = match &query.now {
        Some(raw) => parse_instant("now", raw)?,
        None => Utc::now(),
    };

    let service = DashboardService::new(&state.config);
    let schedules = service.rest_schedules(now, token.as_str()).await;

    Ok(Json(schedules))
}

#[axum::debug_handler]
pub async fn get_workload(
    State(state): State<DashboardState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<WorkloadQuery>,
) -> Result<Json<Vec<WorkloadRankEntry>>, AppError> {
    let period = query.period(Utc::now())?;

    let service = DashboardService::new(&state.config);
    let ranking = service.workload_ranking(&period, token.as_str()).await;

    Ok(Json(ranking))
}
