use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::{DashboardSnapshot, DoctorRestSchedule, WorkloadRankEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    RestWindows,
    Workload,
}

/// Handed out when a refresh starts; the result is only applied if no newer
/// refresh of the same section has been applied in the meantime.
///
/// The ticket counts as outstanding until it is applied or dropped, so a
/// refresh cancelled mid-flight stops reporting the section as loading.
#[derive(Debug)]
pub struct RefreshTicket<'a> {
    board: &'a DashboardBoard,
    section: Section,
    seq: u64,
}

impl RefreshTicket<'_> {
    pub fn section(&self) -> Section {
        self.section
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Drop for RefreshTicket<'_> {
    fn drop(&mut self) {
        self.board.outstanding().retain(|&(section, seq)| (section, seq) != (self.section, self.seq));
    }
}

#[derive(Debug, Default)]
struct SectionState {
    applied: u64,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct BoardState {
    rest: SectionState,
    workload: SectionState,
    rest_schedules: Vec<DoctorRestSchedule>,
    workload_entries: Vec<WorkloadRankEntry>,
}

impl BoardState {
    fn section_mut(&mut self, section: Section) -> &mut SectionState {
        match section {
            Section::RestWindows => &mut self.rest,
            Section::Workload => &mut self.workload,
        }
    }
}

/// Last-applied dashboard results, guarded against out-of-order completions.
#[derive(Debug, Default)]
pub struct DashboardBoard {
    next_seq: AtomicU64,
    // Never held across an await.
    in_flight: Mutex<Vec<(Section, u64)>>,
    state: RwLock<BoardState>,
}

impl DashboardBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn outstanding(&self) -> MutexGuard<'_, Vec<(Section, u64)>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn begin(&self, section: Section) -> RefreshTicket<'_> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.outstanding().push((section, seq));
        debug!("Issued refresh ticket {} for {:?}", seq, section);
        RefreshTicket { board: self, section, seq }
    }

    pub async fn apply_rest_schedules(&self, ticket: RefreshTicket<'_>, schedules: Vec<DoctorRestSchedule>) -> bool {
        self.apply(ticket, Section::RestWindows, |state| state.rest_schedules = schedules).await
    }

    pub async fn apply_workload(&self, ticket: RefreshTicket<'_>, entries: Vec<WorkloadRankEntry>) -> bool {
        self.apply(ticket, Section::Workload, |state| state.workload_entries = entries).await
    }

    async fn apply<F>(&self, ticket: RefreshTicket<'_>, expected: Section, write: F) -> bool
    where
        F: FnOnce(&mut BoardState),
    {
        if ticket.section != expected {
            warn!("Refresh ticket for {:?} used to apply {:?}, ignoring", ticket.section, expected);
            return false;
        }

        let mut state = self.state.write().await;
        let slot = state.section_mut(expected);
        if ticket.seq <= slot.applied {
            debug!(
                "Discarding stale {:?} result (ticket {}, already applied {})",
                expected, ticket.seq, slot.applied
            );
            return false;
        }
        slot.applied = ticket.seq;
        slot.updated_at = Some(Utc::now());

        write(&mut *state);
        true
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.read().await;
        let in_flight = self.outstanding();
        let loading = |section: Section, applied: u64| {
            in_flight.iter().any(|&(s, seq)| s == section && seq > applied)
        };

        DashboardSnapshot {
            rest_schedules: state.rest_schedules.clone(),
            rest_loading: loading(Section::RestWindows, state.rest.applied),
            rest_updated_at: state.rest.updated_at,
            workload: state.workload_entries.clone(),
            workload_loading: loading(Section::Workload, state.workload.applied),
            workload_updated_at: state.workload.updated_at,
        }
    }
}
