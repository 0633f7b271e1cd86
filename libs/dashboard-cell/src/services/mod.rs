pub mod board;
pub mod dashboard;
pub mod rest_window;
pub mod workload;

pub use board::{DashboardBoard, RefreshTicket, Section};
pub use dashboard::DashboardService;
pub use workload::WorkloadNormalizer;
