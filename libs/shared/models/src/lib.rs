pub mod auth;
pub mod error;
pub mod medical;

pub use error::AppError;
pub use medical::{ActivityKind, DoctorRef, PatientRef};
