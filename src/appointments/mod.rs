mod dto;
pub mod handlers;
mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo_types::{Appointment, AppointmentStatus};

pub fn router() -> Router<AppState> {
    handlers::appointment_routes()
}
