use crate::state::AppState;
use axum::Router;

mod dto;
pub mod extractors;
pub mod guard;
pub mod handlers;
pub mod password;
pub mod principal;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod session;

pub use extractors::CurrentUser;
pub use principal::{Principal, Role};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
