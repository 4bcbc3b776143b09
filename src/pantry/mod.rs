use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
mod repo_types;
pub mod services;

pub use repo::PgPantryStore;
pub use repo_types::PantryRecord;

pub fn router() -> Router<AppState> {
    handlers::scan_routes()
}
