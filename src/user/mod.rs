//! Per-user views: recommendations, search with paging, activity and data export.

mod dto;
mod handlers;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
