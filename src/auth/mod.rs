use crate::state::AppState;
use axum::Router;

pub mod controllers;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::app_routes())
}
