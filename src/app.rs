use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/tabs/:tab", get(handlers::get_tab))
        .route("/api/callback", post(handlers::callback))
        .with_state(state)
}
