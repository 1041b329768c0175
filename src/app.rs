use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub const SAVE_PATH: &str = "/api/expenses";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/style.css", get(handlers::style))
        .route("/script.js", get(handlers::script))
        .route(
            SAVE_PATH,
            post(handlers::save_expenses).fallback(handlers::method_not_allowed),
        )
        .with_state(state)
}
