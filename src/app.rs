use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/alarm",
            get(handlers::list_alarms)
                .post(handlers::create_alarm)
                .put(handlers::update_alarm)
                .delete(handlers::delete_alarm),
        )
        .route("/api/stop", get(handlers::stop_alarm))
        .with_state(state)
}
