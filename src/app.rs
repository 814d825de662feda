use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/records",
            get(handlers::list_records).delete(handlers::clear_records),
        )
        .route("/api/records/latest", get(handlers::latest_record))
        .route("/api/records/date/:date", get(handlers::records_by_date))
        .route("/api/records/day/:year/:month/:day", get(handlers::records_by_day))
        .route("/api/records/week/:year/:week", get(handlers::records_by_week))
        .route("/api/records/month/:year/:month", get(handlers::records_by_month))
        .route("/api/records/year/:year", get(handlers::records_by_year))
        .route("/api/calendar", get(handlers::calendar))
        .route("/api/session", get(handlers::session_status))
        .route("/api/session/start", post(handlers::start_session))
        .route("/api/session/stop", post(handlers::stop_session))
        .route("/api/stats/dashboard", get(handlers::dashboard))
        .route("/api/stats/overview", get(handlers::monthly_overview))
        .route("/api/stats/month/:year/:month", get(handlers::monthly_stats))
        .route("/api/stats/period/:mode", get(handlers::period_stats))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::put_settings),
        )
        .route("/api/theme", get(handlers::theme))
        .with_state(state)
}

