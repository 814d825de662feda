use crate::dates::{date_key, parse_date_key};
use crate::errors::AppError;
use crate::models::{
    DashboardStats, DateQuery, DayOverview, MonthlyStats, Palette, PeriodMode, PeriodStats, Record,
    SessionStatus, Settings, StopRequest,
};
use crate::state::AppState;
use crate::stats;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;

type JsonResult<T> = Result<Json<T>, AppError>;

pub async fn list_records(State(state): State<AppState>) -> JsonResult<Vec<Record>> {
    Ok(Json(state.records.all().await?))
}

pub async fn clear_records(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.records.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn latest_record(State(state): State<AppState>) -> JsonResult<Option<Record>> {
    Ok(Json(state.records.latest().await?))
}

pub async fn records_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> JsonResult<Vec<Record>> {
    let date = parse_date(&date)?;
    Ok(Json(state.records.by_date(&date_key(date)).await?))
}

pub async fn records_by_day(
    State(state): State<AppState>,
    Path((year, month, day)): Path<(i32, u32, u32)>,
) -> JsonResult<Vec<Record>> {
    Ok(Json(state.records.by_day(year, month, day).await?))
}

pub async fn records_by_week(
    State(state): State<AppState>,
    Path((year, week)): Path<(i32, u32)>,
) -> JsonResult<Vec<Record>> {
    Ok(Json(state.records.by_week(year, week).await?))
}

pub async fn records_by_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> JsonResult<Vec<Record>> {
    Ok(Json(state.records.by_month(year, month).await?))
}

pub async fn records_by_year(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> JsonResult<Vec<Record>> {
    Ok(Json(state.records.by_year(year).await?))
}

pub async fn calendar(State(state): State<AppState>) -> JsonResult<BTreeMap<String, Vec<Record>>> {
    Ok(Json(state.records.grouped_by_date().await?))
}

pub async fn session_status(State(state): State<AppState>) -> Json<SessionStatus> {
    let tracker = state.tracker.lock().await;
    Json(tracker.status(state.clock.now()))
}

pub async fn start_session(State(state): State<AppState>) -> Json<SessionStatus> {
    let now = state.clock.now();
    let mut tracker = state.tracker.lock().await;
    tracker.start(now);
    Json(tracker.status(now))
}

pub async fn stop_session(
    State(state): State<AppState>,
    payload: Option<Json<StopRequest>>,
) -> JsonResult<Option<Record>> {
    // The body is optional; a bare POST stops without a location.
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let now = state.clock.now();
    let mut tracker = state.tracker.lock().await;
    let record = tracker
        .stop(now, payload.location, &Local, &state.records)
        .await?;
    Ok(Json(record))
}

pub async fn dashboard(State(state): State<AppState>) -> JsonResult<DashboardStats> {
    let records = state.records.all().await?;
    Ok(Json(stats::dashboard_now(&records, state.clock.now(), &Local)))
}

pub async fn monthly_overview(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> JsonResult<Vec<DayOverview>> {
    let date = reference_date(&state, &query)?;
    let records = state.records.all().await?;
    Ok(Json(stats::monthly_overview_for(&records, date)))
}

pub async fn monthly_stats(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> JsonResult<MonthlyStats> {
    Ok(Json(state.records.monthly_stats(year, month).await?))
}

pub async fn period_stats(
    State(state): State<AppState>,
    Path(mode): Path<PeriodMode>,
    Query(query): Query<DateQuery>,
) -> JsonResult<PeriodStats> {
    let anchor = reference_date(&state, &query)?;
    let records = state.records.records_for_period(mode, anchor).await?;
    Ok(Json(stats::period_stats(mode, anchor, &records)))
}

pub async fn get_settings(State(state): State<AppState>) -> JsonResult<Settings> {
    Ok(Json(state.settings.get().await?))
}

pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> JsonResult<Settings> {
    state.settings.save(&settings).await?;
    Ok(Json(settings))
}

pub async fn theme(State(state): State<AppState>) -> JsonResult<Palette> {
    let settings = state.settings.get().await?;
    Ok(Json(settings.theme_color.palette()))
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    parse_date_key(value.trim())
        .ok_or_else(|| AppError::bad_request(format!("expected YYYY-MM-DD, got '{value}'")))
}

/// `?date=` when given, otherwise today in local time.
fn reference_date(state: &AppState, query: &DateQuery) -> Result<NaiveDate, AppError> {
    match query.date.as_deref() {
        Some(value) => parse_date(value),
        None => Ok(state.clock.now().with_timezone(&Local).date_naive()),
    }
}
