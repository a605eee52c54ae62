//! Speaker timer handlers.

use crate::error::AppError;
use crate::handlers::is_htmx;
use crate::render::{Screen, TimerView};
use crate::state::AppState;
use aiaction_core::{format_clock, Timer};
use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Json;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetForm {
    pub minutes: String,
}

/// JSON view of the timer for pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub duration_secs: u64,
    pub remaining_ms: u64,
    pub is_running: bool,
    pub is_expired: bool,
    /// `MM:SS`
    pub display: String,
}

impl From<&Timer> for TimerState {
    fn from(timer: &Timer) -> Self {
        Self {
            duration_secs: timer.duration.as_secs(),
            remaining_ms: u64::try_from(timer.remaining_time.as_millis()).unwrap_or(u64::MAX),
            is_running: timer.is_running,
            is_expired: timer.is_expired(),
            display: format_clock(timer.remaining_time),
        }
    }
}

pub async fn timer_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let timer = state.run(|app, ctx| app.timer.current(ctx)).await?;
    render_timer(&state, &timer, is_htmx(&headers))
}

pub async fn timer_panel(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let timer = state.run(|app, ctx| app.timer.current(ctx)).await?;
    render_timer(&state, &timer, true)
}

pub async fn timer_state(State(state): State<Arc<AppState>>) -> Result<Json<TimerState>, AppError> {
    let timer = state.run(|app, ctx| app.timer.current(ctx)).await?;
    Ok(Json(TimerState::from(&timer)))
}

pub async fn start_timer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let timer = state.run(|app, ctx| app.timer.start(ctx)).await?;
    info!(
        "event=timer_start module=server status=ok is_running={} remaining_ms={}",
        timer.is_running,
        timer.remaining_time.as_millis()
    );
    render_timer(&state, &timer, is_htmx(&headers))
}

pub async fn pause_timer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let timer = state.run(|app, ctx| app.timer.pause(ctx)).await?;
    info!(
        "event=timer_pause module=server status=ok remaining_ms={}",
        timer.remaining_time.as_millis()
    );
    render_timer(&state, &timer, is_htmx(&headers))
}

pub async fn reset_timer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ResetForm>,
) -> Result<Html<String>, AppError> {
    let minutes: u32 = form
        .minutes
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid minutes `{}`", form.minutes.trim())))?;
    let timer = state
        .run(move |app, ctx| app.timer.reset(ctx, minutes))
        .await?;
    info!("event=timer_reset module=server status=ok minutes={minutes}");
    render_timer(&state, &timer, is_htmx(&headers))
}

fn render_timer(state: &AppState, timer: &Timer, fragment_only: bool) -> Result<Html<String>, AppError> {
    let view = TimerView::from(timer);
    Ok(Html(state.templates.screen(Screen::Timer, &view, fragment_only)?))
}
