//! Timeline and event scheduling handlers.

use crate::error::AppError;
use crate::handlers::is_htmx;
use crate::render::{Screen, TimelineView};
use crate::state::AppState;
use aiaction_core::{NewEvent, RecordId, Timeline};
use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::response::Html;
use chrono::NaiveDateTime;
use log::info;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Add/update form body. Missing fields deserialize as empty strings so the
/// handler can answer with one consistent 400.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub title: String,
    pub speaker: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, UTC
    pub time: String,
}

impl EventForm {
    fn into_new_event(self) -> Result<NewEvent, AppError> {
        let required = [
            &self.title,
            &self.speaker,
            &self.description,
            &self.date,
            &self.time,
        ];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(AppError::BadRequest("All fields are required".to_string()));
        }

        let stamp = format!("{}T{}:00", self.date.trim(), self.time.trim());
        let date = NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%dT%H:%M:%S")
            .map_err(|_| AppError::BadRequest("Invalid date or time format".to_string()))?
            .and_utc();

        Ok(NewEvent {
            title: self.title,
            speaker: self.speaker,
            description: self.description,
            date,
        })
    }
}

pub async fn timeline_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let timeline = state.run(|app, ctx| app.events.timeline(ctx)).await?;
    render_timeline(&state, &timeline, is_htmx(&headers))
}

pub async fn add_event_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.fragment("add_event_form", &json!({}))?))
}

pub async fn add_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<EventForm>,
) -> Result<Html<String>, AppError> {
    let input = form.into_new_event()?;
    let (event, timeline) = state
        .run(move |app, ctx| {
            let event = app.events.add_event(ctx, input)?;
            Ok((event, app.events.timeline(ctx)?))
        })
        .await?;

    info!(
        "event=event_create module=server status=ok event_id={} is_upcoming={}",
        event.id, event.is_upcoming
    );
    render_timeline(&state, &timeline, is_htmx(&headers))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RecordId>,
    headers: HeaderMap,
    Form(form): Form<EventForm>,
) -> Result<Html<String>, AppError> {
    let input = form.into_new_event()?;
    let updated = state
        .run(move |app, ctx| {
            if !app.events.update_event(ctx, id, input)? {
                return Ok(None);
            }
            Ok(Some(app.events.timeline(ctx)?))
        })
        .await?;

    let Some(timeline) = updated else {
        return Err(AppError::NotFound(format!("event {id} not found")));
    };
    info!("event=event_update module=server status=ok event_id={id}");
    render_timeline(&state, &timeline, is_htmx(&headers))
}

fn render_timeline(
    state: &AppState,
    timeline: &Timeline,
    fragment_only: bool,
) -> Result<Html<String>, AppError> {
    let view = TimelineView::from(timeline);
    Ok(Html(state.templates.screen(
        Screen::Timeline,
        &view,
        fragment_only,
    )?))
}
