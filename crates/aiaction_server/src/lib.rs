//! HTTP front end for the AI in Action meetup app.
//!
//! Routes render server-side pages; requests sent by htmx (`HX-Request: true`)
//! get only the fragment they swap.

pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod state;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use handlers::{events, notes, questions, timer};
use state::AppState;
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(events::timeline_page))
        .route("/events/add-form", get(events::add_event_form))
        .route("/events/add", post(events::add_event))
        .route("/events/{id}/update", post(events::update_event))
        .route("/timer", get(timer::timer_page))
        .route("/timer/panel", get(timer::timer_panel))
        .route("/timer/state", get(timer::timer_state))
        .route("/timer/start", post(timer::start_timer))
        .route("/timer/pause", post(timer::pause_timer))
        .route("/timer/reset", post(timer::reset_timer))
        .route("/notes", get(notes::notes_index))
        .route("/notes/{page}", get(notes::notes_page).post(notes::save_note))
        .route(
            "/questions",
            get(questions::questions_page).post(questions::submit_question),
        )
        .route("/questions/{id}/answer", post(questions::answer_question))
        .route("/healthz", get(handlers::healthz))
        .route("/static/js/app.js", get(handlers::app_js))
        .layer(middleware::from_fn(handlers::log_requests))
        .with_state(state)
}
