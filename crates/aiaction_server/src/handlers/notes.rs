//! Speaker note handlers.

use crate::error::AppError;
use crate::handlers::is_htmx;
use crate::render::{NotePageView, Screen};
use crate::state::AppState;
use aiaction_core::NotePage;
use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::response::Html;
use log::info;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NoteForm {
    pub content: String,
    /// Blank keeps the deck at least as long as the page being saved.
    pub total_pages: String,
}

pub async fn notes_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    show_page(&state, 1, is_htmx(&headers)).await
}

pub async fn notes_page(
    State(state): State<Arc<AppState>>,
    Path(page): Path<u32>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    show_page(&state, page, is_htmx(&headers)).await
}

pub async fn save_note(
    State(state): State<Arc<AppState>>,
    Path(page): Path<u32>,
    headers: HeaderMap,
    Form(form): Form<NoteForm>,
) -> Result<Html<String>, AppError> {
    let total_pages = match form.total_pages.trim() {
        "" => 0,
        raw => raw
            .parse::<u32>()
            .map_err(|_| AppError::BadRequest(format!("invalid total_pages `{raw}`")))?,
    };
    let content = form.content;

    let note_page = state
        .run(move |app, ctx| {
            app.notes.save_page(ctx, page, content, total_pages)?;
            app.notes.page(ctx, page)
        })
        .await?;

    info!(
        "event=note_save module=server status=ok page={page} total_pages={}",
        note_page.note.total_pages
    );
    render_notes(&state, &note_page, is_htmx(&headers))
}

async fn show_page(
    state: &Arc<AppState>,
    page: u32,
    fragment_only: bool,
) -> Result<Html<String>, AppError> {
    let note_page = state.run(move |app, ctx| app.notes.page(ctx, page)).await?;
    render_notes(state, &note_page, fragment_only)
}

fn render_notes(
    state: &AppState,
    page: &NotePage,
    fragment_only: bool,
) -> Result<Html<String>, AppError> {
    let view = NotePageView::from(page);
    Ok(Html(state.templates.screen(Screen::Notes, &view, fragment_only)?))
}
