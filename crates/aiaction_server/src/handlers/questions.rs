//! Audience question queue handlers.

use crate::error::AppError;
use crate::handlers::is_htmx;
use crate::render::{QuestionQueueView, Screen};
use crate::state::AppState;
use aiaction_core::{QuestionQueue, RecordId};
use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::response::Html;
use log::info;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuestionForm {
    pub name: String,
    pub content: String,
}

pub async fn questions_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let queue = state.run(|app, ctx| app.questions.queue(ctx)).await?;
    render_queue(&state, &queue, is_htmx(&headers))
}

pub async fn submit_question(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<QuestionForm>,
) -> Result<Html<String>, AppError> {
    let (question_id, queue) = state
        .run(move |app, ctx| {
            let question = app.questions.submit(ctx, &form.name, &form.content)?;
            Ok((question.id, app.questions.queue(ctx)?))
        })
        .await?;

    info!("event=question_submit module=server status=ok question_id={question_id}");
    render_queue(&state, &queue, is_htmx(&headers))
}

pub async fn answer_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RecordId>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let answered = state
        .run(move |app, ctx| {
            if !app.questions.mark_answered(ctx, id)? {
                return Ok(None);
            }
            Ok(Some(app.questions.queue(ctx)?))
        })
        .await?;

    let Some(queue) = answered else {
        return Err(AppError::NotFound(format!("question {id} not found")));
    };
    info!("event=question_answer module=server status=ok question_id={id}");
    render_queue(&state, &queue, is_htmx(&headers))
}

fn render_queue(
    state: &AppState,
    queue: &QuestionQueue,
    fragment_only: bool,
) -> Result<Html<String>, AppError> {
    let view = QuestionQueueView::from(queue);
    Ok(Html(state.templates.screen(
        Screen::Questions,
        &view,
        fragment_only,
    )?))
}
