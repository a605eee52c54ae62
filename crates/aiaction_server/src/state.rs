//! Shared application state.
//!
//! # Responsibility
//! - Own the four use-case services and the template registry.
//! - Run blocking repository work off the async runtime under a
//!   request-scoped deadline.

use crate::error::AppError;
use crate::render::Templates;
use aiaction_core::{
    Clock, EventRepository, EventService, NoteRepository, NoteService, QuestionRepository,
    QuestionService, Repositories, RequestContext, ServiceResult, TimerRepository, TimerService,
    UpcomingPolicy,
};
use handlebars::TemplateError;
use std::sync::Arc;
use std::time::Duration;

/// Default storage deadline for one request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct AppState {
    pub events: EventService<Arc<dyn EventRepository>>,
    pub timer: TimerService<Arc<dyn TimerRepository>>,
    pub notes: NoteService<Arc<dyn NoteRepository>>,
    pub questions: QuestionService<Arc<dyn QuestionRepository>>,
    pub templates: Templates,
    /// Backend label reported by `/healthz`.
    pub backend: String,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        clock: Arc<dyn Clock>,
        policy: UpcomingPolicy,
        request_timeout: Duration,
        backend: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            events: EventService::new(repos.events, clock.clone(), policy),
            timer: TimerService::new(repos.timer, clock),
            notes: NoteService::new(repos.notes),
            questions: QuestionService::new(repos.questions),
            templates: Templates::new()?,
            backend: backend.into(),
            request_timeout,
        })
    }

    /// Fresh context expiring after the configured request timeout.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.request_timeout)
    }

    /// Runs `op` on the blocking pool.
    ///
    /// When the deadline passes first the context is cancelled, so any
    /// repository call `op` has not started yet fails fast, and the caller
    /// gets [`AppError::Timeout`].
    pub async fn run<T, F>(self: &Arc<Self>, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&AppState, &RequestContext) -> ServiceResult<T> + Send + 'static,
    {
        let ctx = self.request_context();
        let task_ctx = ctx.clone();
        let task_state = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || op(&task_state, &task_ctx));

        match tokio::time::timeout(self.request_timeout, task).await {
            Ok(Ok(result)) => result.map_err(AppError::from),
            Ok(Err(join_err)) => Err(AppError::Internal(format!(
                "storage task failed: {join_err}"
            ))),
            Err(_) => {
                ctx.cancel();
                Err(AppError::Timeout)
            }
        }
    }
}
