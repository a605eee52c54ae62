//! Audience question queue use-cases.
//!
//! # Invariants
//! - Blank names become [`ANONYMOUS_NAME`].
//! - Content is required and capped at [`MAX_QUESTION_CHARS`] characters.

use crate::context::RequestContext;
use crate::model::question::Question;
use crate::model::RecordId;
use crate::repo::question_repo::QuestionRepository;
use crate::service::{ServiceError, ServiceResult};

pub const ANONYMOUS_NAME: &str = "Anonymous";
pub const MAX_QUESTION_CHARS: usize = 500;

/// Questions split for display, each half newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionQueue {
    pub open: Vec<Question>,
    pub answered: Vec<Question>,
}

/// Question service facade over repository implementations.
pub struct QuestionService<R: QuestionRepository> {
    repo: R,
}

impl<R: QuestionRepository> QuestionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn queue(&self, ctx: &RequestContext) -> ServiceResult<QuestionQueue> {
        let (answered, open) = self
            .repo
            .get_questions(ctx)?
            .into_iter()
            .partition(|question| question.answered);
        Ok(QuestionQueue { open, answered })
    }

    pub fn submit(
        &self,
        ctx: &RequestContext,
        name: &str,
        content: &str,
    ) -> ServiceResult<Question> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::InvalidInput(
                "question content is required".to_string(),
            ));
        }
        if content.chars().count() > MAX_QUESTION_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "question is longer than {MAX_QUESTION_CHARS} characters"
            )));
        }

        let name = match name.trim() {
            "" => ANONYMOUS_NAME,
            trimmed => trimmed,
        };
        Ok(self.repo.add_question(ctx, Question::new(name, content))?)
    }

    /// Returns `false` when no question has `id`.
    pub fn mark_answered(&self, ctx: &RequestContext, id: RecordId) -> ServiceResult<bool> {
        Ok(self.repo.mark_as_answered(ctx, id)?)
    }
}
