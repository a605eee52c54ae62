//! Question repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `submitted_at DESC, id DESC` (newest first).
//! - `add_question` owns `id`, `submitted_at` and `answered = false`.
//! - `mark_as_answered` is idempotent and reports whether the id exists.

use crate::clock::Clock;
use crate::context::RequestContext;
use crate::db::Database;
use crate::model::question::Question;
use crate::model::RecordId;
use crate::repo::{bool_to_int, datetime_from_db, datetime_to_db, parse_bool, RepoResult};
use rusqlite::{params, Row};
use std::sync::Arc;

/// Repository interface for the audience question queue.
pub trait QuestionRepository: Send + Sync {
    /// All questions, newest first.
    fn get_questions(&self, ctx: &RequestContext) -> RepoResult<Vec<Question>>;
    /// Stores a question with a fresh id and submission time, unanswered.
    fn add_question(&self, ctx: &RequestContext, question: Question) -> RepoResult<Question>;
    /// Flags a question as answered. Returns `false` for unknown ids.
    fn mark_as_answered(&self, ctx: &RequestContext, id: RecordId) -> RepoResult<bool>;
}

impl<T: QuestionRepository + ?Sized> QuestionRepository for Arc<T> {
    fn get_questions(&self, ctx: &RequestContext) -> RepoResult<Vec<Question>> {
        (**self).get_questions(ctx)
    }

    fn add_question(&self, ctx: &RequestContext, question: Question) -> RepoResult<Question> {
        (**self).add_question(ctx, question)
    }

    fn mark_as_answered(&self, ctx: &RequestContext, id: RecordId) -> RepoResult<bool> {
        (**self).mark_as_answered(ctx, id)
    }
}

/// SQLite-backed question repository.
pub struct SqliteQuestionRepository {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl SqliteQuestionRepository {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }
}

impl QuestionRepository for SqliteQuestionRepository {
    fn get_questions(&self, ctx: &RequestContext) -> RepoResult<Vec<Question>> {
        ctx.check()?;
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT
                id,
                name,
                content,
                submitted_at,
                answered
             FROM questions
             ORDER BY submitted_at DESC, id DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next()? {
            questions.push(parse_question_row(row)?);
        }
        Ok(questions)
    }

    fn add_question(&self, ctx: &RequestContext, mut question: Question) -> RepoResult<Question> {
        ctx.check()?;
        question.validate()?;
        question.submitted_at = self.clock.now();
        question.answered = false;
        let submitted_at = datetime_to_db("questions.submitted_at", question.submitted_at)?;

        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO questions (name, content, submitted_at, answered)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                question.name.as_str(),
                question.content.as_str(),
                submitted_at,
                bool_to_int(question.answered),
            ],
        )?;
        question.id = conn.last_insert_rowid();
        Ok(question)
    }

    fn mark_as_answered(&self, ctx: &RequestContext, id: RecordId) -> RepoResult<bool> {
        ctx.check()?;
        let conn = self.db.lock()?;
        // Already-answered rows still count as matched, which keeps this idempotent.
        let changed = conn.execute(
            "UPDATE questions
             SET
                answered = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;
        Ok(changed > 0)
    }
}

fn parse_question_row(row: &Row<'_>) -> RepoResult<Question> {
    Ok(Question {
        id: row.get("id")?,
        name: row.get("name")?,
        content: row.get("content")?,
        submitted_at: datetime_from_db(row.get("submitted_at")?),
        answered: parse_bool("questions.answered", row.get("answered")?)?,
    })
}
