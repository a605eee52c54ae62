//! Speaker note paging use-cases.

use crate::context::RequestContext;
use crate::model::note::Note;
use crate::repo::note_repo::NoteRepository;
use crate::service::{ServiceError, ServiceResult};

/// One page of notes plus navigation hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePage {
    pub note: Note,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads page `page_number` (1-based). Blank pages are not errors.
    pub fn page(&self, ctx: &RequestContext, page_number: u32) -> ServiceResult<NotePage> {
        ensure_page(page_number)?;
        let note = self.repo.get_note(ctx, page_number)?;
        Ok(NotePage {
            has_previous: page_number > 1,
            has_next: page_number < note.total_pages,
            note,
        })
    }

    /// Stores `content` on `page_number`. `total_pages` is raised to at least
    /// the page being written.
    pub fn save_page(
        &self,
        ctx: &RequestContext,
        page_number: u32,
        content: impl Into<String>,
        total_pages: u32,
    ) -> ServiceResult<Note> {
        ensure_page(page_number)?;
        let note = Note::new(page_number, content, total_pages.max(page_number));
        Ok(self.repo.save_note(ctx, note)?)
    }
}

fn ensure_page(page_number: u32) -> ServiceResult<()> {
    if page_number == 0 {
        return Err(ServiceError::InvalidInput(
            "page numbers start at 1".to_string(),
        ));
    }
    Ok(())
}
