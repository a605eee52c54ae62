//! Speaker note pages.
//!
//! Notes are sparse: a page without a stored note is represented by a blank
//! placeholder, never by an error.

use super::{RecordId, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: RecordId,
    pub content: String,
    /// Lookup key, starting at 1.
    pub page_number: u32,
    pub total_pages: u32,
}

impl Note {
    pub fn new(page_number: u32, content: impl Into<String>, total_pages: u32) -> Self {
        Self {
            id: 0,
            content: content.into(),
            page_number,
            total_pages,
        }
    }

    /// Stand-in returned for pages that have no stored note.
    pub fn placeholder(page_number: u32, total_pages: u32) -> Self {
        Self::new(page_number, String::new(), total_pages)
    }

    /// Never persisted (placeholder or not yet saved).
    pub fn is_placeholder(&self) -> bool {
        self.id == 0
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_number == 0 {
            return Err(ValidationError::InvalidPageNumber(self.page_number));
        }
        Ok(())
    }
}
