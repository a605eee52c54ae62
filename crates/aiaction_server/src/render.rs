//! Server-side page rendering.
//!
//! # Responsibility
//! - Register the embedded handlebars templates once at startup.
//! - Turn core records into flat, display-ready view models.
//!
//! # Invariants
//! - Every page template has a fragment twin used for `HX-Request` swaps;
//!   the page includes the fragment as a partial so both render the same markup.
//! - Output is HTML-escaped by the registry; views never pre-escape.

use aiaction_core::{
    format_clock, Event, NotePage, Question, QuestionQueue, Timeline, Timer,
};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use std::time::Duration;

const PARTIALS: &[(&str, &str)] = &[
    ("header", include_str!("../templates/header.hbs")),
    ("footer", include_str!("../templates/footer.hbs")),
];

const FRAGMENTS: &[(&str, &str)] = &[
    (
        "timeline_content",
        include_str!("../templates/timeline_content.hbs"),
    ),
    ("add_event_form", include_str!("../templates/add_event_form.hbs")),
    ("timer_panel", include_str!("../templates/timer_panel.hbs")),
    ("note_panel", include_str!("../templates/note_panel.hbs")),
    ("question_list", include_str!("../templates/question_list.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    ("timeline_page", include_str!("../templates/timeline_page.hbs")),
    ("timer_page", include_str!("../templates/timer_page.hbs")),
    ("notes_page", include_str!("../templates/notes_page.hbs")),
    ("questions_page", include_str!("../templates/questions_page.hbs")),
];

/// Top-level screens of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Timeline,
    Timer,
    Notes,
    Questions,
}

impl Screen {
    fn page_template(self) -> &'static str {
        match self {
            Self::Timeline => "timeline_page",
            Self::Timer => "timer_page",
            Self::Notes => "notes_page",
            Self::Questions => "questions_page",
        }
    }

    fn fragment_template(self) -> &'static str {
        match self {
            Self::Timeline => "timeline_content",
            Self::Timer => "timer_panel",
            Self::Notes => "note_panel",
            Self::Questions => "question_list",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Timeline => "Timeline",
            Self::Timer => "Speaker Timer",
            Self::Notes => "Speaker Notes",
            Self::Questions => "Question Queue",
        }
    }

    fn nav(self) -> &'static str {
        match self {
            Self::Timeline => "timeline",
            Self::Timer => "timer",
            Self::Notes => "notes",
            Self::Questions => "questions",
        }
    }
}

#[derive(Serialize)]
struct PageFrame<'a, T: Serialize> {
    title: &'static str,
    nav: &'static str,
    #[serde(flatten)]
    body: &'a T,
}

/// Registry of the embedded templates.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    /// Parses and registers every embedded template.
    ///
    /// # Errors
    /// - Returns the first template that fails to parse.
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_helper("clock", Box::new(clock_helper));

        for (name, source) in PARTIALS {
            registry.register_partial(name, *source)?;
        }
        for (name, source) in FRAGMENTS {
            registry.register_partial(name, *source)?;
            registry.register_template_string(name, *source)?;
        }
        for (name, source) in PAGES {
            registry.register_template_string(name, *source)?;
        }

        Ok(Self { registry })
    }

    /// Renders `screen` either as a full page or as its swap fragment.
    pub fn screen<T: Serialize>(
        &self,
        screen: Screen,
        body: &T,
        fragment_only: bool,
    ) -> Result<String, RenderError> {
        if fragment_only {
            return self.registry.render(screen.fragment_template(), body);
        }
        let frame = PageFrame {
            title: screen.title(),
            nav: screen.nav(),
            body,
        };
        self.registry.render(screen.page_template(), &frame)
    }

    /// Renders a single named fragment.
    pub fn fragment<T: Serialize>(&self, name: &str, body: &T) -> Result<String, RenderError> {
        self.registry.render(name, body)
    }
}

/// `{{clock remaining_ms}}` renders milliseconds as `MM:SS`.
fn clock_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    if let Some(millis) = h.param(0).and_then(|param| param.value().as_u64()) {
        out.write(&format_clock(Duration::from_millis(millis)))?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub id: i64,
    pub title: String,
    pub speaker: String,
    pub description: String,
    pub date_label: String,
    pub date_input: String,
    pub time_input: String,
    pub is_upcoming: bool,
}

impl From<&Event> for EventView {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            speaker: event.speaker.clone(),
            description: event.description.clone(),
            date_label: event.date.format("%a, %b %-d %Y · %H:%M UTC").to_string(),
            date_input: event.date.format("%Y-%m-%d").to_string(),
            time_input: event.date.format("%H:%M").to_string(),
            is_upcoming: event.is_upcoming,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineView {
    pub upcoming: Vec<EventView>,
    pub past: Vec<EventView>,
}

impl From<&Timeline> for TimelineView {
    fn from(timeline: &Timeline) -> Self {
        Self {
            upcoming: timeline.upcoming.iter().map(EventView::from).collect(),
            past: timeline.past.iter().map(EventView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimerView {
    pub duration_minutes: u64,
    pub remaining_ms: u64,
    pub is_running: bool,
    pub is_expired: bool,
    pub status_label: &'static str,
}

impl From<&Timer> for TimerView {
    fn from(timer: &Timer) -> Self {
        let status_label = if timer.is_running {
            "Running"
        } else if timer.is_expired() {
            "Time's up"
        } else if timer.remaining_time < timer.duration {
            "Paused"
        } else {
            "Ready"
        };
        Self {
            duration_minutes: timer.duration.as_secs() / 60,
            remaining_ms: u64::try_from(timer.remaining_time.as_millis()).unwrap_or(u64::MAX),
            is_running: timer.is_running,
            is_expired: timer.is_expired(),
            status_label,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NotePageView {
    pub page_number: u32,
    pub total_pages: u32,
    pub content: String,
    pub is_blank: bool,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: u32,
    pub next_page: u32,
}

impl From<&NotePage> for NotePageView {
    fn from(page: &NotePage) -> Self {
        let number = page.note.page_number;
        Self {
            page_number: number,
            total_pages: page.note.total_pages.max(number),
            content: page.note.content.clone(),
            is_blank: page.note.is_placeholder(),
            has_previous: page.has_previous,
            has_next: page.has_next,
            previous_page: number.saturating_sub(1).max(1),
            next_page: number.saturating_add(1),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub submitted_label: String,
    pub answered: bool,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            name: question.name.clone(),
            content: question.content.clone(),
            submitted_label: question.submitted_at.format("%H:%M UTC").to_string(),
            answered: question.answered,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionQueueView {
    pub open: Vec<QuestionView>,
    pub answered: Vec<QuestionView>,
    pub open_count: usize,
}

impl From<&QuestionQueue> for QuestionQueueView {
    fn from(queue: &QuestionQueue) -> Self {
        Self {
            open: queue.open.iter().map(QuestionView::from).collect(),
            answered: queue.answered.iter().map(QuestionView::from).collect(),
            open_count: queue.open.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{QuestionQueueView, Screen, Templates, TimerView};
    use aiaction_core::{Question, QuestionQueue, Timer};
    use std::time::Duration;

    #[test]
    fn embedded_templates_register() {
        assert!(Templates::new().is_ok());
    }

    #[test]
    fn fragments_escape_user_text() {
        let templates = Templates::new().unwrap();
        let queue = QuestionQueue {
            open: vec![Question {
                id: 1,
                ..Question::new("<b>Ada</b>", "<script>alert(1)</script>")
            }],
            answered: Vec::new(),
        };
        let html = templates
            .screen(Screen::Questions, &QuestionQueueView::from(&queue), true)
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(!html.contains("<html"));
    }

    #[test]
    fn timer_panel_uses_clock_helper() {
        let templates = Templates::new().unwrap();
        let timer = Timer::with_duration(Duration::from_secs(10 * 60));
        let html = templates
            .screen(Screen::Timer, &TimerView::from(&timer), false)
            .unwrap();
        assert!(html.contains("10:00"));
        assert!(html.contains("<html"));
    }
}
