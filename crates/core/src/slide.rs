//! Domain types for the slide deck.

use serde::{Deserialize, Serialize};

/// One rendered region of a slide body.
///
/// Code regions are kept separate so derived narration can skip them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Segment {
    /// Prose content, eligible for narration.
    Text(String),
    /// A code listing; never narrated.
    Code(String),
}

/// A single slide, identified by its 1-based position in the deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Explicit speaker notes, preferred as the narration source.
    pub notes: Option<String>,

    /// Rendered body content in document order.
    pub body: Vec<Segment>,
}

impl Slide {
    /// Create an empty slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            notes: None,
            body: Vec::new(),
        }
    }

    /// Attach speaker notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Append a prose segment to the body.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.body.push(Segment::Text(text.into()));
    }

    /// Append a code segment to the body.
    pub fn add_code(&mut self, code: impl Into<String>) {
        self.body.push(Segment::Code(code.into()));
    }

    /// The body's prose text with all code regions excised, joined in order.
    ///
    /// This is the fallback narration source when a slide has no notes.
    pub fn spoken_body(&self) -> String {
        let parts: Vec<&str> = self
            .body
            .iter()
            .filter_map(|segment| match segment {
                Segment::Text(text) => Some(text.trim()),
                Segment::Code(_) => None,
            })
            .filter(|text| !text.is_empty())
            .collect();

        parts.join(" ")
    }
}

/// An ordered, immutable collection of slides.
#[derive(Debug, Clone, Default)]
pub struct SlideDeck {
    slides: Vec<Slide>,
}

impl SlideDeck {
    /// Build a deck from slides already in presentation order.
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    /// Number of slides in the deck.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Look up a slide by its 1-based number.
    pub fn get(&self, number: usize) -> Option<&Slide> {
        number.checked_sub(1).and_then(|idx| self.slides.get(idx))
    }

    /// Whether the given 1-based number addresses a slide in this deck.
    pub fn contains(&self, number: usize) -> bool {
        (1..=self.slides.len()).contains(&number)
    }
}

/// Snapshot of the controller's state.
///
/// Invariant: `current` is always within `[1, total]` while `total > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeckState {
    /// 1-based number of the slide currently shown.
    pub current: usize,
    /// Total slide count, fixed at initialization.
    pub total: usize,
    /// Whether the speaker-notes panel is shown.
    pub notes_visible: bool,
    /// Whether slide changes are narrated aloud.
    pub narration_enabled: bool,
}
