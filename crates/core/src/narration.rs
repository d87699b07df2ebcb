//! Narration text derivation and the single-slot utterance handle.
//!
//! The deck narrates at most one utterance at any time. `NarrationSlot`
//! makes that invariant explicit: starting a new utterance always cancels
//! the previous one first, and the slot is cleared when the platform
//! reports the utterance finished or failed.

use crate::error::Result;
use crate::slide::Slide;

/// Maximum length of narration text derived from slide content, in
/// characters. Explicit notes are not truncated by the deriver.
pub const MAX_NARRATION_CHARS: usize = 500;

/// Narration speech rate, slightly slower than the platform default of 1.0.
pub const NARRATION_RATE: f32 = 0.9;

/// Identifier for one in-flight utterance, issued by the speech engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtteranceId(pub u64);

/// Parameters for one speech act.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceRequest {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl UtteranceRequest {
    /// Build a request with the deck's fixed rate and default pitch/volume.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rate: NARRATION_RATE,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// Platform speech synthesis service.
///
/// Absence is detected once via `available()` and is permanent for the
/// session. Lifecycle events (end, error) are reported back to the
/// controller by the platform layer, not through this trait.
pub trait SpeechEngine {
    /// Whether speech synthesis exists on this platform.
    fn available(&self) -> bool;

    /// Start speaking. The engine must treat this as superseding any
    /// utterance it is still playing.
    fn speak(&mut self, request: &UtteranceRequest) -> Result<UtteranceId>;

    /// Stop any in-flight utterance.
    fn cancel(&mut self);
}

/// Resolve the text narrated for a slide.
///
/// Explicit notes win when non-empty; otherwise the slide's prose body with
/// code regions excised, hard-truncated at `max_chars` characters (the cut
/// never splits a code point but may split a word). Returns `None` when
/// nothing speakable remains.
pub fn narration_text(slide: &Slide, max_chars: usize) -> Option<String> {
    match slide.notes.as_deref().map(str::trim) {
        Some(notes) if !notes.is_empty() => Some(notes.to_string()),
        _ => {
            let body = slide.spoken_body();
            let trimmed = body.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(truncate_chars(trimmed, max_chars))
            }
        }
    }
}

/// Hard cut after `max` characters, on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Handle for the single cancelable in-flight utterance.
#[derive(Debug, Default)]
pub struct NarrationSlot {
    active: Option<UtteranceId>,
}

impl NarrationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an utterance is currently in flight.
    pub fn is_speaking(&self) -> bool {
        self.active.is_some()
    }

    /// The in-flight utterance, if any.
    pub fn active(&self) -> Option<UtteranceId> {
        self.active
    }

    /// Cancel any previous utterance, then start a new one.
    pub fn begin<E: SpeechEngine>(
        &mut self,
        engine: &mut E,
        request: &UtteranceRequest,
    ) -> Result<()> {
        self.cancel(engine);
        self.active = Some(engine.speak(request)?);
        Ok(())
    }

    /// Cancel the in-flight utterance, if any.
    pub fn cancel<E: SpeechEngine>(&mut self, engine: &mut E) {
        if self.active.take().is_some() {
            engine.cancel();
        }
    }

    /// Clear the slot when the engine reports `id` ended or failed.
    ///
    /// A stale id (already superseded by a newer utterance) is ignored.
    pub fn finish(&mut self, id: UtteranceId) {
        if self.active == Some(id) {
            self.active = None;
        }
    }
}
