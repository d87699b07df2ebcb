//! Headless domain logic for the sitedeck marketing/documentation site:
//! the slide-deck presentation controller and the page-behavior state
//! machines, with all platform services (storage, speech, DOM surface)
//! injected as traits so everything is testable without a browser.

pub mod behaviors;
pub mod error;
pub mod fragment;
pub mod keys;
pub mod metrics;
pub mod narration;
pub mod presentation;
pub mod slide;

pub use error::{Error, Result};
pub use keys::{command_for, DeckCommand, Key, KeyContext};
pub use metrics::{format_count, MetricUpdate, MetricsSnapshot};
pub use narration::{NarrationSlot, SpeechEngine, UtteranceId, UtteranceRequest};
pub use presentation::{DeckConfig, DeckController, DeckView, PositionStore};
pub use slide::{DeckState, Segment, Slide, SlideDeck};
