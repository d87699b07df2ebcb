//! The slide-deck controller: navigation state machine, UI reflection,
//! position persistence, and narration.
//!
//! One controller is constructed per page that carries a presentation
//! container. It reacts to keyboard and click input and to external URL
//! fragment changes, and drives all visual and audio side effects through
//! the injected [`DeckView`], [`PositionStore`], and [`SpeechEngine`].

use crate::error::{Error, Result};
use crate::fragment::{is_slide_fragment, parse_slide_fragment};
use crate::keys::{command_for, DeckCommand, Key, KeyContext};
use crate::narration::{
    narration_text, NarrationSlot, SpeechEngine, UtteranceId, UtteranceRequest,
    MAX_NARRATION_CHARS,
};
use crate::slide::{DeckState, SlideDeck};

/// Durable per-origin storage for the last-viewed slide position.
///
/// Read once at construction, written on every successful slide change.
pub trait PositionStore {
    fn load(&mut self) -> Option<usize>;
    fn store(&mut self, slide: usize);
}

/// UI surface the controller reflects its state into.
///
/// Every method is a plain side effect. Page-backed implementations treat
/// missing elements as no-ops so the deck degrades gracefully.
pub trait DeckView {
    /// Make `slide` the only active slide.
    fn activate_slide(&mut self, slide: usize);
    fn set_counter(&mut self, current: usize, total: usize);
    fn set_progress(&mut self, percent: f64);
    fn set_nav_enabled(&mut self, prev: bool, next: bool);
    fn set_title(&mut self, title: &str);
    /// Write the `#slide-N` fragment to the URL. The echoing fragment-change
    /// notification is routed back into [`DeckController::on_fragment_changed`].
    fn set_fragment(&mut self, slide: usize);
    fn set_notes_visible(&mut self, visible: bool);
    fn set_narration_active(&mut self, active: bool);
    fn is_fullscreen(&self) -> bool;
    fn request_fullscreen(&mut self) -> Result<()>;
    fn exit_fullscreen(&mut self);
}

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct DeckConfig {
    /// Base for the document title; the slide position is appended.
    pub title_base: String,
    /// Maximum characters of narration text derived from slide content.
    pub narration_chars: usize,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            title_base: "Presentation".to_string(),
            narration_chars: MAX_NARRATION_CHARS,
        }
    }
}

impl DeckConfig {
    pub fn new(title_base: impl Into<String>) -> Self {
        Self {
            title_base: title_base.into(),
            ..Default::default()
        }
    }

    pub fn with_narration_chars(mut self, chars: usize) -> Self {
        self.narration_chars = chars;
        self
    }
}

/// Stateful controller for one slide deck.
pub struct DeckController<V, S, E> {
    deck: SlideDeck,
    config: DeckConfig,
    state: DeckState,
    view: V,
    store: S,
    speech: E,
    narration: NarrationSlot,
}

impl<V: DeckView, S: PositionStore, E: SpeechEngine> DeckController<V, S, E> {
    /// Build a controller for a discovered deck.
    ///
    /// An empty deck is fatal to this controller (`Error::EmptyDeck`); the
    /// caller logs it and leaves the page otherwise untouched. A slide
    /// fragment in the URL decides the starting slide outright: in range it
    /// is used, out of range or malformed the deck starts at slide 1. Only
    /// when the URL carries no slide fragment does the persisted position
    /// apply (when in range), else slide 1. Call [`start`](Self::start)
    /// afterwards to show it.
    pub fn new(
        deck: SlideDeck,
        config: DeckConfig,
        view: V,
        mut store: S,
        speech: E,
        initial_fragment: Option<&str>,
    ) -> Result<Self> {
        if deck.is_empty() {
            return Err(Error::EmptyDeck);
        }

        let total = deck.len();
        // A slide-shaped fragment claims the start position even when its
        // number is unusable; the store is only consulted when the URL says
        // nothing about a slide.
        let current = match initial_fragment.filter(|hash| is_slide_fragment(hash)) {
            Some(hash) => parse_slide_fragment(hash)
                .filter(|&n| deck.contains(n))
                .unwrap_or(1),
            None => store.load().filter(|&n| deck.contains(n)).unwrap_or(1),
        };

        Ok(Self {
            deck,
            config,
            state: DeckState {
                current,
                total,
                notes_visible: false,
                narration_enabled: false,
            },
            view,
            store,
            speech,
            narration: NarrationSlot::new(),
        })
    }

    /// Show the starting slide and reflect the initial UI.
    pub fn start(&mut self) {
        self.show_slide(self.state.current);
    }

    /// Current state snapshot.
    pub fn state(&self) -> DeckState {
        self.state
    }

    /// Whether a narration utterance is in flight.
    pub fn is_narrating(&self) -> bool {
        self.narration.is_speaking()
    }

    /// Show slide `slide`, clamped into `[1, total]`.
    ///
    /// Recomputes all derived UI, persists the position, writes the URL
    /// fragment, and restarts narration when enabled. Any in-flight
    /// utterance is cancelled first.
    pub fn show_slide(&mut self, slide: usize) {
        let n = slide.clamp(1, self.state.total);
        self.state.current = n;

        self.view.activate_slide(n);
        self.view.set_counter(n, self.state.total);
        self.view
            .set_progress(n as f64 / self.state.total as f64 * 100.0);
        self.view.set_nav_enabled(n > 1, n < self.state.total);
        self.view.set_title(&format!(
            "{} - Slide {}/{}",
            self.config.title_base, n, self.state.total
        ));

        self.store.store(n);
        self.view.set_fragment(n);

        self.narration.cancel(&mut self.speech);
        if self.state.narration_enabled {
            self.narrate_current();
        }
    }

    /// Advance one slide; no-op at the last slide.
    pub fn next(&mut self) {
        if self.state.current < self.state.total {
            self.show_slide(self.state.current + 1);
        }
    }

    /// Go back one slide; no-op at the first slide.
    pub fn previous(&mut self) {
        if self.state.current > 1 {
            self.show_slide(self.state.current - 1);
        }
    }

    /// Flip the notes panel. Purely presentational, never persisted.
    pub fn toggle_notes(&mut self) {
        self.state.notes_visible = !self.state.notes_visible;
        self.view.set_notes_visible(self.state.notes_visible);
    }

    /// Flip narration. Turning it on narrates the current slide right away;
    /// turning it off cancels any in-flight speech. Without a speech engine
    /// this warns once per attempt and stays off.
    pub fn toggle_narration(&mut self) {
        if !self.speech.available() {
            log::warn!("speech synthesis not supported; narration unavailable");
            return;
        }

        self.state.narration_enabled = !self.state.narration_enabled;
        self.view.set_narration_active(self.state.narration_enabled);

        if self.state.narration_enabled {
            self.narrate_current();
        } else {
            self.narration.cancel(&mut self.speech);
        }
    }

    /// Narrate the current slide, cancelling any utterance already playing.
    ///
    /// No-op when narration is off, speech is unavailable, or the slide has
    /// nothing speakable. Start failures are logged, never retried.
    pub fn narrate_current(&mut self) {
        if !self.state.narration_enabled || !self.speech.available() {
            return;
        }
        let Some(slide) = self.deck.get(self.state.current) else {
            return;
        };
        let Some(text) = narration_text(slide, self.config.narration_chars) else {
            return;
        };

        let request = UtteranceRequest::new(text);
        if let Err(e) = self.narration.begin(&mut self.speech, &request) {
            log::error!("narration failed to start: {e}");
        }
    }

    /// Platform callback: the utterance reached its natural end.
    pub fn utterance_finished(&mut self, id: UtteranceId) {
        self.narration.finish(id);
    }

    /// Platform callback: the utterance failed. Logged, never retried.
    pub fn utterance_failed(&mut self, id: UtteranceId, reason: &str) {
        log::error!("speech synthesis error: {reason}");
        self.narration.finish(id);
    }

    /// Enter fullscreen on the presentation container, or leave it when
    /// already fullscreen. Request failures are logged only.
    pub fn toggle_fullscreen(&mut self) {
        if self.view.is_fullscreen() {
            self.view.exit_fullscreen();
        } else if let Err(e) = self.view.request_fullscreen() {
            log::error!("error entering fullscreen: {e}");
        }
    }

    /// Handle a key press. Returns true when the key was consumed and its
    /// default browser action should be suppressed.
    pub fn handle_key(&mut self, key: Key, ctx: KeyContext) -> bool {
        let Some(command) = command_for(key, ctx) else {
            return false;
        };

        match command {
            DeckCommand::Next => self.next(),
            DeckCommand::Previous => self.previous(),
            DeckCommand::First => self.show_slide(1),
            DeckCommand::Last => self.show_slide(self.state.total),
            DeckCommand::ToggleFullscreen => self.toggle_fullscreen(),
            DeckCommand::ToggleNotes => self.toggle_notes(),
            DeckCommand::ExitFullscreen => {
                // Escape means nothing outside fullscreen; let it through.
                if !self.view.is_fullscreen() {
                    return false;
                }
                self.view.exit_fullscreen();
            }
        }
        true
    }

    /// React to a fragment change: browser back/forward, a shared deep
    /// link, or the echo of our own `set_fragment`. The equality check
    /// keeps the echo from re-entering the transition.
    pub fn on_fragment_changed(&mut self, hash: &str) {
        let Some(n) = parse_slide_fragment(hash) else {
            return;
        };
        if self.deck.contains(n) && n != self.state.current {
            self.show_slide(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::Slide;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct ViewState {
        active: Vec<bool>,
        activations: Vec<usize>,
        counter: (usize, usize),
        progress: f64,
        prev_enabled: bool,
        next_enabled: bool,
        title: String,
        fragments: Vec<usize>,
        notes_visible: bool,
        narration_active: bool,
        fullscreen: bool,
        fullscreen_requests: usize,
    }

    #[derive(Clone, Default)]
    struct TestView(Rc<RefCell<ViewState>>);

    impl TestView {
        fn for_deck(total: usize) -> Self {
            let view = Self::default();
            view.0.borrow_mut().active = vec![false; total];
            view
        }

        fn active_count(&self) -> usize {
            self.0.borrow().active.iter().filter(|&&a| a).count()
        }
    }

    impl DeckView for TestView {
        fn activate_slide(&mut self, slide: usize) {
            let mut state = self.0.borrow_mut();
            for flag in state.active.iter_mut() {
                *flag = false;
            }
            if let Some(flag) = slide.checked_sub(1).and_then(|i| state.active.get_mut(i)) {
                *flag = true;
            }
            state.activations.push(slide);
        }

        fn set_counter(&mut self, current: usize, total: usize) {
            self.0.borrow_mut().counter = (current, total);
        }

        fn set_progress(&mut self, percent: f64) {
            self.0.borrow_mut().progress = percent;
        }

        fn set_nav_enabled(&mut self, prev: bool, next: bool) {
            let mut state = self.0.borrow_mut();
            state.prev_enabled = prev;
            state.next_enabled = next;
        }

        fn set_title(&mut self, title: &str) {
            self.0.borrow_mut().title = title.to_string();
        }

        fn set_fragment(&mut self, slide: usize) {
            self.0.borrow_mut().fragments.push(slide);
        }

        fn set_notes_visible(&mut self, visible: bool) {
            self.0.borrow_mut().notes_visible = visible;
        }

        fn set_narration_active(&mut self, active: bool) {
            self.0.borrow_mut().narration_active = active;
        }

        fn is_fullscreen(&self) -> bool {
            self.0.borrow().fullscreen
        }

        fn request_fullscreen(&mut self) -> Result<()> {
            let mut state = self.0.borrow_mut();
            state.fullscreen = true;
            state.fullscreen_requests += 1;
            Ok(())
        }

        fn exit_fullscreen(&mut self) {
            self.0.borrow_mut().fullscreen = false;
        }
    }

    #[derive(Clone, Default)]
    struct TestStore(Rc<RefCell<Option<usize>>>);

    impl TestStore {
        fn seeded(slide: usize) -> Self {
            Self(Rc::new(RefCell::new(Some(slide))))
        }

        fn value(&self) -> Option<usize> {
            *self.0.borrow()
        }
    }

    impl PositionStore for TestStore {
        fn load(&mut self) -> Option<usize> {
            *self.0.borrow()
        }

        fn store(&mut self, slide: usize) {
            *self.0.borrow_mut() = Some(slide);
        }
    }

    #[derive(Default)]
    struct SpeechState {
        next_id: u64,
        spoken: Vec<UtteranceRequest>,
        speaking: bool,
        cancels: usize,
    }

    #[derive(Clone)]
    struct TestSpeech {
        state: Rc<RefCell<SpeechState>>,
        available: bool,
    }

    impl TestSpeech {
        fn working() -> Self {
            Self {
                state: Rc::default(),
                available: true,
            }
        }

        fn unavailable() -> Self {
            Self {
                state: Rc::default(),
                available: false,
            }
        }

        fn spoken_count(&self) -> usize {
            self.state.borrow().spoken.len()
        }

        fn is_speaking(&self) -> bool {
            self.state.borrow().speaking
        }
    }

    impl SpeechEngine for TestSpeech {
        fn available(&self) -> bool {
            self.available
        }

        fn speak(&mut self, request: &UtteranceRequest) -> Result<UtteranceId> {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            state.spoken.push(request.clone());
            state.speaking = true;
            Ok(UtteranceId(state.next_id))
        }

        fn cancel(&mut self) {
            let mut state = self.state.borrow_mut();
            state.speaking = false;
            state.cancels += 1;
        }
    }

    fn deck_of(total: usize) -> SlideDeck {
        let slides = (1..=total)
            .map(|n| {
                let mut slide = Slide::new(n);
                slide.add_text(format!("Slide {n} content"));
                slide
            })
            .collect();
        SlideDeck::new(slides)
    }

    type TestController = DeckController<TestView, TestStore, TestSpeech>;

    fn controller(total: usize) -> (TestController, TestView, TestStore, TestSpeech) {
        let view = TestView::for_deck(total);
        let store = TestStore::default();
        let speech = TestSpeech::working();
        let mut controller = DeckController::new(
            deck_of(total),
            DeckConfig::new("Deck"),
            view.clone(),
            store.clone(),
            speech.clone(),
            None,
        )
        .unwrap();
        controller.start();
        (controller, view, store, speech)
    }

    #[test]
    fn test_empty_deck_is_rejected() {
        let result = DeckController::new(
            SlideDeck::default(),
            DeckConfig::default(),
            TestView::default(),
            TestStore::default(),
            TestSpeech::working(),
            None,
        );

        assert!(matches!(result, Err(Error::EmptyDeck)));
    }

    #[test]
    fn test_show_slide_clamps_out_of_range() {
        let (mut controller, _, _, _) = controller(4);

        controller.show_slide(99);
        assert_eq!(controller.state().current, 4);

        controller.show_slide(0);
        assert_eq!(controller.state().current, 1);
    }

    #[test]
    fn test_exactly_one_slide_active() {
        let (mut controller, view, _, _) = controller(5);

        for target in [3, 1, 5, 5, 2] {
            controller.show_slide(target);
            assert_eq!(view.active_count(), 1);
            assert!(view.0.borrow().active[controller.state().current - 1]);
        }
    }

    #[test]
    fn test_progress_matches_formula() {
        let (mut controller, view, _, _) = controller(4);

        controller.show_slide(1);
        assert_eq!(view.0.borrow().progress, 25.0);

        controller.show_slide(2);
        assert_eq!(view.0.borrow().progress, 50.0);

        controller.show_slide(4);
        assert_eq!(view.0.borrow().progress, 100.0);
    }

    #[test]
    fn test_counter_title_and_nav_state() {
        let (mut controller, view, _, _) = controller(4);

        controller.show_slide(2);
        {
            let state = view.0.borrow();
            assert_eq!(state.counter, (2, 4));
            assert_eq!(state.title, "Deck - Slide 2/4");
            assert!(state.prev_enabled);
            assert!(state.next_enabled);
        }

        controller.show_slide(1);
        assert!(!view.0.borrow().prev_enabled);
        assert!(view.0.borrow().next_enabled);

        controller.show_slide(4);
        assert!(view.0.borrow().prev_enabled);
        assert!(!view.0.borrow().next_enabled);
    }

    #[test]
    fn test_next_at_last_is_noop() {
        let (mut controller, view, store, _) = controller(3);

        controller.show_slide(3);
        let transitions = view.0.borrow().activations.len();

        controller.next();
        assert_eq!(controller.state().current, 3);
        assert_eq!(view.0.borrow().activations.len(), transitions);
        assert_eq!(store.value(), Some(3));
    }

    #[test]
    fn test_previous_at_first_is_noop() {
        let (mut controller, view, _, _) = controller(3);

        let transitions = view.0.borrow().activations.len();
        controller.previous();

        assert_eq!(controller.state().current, 1);
        assert_eq!(view.0.borrow().activations.len(), transitions);
    }

    #[test]
    fn test_position_persisted_on_every_show() {
        let (mut controller, _, store, _) = controller(5);

        for target in 1..=5 {
            controller.show_slide(target);
            assert_eq!(store.value(), Some(target));
        }
    }

    #[test]
    fn test_start_prefers_fragment_over_stored() {
        let controller = DeckController::new(
            deck_of(5),
            DeckConfig::default(),
            TestView::for_deck(5),
            TestStore::seeded(2),
            TestSpeech::working(),
            Some("#slide-3"),
        )
        .unwrap();

        assert_eq!(controller.state().current, 3);
    }

    #[test]
    fn test_start_unusable_slide_fragment_ignores_stored_position() {
        // An out-of-range slide fragment starts the deck at slide 1; the
        // stored position never enters into it.
        let controller = DeckController::new(
            deck_of(5),
            DeckConfig::default(),
            TestView::for_deck(5),
            TestStore::seeded(2),
            TestSpeech::working(),
            Some("#slide-99"),
        )
        .unwrap();
        assert_eq!(controller.state().current, 1);

        // Same for a malformed slide number.
        let controller = DeckController::new(
            deck_of(5),
            DeckConfig::default(),
            TestView::for_deck(5),
            TestStore::seeded(2),
            TestSpeech::working(),
            Some("#slide-abc"),
        )
        .unwrap();
        assert_eq!(controller.state().current, 1);
    }

    #[test]
    fn test_start_falls_back_to_stored_then_one() {
        // A non-slide fragment leaves the decision to the stored position.
        let controller = DeckController::new(
            deck_of(5),
            DeckConfig::default(),
            TestView::for_deck(5),
            TestStore::seeded(2),
            TestSpeech::working(),
            Some("#features"),
        )
        .unwrap();
        assert_eq!(controller.state().current, 2);

        // Stored position out of range too: start at 1.
        let controller = DeckController::new(
            deck_of(5),
            DeckConfig::default(),
            TestView::for_deck(5),
            TestStore::seeded(40),
            TestSpeech::working(),
            Some("#features"),
        )
        .unwrap();
        assert_eq!(controller.state().current, 1);
    }

    #[test]
    fn test_external_fragment_change_is_idempotent() {
        let (mut controller, view, _, _) = controller(5);
        let before = view.0.borrow().activations.len();

        controller.on_fragment_changed("#slide-3");
        assert_eq!(controller.state().current, 3);
        assert_eq!(view.0.borrow().activations.len(), before + 1);

        // The echo of our own fragment write performs no transition.
        controller.on_fragment_changed("#slide-3");
        assert_eq!(view.0.borrow().activations.len(), before + 1);
    }

    #[test]
    fn test_fragment_change_ignores_garbage_and_out_of_range() {
        let (mut controller, view, _, _) = controller(3);
        let before = view.0.borrow().activations.len();

        controller.on_fragment_changed("#about");
        controller.on_fragment_changed("#slide-0");
        controller.on_fragment_changed("#slide-9");

        assert_eq!(controller.state().current, 1);
        assert_eq!(view.0.borrow().activations.len(), before);
    }

    #[test]
    fn test_toggle_notes_is_presentational() {
        let (mut controller, view, store, _) = controller(3);
        let stored = store.value();

        controller.toggle_notes();
        assert!(controller.state().notes_visible);
        assert!(view.0.borrow().notes_visible);

        controller.toggle_notes();
        assert!(!controller.state().notes_visible);
        assert_eq!(store.value(), stored);
    }

    #[test]
    fn test_toggle_narration_speaks_current_slide() {
        let (mut controller, view, _, speech) = controller(3);

        controller.toggle_narration();
        assert!(controller.state().narration_enabled);
        assert!(view.0.borrow().narration_active);
        assert_eq!(speech.spoken_count(), 1);
        assert!(controller.is_narrating());
    }

    #[test]
    fn test_toggle_narration_off_cancels_in_flight_speech() {
        let (mut controller, _, _, speech) = controller(3);

        controller.toggle_narration();
        assert!(speech.is_speaking());

        controller.toggle_narration();
        assert!(!controller.state().narration_enabled);
        assert!(!speech.is_speaking());
        assert!(!controller.is_narrating());
    }

    #[test]
    fn test_narration_unavailable_is_a_noop() {
        let view = TestView::for_deck(3);
        let mut controller = DeckController::new(
            deck_of(3),
            DeckConfig::default(),
            view.clone(),
            TestStore::default(),
            TestSpeech::unavailable(),
            None,
        )
        .unwrap();
        controller.start();

        controller.toggle_narration();
        assert!(!controller.state().narration_enabled);
        assert!(!view.0.borrow().narration_active);
    }

    #[test]
    fn test_slide_change_restarts_narration() {
        let (mut controller, _, _, speech) = controller(3);

        controller.toggle_narration();
        controller.next();

        assert_eq!(speech.spoken_count(), 2);
        assert!(controller.is_narrating());
        let spoken = &speech.state.borrow().spoken;
        assert!(spoken[1].text.contains("Slide 2"));
    }

    #[test]
    fn test_utterance_finished_clears_slot() {
        let (mut controller, _, _, _) = controller(3);

        controller.toggle_narration();
        assert!(controller.is_narrating());

        controller.utterance_finished(UtteranceId(1));
        assert!(!controller.is_narrating());
    }

    #[test]
    fn test_keyboard_navigation() {
        let (mut controller, _, _, _) = controller(4);
        let ctx = KeyContext::default();

        assert!(controller.handle_key(Key::ArrowRight, ctx));
        assert_eq!(controller.state().current, 2);

        assert!(controller.handle_key(Key::ArrowLeft, ctx));
        assert_eq!(controller.state().current, 1);

        assert!(controller.handle_key(Key::End, ctx));
        assert_eq!(controller.state().current, 4);

        assert!(controller.handle_key(Key::Home, ctx));
        assert_eq!(controller.state().current, 1);

        let shift = KeyContext {
            shift: true,
            ..Default::default()
        };
        controller.show_slide(2);
        assert!(controller.handle_key(Key::Space, shift));
        assert_eq!(controller.state().current, 1);
    }

    #[test]
    fn test_keys_ignored_in_text_input() {
        let (mut controller, _, _, _) = controller(4);
        let ctx = KeyContext {
            in_text_input: true,
            ..Default::default()
        };

        assert!(!controller.handle_key(Key::ArrowRight, ctx));
        assert_eq!(controller.state().current, 1);
    }

    #[test]
    fn test_fullscreen_toggle_and_escape() {
        let (mut controller, view, _, _) = controller(3);
        let ctx = KeyContext::default();

        // Escape outside fullscreen is not consumed.
        assert!(!controller.handle_key(Key::Escape, ctx));

        assert!(controller.handle_key(Key::Char('f'), ctx));
        assert!(view.0.borrow().fullscreen);

        assert!(controller.handle_key(Key::Escape, ctx));
        assert!(!view.0.borrow().fullscreen);

        controller.toggle_fullscreen();
        assert!(view.0.borrow().fullscreen);
        controller.toggle_fullscreen();
        assert!(!view.0.borrow().fullscreen);
        assert_eq!(view.0.borrow().fullscreen_requests, 2);
    }

    #[test]
    fn test_notes_key_toggles_panel() {
        let (mut controller, _, _, _) = controller(3);

        assert!(controller.handle_key(Key::Char('n'), KeyContext::default()));
        assert!(controller.state().notes_visible);
    }
}
