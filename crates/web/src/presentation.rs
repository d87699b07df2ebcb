//! Wires the deck controller to the live page: slide discovery, DOM-backed
//! platform services, and event listeners.

use std::cell::RefCell;
use std::rc::Rc;

use sitedeck_core::fragment::slide_fragment;
use sitedeck_core::{
    DeckConfig, DeckController, DeckView, Error, Key, KeyContext, PositionStore, Result, Slide,
    SlideDeck, SpeechEngine, UtteranceId, UtteranceRequest,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, KeyboardEvent, SpeechSynthesis,
    SpeechSynthesisUtterance, Storage, Window,
};

/// localStorage key holding the last-viewed slide number.
const POSITION_KEY: &str = "sitedeck-presentation-slide";

type Controller = DeckController<DomDeckView, LocalStoragePositions, WebSpeech>;

/// The controller lives behind a shared cell so that event closures and
/// speech lifecycle callbacks can all reach it. `None` until construction
/// succeeds.
type Shared = Rc<RefCell<Option<Controller>>>;

/// Attach the deck controller when the page carries a presentation
/// container. Absence of the container or of the slide collection leaves
/// the rest of the page untouched.
pub fn init(window: &Window, document: &Document) {
    let Some(container) = document.query_selector(".presentation-mode").ok().flatten() else {
        return;
    };

    let (elements, deck) = collect_slides(document);

    let shared: Shared = Rc::new(RefCell::new(None));
    let view = DomDeckView {
        document: document.clone(),
        slides: elements,
        container,
    };
    let store = LocalStoragePositions::new(window);
    let speech = WebSpeech::new(window, shared.clone());

    // The pre-navigation document title is the base the slide position gets
    // appended to.
    let title_base = document.title();
    let config = DeckConfig::new(if title_base.is_empty() {
        "Presentation".to_string()
    } else {
        title_base
    });

    let hash = window.location().hash().ok();
    let controller = match DeckController::new(deck, config, view, store, speech, hash.as_deref())
    {
        Ok(controller) => controller,
        Err(e) => {
            log::error!("presentation disabled: {e}");
            return;
        }
    };
    *shared.borrow_mut() = Some(controller);
    if let Some(controller) = shared.borrow_mut().as_mut() {
        controller.start();
    }

    wire_buttons(document, &shared);
    wire_keyboard(document, &shared);
    wire_hashchange(window, &shared);
}

/// Discover `[data-slide-id]` elements in document order and build the deck
/// model alongside the element list the view flips classes on.
fn collect_slides(document: &Document) -> (Vec<Element>, SlideDeck) {
    let mut elements = Vec::new();
    let mut slides = Vec::new();

    if let Ok(nodes) = document.query_selector_all("[data-slide-id]") {
        for i in 0..nodes.length() {
            if let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                slides.push(slide_from_element(&element, slides.len() + 1));
                elements.push(element);
            }
        }
    }

    (elements, SlideDeck::new(slides))
}

fn slide_from_element(element: &Element, number: usize) -> Slide {
    let mut slide = Slide::new(number);

    if let Some(notes) = element.query_selector(".slide-notes").ok().flatten() {
        if let Some(text) = notes.text_content() {
            slide = slide.with_notes(text);
        }
    }

    // Work on a deep clone so stripping code regions for the narration
    // fallback leaves the live slide alone.
    if let Ok(clone) = element
        .clone_node_with_deep(true)
        .and_then(|node| node.dyn_into::<Element>().map_err(JsValue::from))
    {
        if let Ok(code_nodes) = clone.query_selector_all("pre, code") {
            for i in 0..code_nodes.length() {
                if let Some(code) = code_nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok())
                {
                    if let Some(text) = code.text_content() {
                        slide.add_code(text);
                    }
                    code.remove();
                }
            }
        }
        if let Some(text) = clone.text_content() {
            slide.add_text(text);
        }
    }

    slide
}

/// DOM-backed UI surface. Every lookup is optional; missing elements make
/// the corresponding reflection a no-op.
struct DomDeckView {
    document: Document,
    slides: Vec<Element>,
    container: Element,
}

impl DomDeckView {
    fn set_button_disabled(&self, id: &str, disabled: bool) {
        if let Some(button) = self
            .document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlButtonElement>().ok())
        {
            button.set_disabled(disabled);
        }
    }

    fn toggle_element_class(&self, id: &str, class: &str, on: bool) {
        if let Some(element) = self.document.get_element_by_id(id) {
            let _ = element.class_list().toggle_with_force(class, on);
        }
    }
}

impl DeckView for DomDeckView {
    fn activate_slide(&mut self, slide: usize) {
        for (idx, element) in self.slides.iter().enumerate() {
            let _ = element
                .class_list()
                .toggle_with_force("active", idx + 1 == slide);
        }
    }

    fn set_counter(&mut self, current: usize, total: usize) {
        if let Some(counter) = self.document.get_element_by_id("slide-counter") {
            counter.set_inner_html(&format!(
                r#"<span class="current">{current}</span> / {total}"#
            ));
        }
    }

    fn set_progress(&mut self, percent: f64) {
        if let Some(fill) = self
            .document
            .get_element_by_id("progress-fill")
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        {
            let _ = fill.style().set_property("width", &format!("{percent}%"));
        }
    }

    fn set_nav_enabled(&mut self, prev: bool, next: bool) {
        self.set_button_disabled("prev-slide", !prev);
        self.set_button_disabled("next-slide", !next);
    }

    fn set_title(&mut self, title: &str) {
        self.document.set_title(title);
    }

    fn set_fragment(&mut self, slide: usize) {
        if let Some(window) = self.document.default_view() {
            let _ = window.location().set_hash(&slide_fragment(slide));
        }
    }

    fn set_notes_visible(&mut self, visible: bool) {
        self.toggle_element_class("notes-panel", "active", visible);
        self.toggle_element_class("toggle-notes", "active", visible);
    }

    fn set_narration_active(&mut self, active: bool) {
        if let Some(button) = self.document.get_element_by_id("toggle-narration") {
            let _ = button.class_list().toggle_with_force("active", active);
            button.set_text_content(Some(if active { "\u{1F50A}" } else { "\u{1F507}" }));
        }
    }

    fn is_fullscreen(&self) -> bool {
        self.document.fullscreen_element().is_some()
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        self.container
            .request_fullscreen()
            .map_err(|e| Error::Fullscreen(format!("{e:?}")))
    }

    fn exit_fullscreen(&mut self) {
        self.document.exit_fullscreen();
    }
}

/// Slide position persistence in per-origin localStorage.
struct LocalStoragePositions {
    storage: Option<Storage>,
}

impl LocalStoragePositions {
    fn new(window: &Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }
}

impl PositionStore for LocalStoragePositions {
    fn load(&mut self) -> Option<usize> {
        self.storage
            .as_ref()?
            .get_item(POSITION_KEY)
            .ok()
            .flatten()?
            .parse()
            .ok()
    }

    fn store(&mut self, slide: usize) {
        if let Some(storage) = &self.storage {
            if storage.set_item(POSITION_KEY, &slide.to_string()).is_err() {
                log::warn!("failed to persist slide position");
            }
        }
    }
}

/// Speech synthesis backed by the Web Speech API. Lifecycle events are
/// routed back into the controller through the shared cell.
struct WebSpeech {
    synthesis: Option<SpeechSynthesis>,
    controller: Shared,
    next_id: u64,
}

impl WebSpeech {
    fn new(window: &Window, controller: Shared) -> Self {
        Self {
            synthesis: window.speech_synthesis().ok(),
            controller,
            next_id: 0,
        }
    }
}

impl SpeechEngine for WebSpeech {
    fn available(&self) -> bool {
        self.synthesis.is_some()
    }

    fn speak(&mut self, request: &UtteranceRequest) -> Result<UtteranceId> {
        let synthesis = self.synthesis.as_ref().ok_or(Error::SpeechUnavailable)?;
        let utterance = SpeechSynthesisUtterance::new_with_text(&request.text)
            .map_err(|e| Error::Speech(format!("{e:?}")))?;
        utterance.set_rate(request.rate);
        utterance.set_pitch(request.pitch);
        utterance.set_volume(request.volume);

        self.next_id += 1;
        let id = UtteranceId(self.next_id);

        let controller = self.controller.clone();
        let on_end = Closure::once_into_js(move || {
            if let Some(controller) = controller.borrow_mut().as_mut() {
                controller.utterance_finished(id);
            }
        });
        utterance.set_onend(Some(on_end.unchecked_ref()));

        let controller = self.controller.clone();
        let on_error = Closure::once_into_js(move || {
            if let Some(controller) = controller.borrow_mut().as_mut() {
                controller.utterance_failed(id, "playback error");
            }
        });
        utterance.set_onerror(Some(on_error.unchecked_ref()));

        synthesis.speak(&utterance);
        Ok(id)
    }

    fn cancel(&mut self) {
        if let Some(synthesis) = &self.synthesis {
            if synthesis.speaking() {
                synthesis.cancel();
            }
        }
    }
}

fn wire_buttons(document: &Document, shared: &Shared) {
    on_click(document, "prev-slide", shared, |c| c.previous());
    on_click(document, "next-slide", shared, |c| c.next());
    on_click(document, "toggle-notes", shared, |c| c.toggle_notes());
    on_click(document, "toggle-narration", shared, |c| c.toggle_narration());
    on_click(document, "toggle-fullscreen", shared, |c| {
        c.toggle_fullscreen()
    });
}

fn on_click(document: &Document, id: &str, shared: &Shared, action: fn(&mut Controller)) {
    let Some(button) = document.get_element_by_id(id) else {
        return;
    };
    let shared = shared.clone();
    let handler = Closure::<dyn FnMut()>::new(move || {
        if let Some(controller) = shared.borrow_mut().as_mut() {
            action(controller);
        }
    });
    let _ = button.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
    handler.forget();
}

fn wire_keyboard(document: &Document, shared: &Shared) {
    let shared = shared.clone();
    let handler = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        let Some(key) = map_key(&event.key()) else {
            return;
        };
        let ctx = KeyContext {
            shift: event.shift_key(),
            in_text_input: target_is_text_input(&event),
        };
        let handled = shared
            .borrow_mut()
            .as_mut()
            .map(|c| c.handle_key(key, ctx))
            .unwrap_or(false);
        if handled {
            event.prevent_default();
        }
    });
    let _ = document.add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref());
    handler.forget();
}

/// Decode a `KeyboardEvent.key` value into a deck key.
fn map_key(key: &str) -> Option<Key> {
    match key {
        "ArrowRight" => Some(Key::ArrowRight),
        "ArrowLeft" => Some(Key::ArrowLeft),
        " " => Some(Key::Space),
        "Home" => Some(Key::Home),
        "End" => Some(Key::End),
        "Escape" => Some(Key::Escape),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Key::Char(c)),
                _ => None,
            }
        }
    }
}

fn target_is_text_input(event: &KeyboardEvent) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .map(|element| matches!(element.tag_name().as_str(), "INPUT" | "TEXTAREA"))
        .unwrap_or(false)
}

fn wire_hashchange(window: &Window, shared: &Shared) {
    let shared = shared.clone();
    let location = window.location();
    let handler = Closure::<dyn FnMut()>::new(move || {
        let Ok(hash) = location.hash() else {
            return;
        };
        if let Some(controller) = shared.borrow_mut().as_mut() {
            controller.on_fragment_changed(&hash);
        }
    });
    let _ = window.add_event_listener_with_callback("hashchange", handler.as_ref().unchecked_ref());
    handler.forget();
}
