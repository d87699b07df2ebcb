//! DOM wiring for the stateless page behaviors: mobile nav toggle, smooth
//! anchor scrolling, copy-to-clipboard buttons, scroll reveals, metrics
//! loading, and active nav-link marking.

use std::cell::RefCell;
use std::rc::Rc;

use sitedeck_core::behaviors::{
    anchor_fragment, is_active_link, CopyButton, CopyEnhancer, CopyState, NavMenu, RevealTracker,
    REVEAL_ROOT_MARGIN, REVEAL_THRESHOLD,
};
use sitedeck_core::metrics::{MetricsSnapshot, METRICS_PATH};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Element, Event, HtmlAnchorElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, Response, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Window,
};

/// Attach every site behavior to the page.
pub fn init(window: &Window, document: &Document) {
    let menu = Rc::new(RefCell::new(NavMenu::new()));
    init_nav_toggle(document, menu.clone());
    init_smooth_scroll(document, menu);
    init_copy_buttons(document, &Rc::new(RefCell::new(CopyEnhancer::new())));
    init_scroll_reveals(document);
    spawn_local(load_metrics(window.clone(), document.clone()));
    mark_active_nav_link(window, document);
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

/// Mirror the menu state into the nav-links class and the toggle's
/// `aria-expanded` attribute.
fn reflect_menu(document: &Document, open: bool) {
    if let Some(links) = query(document, ".nav-links") {
        let _ = links.class_list().toggle_with_force("active", open);
    }
    if let Some(toggle) = query(document, ".mobile-menu-toggle") {
        let _ = toggle.set_attribute("aria-expanded", if open { "true" } else { "false" });
    }
}

fn init_nav_toggle(document: &Document, menu: Rc<RefCell<NavMenu>>) {
    let Some(toggle) = query(document, ".mobile-menu-toggle") else {
        return;
    };
    if query(document, ".nav-links").is_none() {
        return;
    }

    let document = document.clone();
    let handler = Closure::<dyn FnMut()>::new(move || {
        let open = menu.borrow_mut().toggle();
        reflect_menu(&document, open);
    });
    let _ = toggle.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
    handler.forget();
}

/// Intercept clicks on in-page anchors whose fragment resolves to an
/// element; everything else falls through to default navigation.
fn init_smooth_scroll(document: &Document, menu: Rc<RefCell<NavMenu>>) {
    let Ok(anchors) = document.query_selector_all("a[href^='#']") else {
        return;
    };

    for i in 0..anchors.length() {
        let Some(anchor) = anchors.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };

        let document = document.clone();
        let menu = menu.clone();
        let link = anchor.clone();
        let handler = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(href) = link.get_attribute("href") else {
                return;
            };
            let Some(id) = anchor_fragment(&href) else {
                return;
            };
            let Some(target) = document.get_element_by_id(id) else {
                return;
            };

            event.prevent_default();
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            target.scroll_into_view_with_scroll_into_view_options(&options);

            if menu.borrow_mut().close() {
                reflect_menu(&document, false);
            }
        });
        let _ = anchor.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
        handler.forget();
    }
}

/// Insert a copy button before every code block not already enhanced.
fn init_copy_buttons(document: &Document, enhancer: &Rc<RefCell<CopyEnhancer>>) {
    let Ok(blocks) = document.query_selector_all("pre code") else {
        return;
    };

    for i in 0..blocks.length() {
        let Some(code) = blocks.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let Some(pre) = code.parent_element() else {
            continue;
        };
        let Some(wrapper) = pre.parent_element() else {
            continue;
        };

        // A button already present means this block was enhanced earlier.
        if wrapper.query_selector(".copy-button").ok().flatten().is_some() {
            continue;
        }
        if !enhancer.borrow_mut().enhance(i as usize) {
            continue;
        }

        let Ok(button) = document.create_element("button") else {
            continue;
        };
        button.set_class_name("copy-button");
        button.set_text_content(Some("Copy"));
        let _ = button.set_attribute("aria-label", "Copy code to clipboard");
        attach_copy_handler(&button, &code);

        let _ = wrapper.insert_before(&button, Some(pre.as_ref()));
    }
}

fn attach_copy_handler(button: &Element, code: &Element) {
    let state = Rc::new(RefCell::new(CopyButton::new()));
    let button = button.clone();
    let code = code.clone();

    let button_for_closure = button.clone();
    let handler = Closure::<dyn FnMut()>::new(move || {
        let text = code.text_content().unwrap_or_default();
        let button = button_for_closure.clone();
        let state = state.clone();

        spawn_local(async move {
            let succeeded = write_clipboard(&text).await.is_ok();
            if !succeeded {
                log::error!("failed to copy code block to clipboard");
            }
            let delay = state.borrow_mut().on_copy_result(succeeded);
            render_copy_button(&button, &state.borrow());
            if let Some(delay) = delay {
                schedule_revert(button.clone(), state.clone(), delay.as_millis() as i32);
            }
        });
    });
    let _ = button.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
    handler.forget();
}

async fn write_clipboard(text: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let clipboard = window.navigator().clipboard();
    JsFuture::from(clipboard.write_text(text)).await.map(|_| ())
}

fn render_copy_button(button: &Element, state: &CopyButton) {
    button.set_text_content(Some(state.label()));
    let _ = button
        .class_list()
        .toggle_with_force("copied", state.state() == CopyState::Copied);
}

fn schedule_revert(button: Element, state: Rc<RefCell<CopyButton>>, delay_ms: i32) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move || {
        state.borrow_mut().revert();
        render_copy_button(&button, &state.borrow());
    });
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms,
    );
}

/// Observe card-like elements and reveal each one the first time enough of
/// it scrolls into view.
fn init_scroll_reveals(document: &Document) {
    let tracker = Rc::new(RefCell::new(RevealTracker::new()));

    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                let target = entry.target();
                let Some(id) = target
                    .get_attribute("data-reveal-id")
                    .and_then(|v| v.parse().ok())
                else {
                    continue;
                };
                if tracker
                    .borrow_mut()
                    .on_intersection(id, entry.intersection_ratio())
                {
                    let _ = target.class_list().add_1("animate-on-scroll");
                    observer.unobserve(&target);
                }
            }
        },
    );

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(REVEAL_THRESHOLD));
    options.set_root_margin(REVEAL_ROOT_MARGIN);

    let observer =
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
            Ok(observer) => observer,
            Err(_) => {
                callback.forget();
                return;
            }
        };
    callback.forget();

    let Ok(cards) = document.query_selector_all(".card, .stat-card, .timeline-item") else {
        return;
    };
    for i in 0..cards.length() {
        let Some(card) = cards.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let _ = card.set_attribute("data-reveal-id", &i.to_string());
        observer.observe(&card);
    }
}

/// Fetch the metrics document once and fill the placeholder elements.
/// Any fetch or parse failure leaves the panel untouched.
async fn load_metrics(window: Window, document: Document) {
    if document.get_element_by_id("metrics-data").is_none() {
        return;
    }

    match fetch_metrics(&window).await {
        Ok(snapshot) => {
            for update in snapshot.updates() {
                if let Some(element) = document.get_element_by_id(update.placeholder) {
                    element.set_text_content(Some(&update.value));
                }
            }
        }
        Err(e) => log::error!("failed to load metrics: {e:?}"),
    }
}

async fn fetch_metrics(window: &Window) -> Result<MetricsSnapshot, JsValue> {
    let response = JsFuture::from(window.fetch_with_str(METRICS_PATH)).await?;
    let response: Response = response.dyn_into()?;
    let json = JsFuture::from(response.json()?).await?;
    serde_wasm_bindgen::from_value(json).map_err(JsValue::from)
}

/// Mark nav links pointing at the current page.
fn mark_active_nav_link(window: &Window, document: &Document) {
    let Ok(current) = window.location().pathname() else {
        return;
    };
    let Ok(links) = document.query_selector_all(".nav-links a") else {
        return;
    };

    for i in 0..links.length() {
        let Some(link) = links
            .item(i)
            .and_then(|n| n.dyn_into::<HtmlAnchorElement>().ok())
        else {
            continue;
        };
        // href() is already resolved against the page URL.
        let Ok(url) = web_sys::Url::new(&link.href()) else {
            continue;
        };
        if is_active_link(&current, &url.pathname()) {
            let _ = link.class_list().add_1("active");
        }
    }
}
