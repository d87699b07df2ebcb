//! Page-behavior state machines: mobile nav menu, in-page anchor targets,
//! copy-to-clipboard buttons, scroll reveals, and active nav-link marking.
//!
//! Each behavior is independent and degrades to a no-op when its target
//! elements are missing from the page. State lives here, not in DOM
//! classes, so the logic runs without a rendering environment.

use std::collections::HashSet;
use std::time::Duration;

/// How long the "Copied!" confirmation shows before reverting.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(2000);

/// Intersection ratio at which an observed element is revealed.
pub const REVEAL_THRESHOLD: f64 = 0.1;

/// Root margin shrinking the observed viewport by 50px at the bottom edge.
pub const REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";

/// Mobile navigation menu state, mirrored into the DOM class and the toggle
/// control's `aria-expanded` attribute.
#[derive(Debug, Default)]
pub struct NavMenu {
    open: bool,
}

impl NavMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the menu and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Close the menu. Returns true when it was open.
    pub fn close(&mut self) -> bool {
        std::mem::take(&mut self.open)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Fragment id targeted by an in-page anchor href.
///
/// Returns `None` for the bare `#` and for hrefs that are not pure
/// fragments; those fall through to default navigation.
pub fn anchor_fragment(href: &str) -> Option<&str> {
    let id = href.strip_prefix('#')?;
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Whether a nav link points at the page currently being viewed.
///
/// Exact path match, plus the root path matching a link to an index
/// document.
pub fn is_active_link(current_path: &str, link_path: &str) -> bool {
    link_path == current_path || (current_path == "/" && link_path.ends_with("index.html"))
}

/// Tracks which code blocks already received a copy button, so re-running
/// the enhancement pass never duplicates buttons.
#[derive(Debug, Default)]
pub struct CopyEnhancer {
    enhanced: HashSet<usize>,
}

impl CopyEnhancer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once per block id; the caller inserts a button only on
    /// a true result.
    pub fn enhance(&mut self, block: usize) -> bool {
        self.enhanced.insert(block)
    }

    /// Number of blocks enhanced so far.
    pub fn count(&self) -> usize {
        self.enhanced.len()
    }
}

/// Feedback phase of one copy button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
    Failed,
}

/// Copy-button feedback state machine.
///
/// Success shows a confirmation that reverts after [`COPY_FEEDBACK`]; a
/// failure label sticks until the next copy attempt.
#[derive(Debug, Default)]
pub struct CopyButton {
    state: CopyState,
}

impl CopyButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CopyState {
        self.state
    }

    /// Label the button shows in its current state.
    pub fn label(&self) -> &'static str {
        match self.state {
            CopyState::Idle => "Copy",
            CopyState::Copied => "Copied!",
            CopyState::Failed => "Error",
        }
    }

    /// Record the outcome of a clipboard write. Returns the delay after
    /// which the button reverts to idle, or `None` when the label persists.
    pub fn on_copy_result(&mut self, succeeded: bool) -> Option<Duration> {
        if succeeded {
            self.state = CopyState::Copied;
            Some(COPY_FEEDBACK)
        } else {
            self.state = CopyState::Failed;
            None
        }
    }

    /// Revert to the idle label.
    pub fn revert(&mut self) {
        self.state = CopyState::Idle;
    }
}

/// One-shot reveal tracking for scroll-triggered animations.
#[derive(Debug, Default)]
pub struct RevealTracker {
    revealed: HashSet<usize>,
}

impl RevealTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the element crosses the reveal threshold for the first
    /// time; the caller then applies the reveal class and stops observing.
    pub fn on_intersection(&mut self, element: usize, ratio: f64) -> bool {
        if ratio < REVEAL_THRESHOLD {
            return false;
        }
        self.revealed.insert(element)
    }

    pub fn is_revealed(&self, element: usize) -> bool {
        self.revealed.contains(&element)
    }
}
