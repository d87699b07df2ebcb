//! Keyboard command mapping for the presentation controller.

/// Keys the controller reacts to, already decoded by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Space,
    Home,
    End,
    Escape,
    /// A printable character key, as typed.
    Char(char),
}

/// Context in which a key press happened.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyContext {
    /// Whether a modifier (shift) was held.
    pub shift: bool,
    /// Whether focus is inside a text input or text area. Key presses there
    /// belong to the user's typing, not to the deck.
    pub in_text_input: bool,
}

/// Commands a key press can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckCommand {
    Next,
    Previous,
    First,
    Last,
    ToggleFullscreen,
    ToggleNotes,
    ExitFullscreen,
}

/// Map a key press to a deck command.
///
/// Returns `None` when the key means nothing to the deck or when focus is in
/// a text field. A `Some` result implies the caller suppresses the default
/// browser action for the key.
pub fn command_for(key: Key, ctx: KeyContext) -> Option<DeckCommand> {
    if ctx.in_text_input {
        return None;
    }

    match key {
        Key::ArrowRight => Some(DeckCommand::Next),
        Key::ArrowLeft => Some(DeckCommand::Previous),
        Key::Space if ctx.shift => Some(DeckCommand::Previous),
        Key::Space => Some(DeckCommand::Next),
        Key::Home => Some(DeckCommand::First),
        Key::End => Some(DeckCommand::Last),
        Key::Escape => Some(DeckCommand::ExitFullscreen),
        Key::Char(c) if c.eq_ignore_ascii_case(&'f') => Some(DeckCommand::ToggleFullscreen),
        Key::Char(c) if c.eq_ignore_ascii_case(&'n') => Some(DeckCommand::ToggleNotes),
        Key::Char(_) => None,
    }
}
