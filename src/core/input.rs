//! Key events in, semantic input actions out.
//!
//! The terminal layer hands us a [`KeyPress`] (named key, raw sequence and
//! modifier flags); [`normalize`] decides what, if anything, that means for a
//! bottom-bar text buffer. Nothing here fails: an unrecognised or truncated
//! sequence is simply ignored.

/// Key names produced by the terminal layer.
pub mod keys {
    pub const ESCAPE: &str = "Escape";
    pub const RETURN: &str = "Return";
    pub const BACKSPACE: &str = "BackSpace";
    pub const DELETE: &str = "Delete";
    pub const UP: &str = "Up";
    pub const DOWN: &str = "Down";
    pub const LEFT: &str = "Left";
    pub const RIGHT: &str = "Right";
    pub const TAB: &str = "Tab";
    /// A bracketed paste; the text is in `KeyPress::sequence`.
    pub const PASTE: &str = "Paste";
}

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";
const CTRL_DELETE_SEQ: &str = "\x1b[3;5~";

/// A decoded key press.
///
/// `key_name` is empty for plain characters, whose text travels in
/// `sequence` (as it would have arrived from the terminal).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key_name: String,
    pub sequence: String,
    pub ctrl: bool,
    pub meta: bool,
    pub option: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn char(ch: char) -> Self {
        Self {
            sequence: ch.to_string(),
            shift: ch.is_uppercase(),
            ..Self::default()
        }
    }

    pub fn named(name: &str) -> Self {
        Self {
            key_name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn ctrl(ch: char) -> Self {
        Self {
            key_name: ch.to_ascii_lowercase().to_string(),
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn paste(text: &str) -> Self {
        Self {
            key_name: keys::PASTE.to_string(),
            sequence: text.to_string(),
            ..Self::default()
        }
    }

    /// The character this press types, if it is a single unmodified one.
    pub fn printable(&self) -> Option<char> {
        if self.ctrl || self.meta || self.option || !self.is_text() {
            return None;
        }
        let mut chars = self.sequence.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if is_printable(ch) => Some(ch),
            _ => None,
        }
    }

    /// True for the named key `name`.
    pub fn is(&self, name: &str) -> bool {
        self.key_name == name
    }

    fn is_text(&self) -> bool {
        self.key_name.is_empty() || self.key_name == keys::PASTE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// What a key press means to a text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Char(char),
    /// More than one character arriving at once (paste).
    Chunk(String),
    Backspace,
    ClearLine,
    Escape,
    Enter,
    Arrow(Direction),
    /// Ctrl plus a letter, lowercased.
    Control(char),
}

/// Classify a key press. `None` means the press does not contribute to text
/// input (a bare modifier combination, an unknown named key, or a sequence
/// that normalizes to nothing).
pub fn normalize(key: &KeyPress) -> Option<InputAction> {
    if is_clear_line(key) {
        return Some(InputAction::ClearLine);
    }
    match key.key_name.as_str() {
        keys::ESCAPE => return Some(InputAction::Escape),
        keys::RETURN => return Some(InputAction::Enter),
        keys::BACKSPACE => return Some(InputAction::Backspace),
        keys::UP => return Some(InputAction::Arrow(Direction::Up)),
        keys::DOWN => return Some(InputAction::Arrow(Direction::Down)),
        keys::LEFT => return Some(InputAction::Arrow(Direction::Left)),
        keys::RIGHT => return Some(InputAction::Arrow(Direction::Right)),
        _ => {}
    }
    if key.ctrl {
        let mut chars = key.key_name.chars();
        return match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_alphabetic() => {
                Some(InputAction::Control(ch.to_ascii_lowercase()))
            }
            _ => None,
        };
    }
    if key.sequence == "\x7f" && key.key_name.is_empty() {
        return Some(InputAction::Backspace);
    }
    if key.meta || key.option || !key.is_text() {
        return None;
    }
    let text = normalize_input_text(&key.sequence);
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (None, _) => None,
        (Some(ch), None) => Some(InputAction::Char(ch)),
        _ => Some(InputAction::Chunk(text)),
    }
}

/// Ctrl+Backspace / Ctrl+Delete, including the raw sequences terminals send
/// for them.
pub fn is_clear_line(key: &KeyPress) -> bool {
    if key.sequence == CTRL_DELETE_SEQ {
        return true;
    }
    if !key.ctrl {
        return false;
    }
    key.key_name == keys::BACKSPACE
        || key.key_name == keys::DELETE
        || key.sequence == "\x08"
        || key.sequence == "\x7f"
}

/// Make arbitrary terminal text safe for a single-line buffer: drop
/// bracketed-paste markers, turn every line break into one space, and remove
/// remaining control characters.
pub fn normalize_input_text(text: &str) -> String {
    let stripped = text.replace(PASTE_START, "").replace(PASTE_END, "");
    let single_line = stripped.replace("\r\n", "\n").replace('\r', "\n").replace('\n', " ");
    single_line.chars().filter(|&ch| is_printable(ch)).collect()
}

fn is_printable(ch: char) -> bool {
    let code = ch as u32;
    code >= 32 && code != 127
}

/// Apply a normalized action to a line buffer. Returns false when the action
/// is not a text edit (the caller handles it).
pub fn edit_buffer(buffer: &mut String, action: &InputAction) -> bool {
    match action {
        InputAction::Char(ch) => buffer.push(*ch),
        InputAction::Chunk(text) => buffer.push_str(text),
        InputAction::Backspace => {
            buffer.pop();
        }
        InputAction::ClearLine => buffer.clear(),
        _ => return false,
    }
    true
}
