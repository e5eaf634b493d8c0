use super::input::{edit_buffer, keys, normalize, normalize_input_text, InputAction, KeyPress};
use super::layout::{
    columns_for, hit_test, main_layout, nudge_columns, nudge_rows, ratio_from_column, ratio_from_row,
    side_layout, split_columns, PaneLimits, ScreenDividers, SplitRatios, DETAIL_STEP,
    EDITOR_LIMITS, HISTORY_LIMITS, MAIN_LIMITS,
};
use super::mode::{Divider, EditorMode, HistoryMode, MainMode, Screen};
use super::request::{
    cycle_method, prettify_body, EditorField, Request, ResponsePreview, RunEntry,
    AUTH_FIELD_INDEX, EDITOR_FIELDS, NAME_FIELD_INDEX, URL_FIELD_INDEX,
};
use super::session::SessionState;
use super::task::{SaveOrigin, SendReport, Task, TaskOutcome};

pub const MAIN_IDLE_HINT: &str = ":help for keybinds and commands";
pub const HISTORY_IDLE_HINT: &str =
    "History: / filter | r replay | K/J split | { } req body | [ ] resp body | Esc back";
pub const EDITOR_IDLE_HINT: &str = "Editor: :help for keybinds";
pub const HELP_HINT: &str = "Esc to return to main";
pub const ACTION_PROMPT: &str = "Action: y send | e edit body | a auth editor | Esc cancel";

pub const HELP_LINES: &[&str] = &[
    "Main:",
    "  j/k, gg/G, Enter, /, ?, :, d, E, ZZ/ZQ, H/L, K/J, { }, [ ]",
    "Action: y send, e body edit, a auth editor, Esc/n cancel",
    "History: j/k, / filter, r replay, H/L split, K/J detail, { } req, [ ] resp, Esc",
    "Editor: j/k, h/l method, i/Enter edit, :w/:q/:wq, :secret VALUE, e body, Ctrl+s, Esc",
    "Commands: :q, :help, :history, :new [METHOD] [URL], :edit, :export [dir], :import <dir>",
    "Bottom input: Ctrl+v paste, Ctrl+y copy, Ctrl+Backspace/Delete clear",
    "Press Esc to return.",
];

/// Actions the UI layer should perform after a key or mouse event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineAction {
    None,
    Quit,
    /// Run this on a worker; feed the outcome back through `apply_outcome`.
    Spawn(Task),
    /// Suspend the terminal, edit `text` externally, then call
    /// `finish_external_edit` with the result.
    EditExternally { target: EditTarget, text: String },
    /// Read the system clipboard and hand it to `paste_clipboard`.
    ReadClipboard,
    /// Copy this text to the system clipboard, then call `clipboard_written`.
    WriteClipboard(String),
}

/// What an external edit session is editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// The stored body of the request with this id.
    RequestBody(String),
    /// The body of the open editor draft.
    DraftBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// The request editor's working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub draft: Request,
    /// Index into [`EDITOR_FIELDS`].
    pub field: usize,
    /// INSERT buffer.
    pub input: String,
    /// COMMAND buffer.
    pub command: String,
    pub body_scroll: usize,
    /// Bumped every time the editor opens, so late save results can tell
    /// whether their editor is still the one on screen.
    pub session: u64,
}

impl EditorState {
    pub fn current_field(&self) -> EditorField {
        EDITOR_FIELDS[self.field.min(EDITOR_FIELDS.len() - 1)]
    }
}

/// Line offsets of the scrollable body viewers. Clamped when rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollOffsets {
    pub request_body: usize,
    pub response_body: usize,
    pub history_request: usize,
    pub history_response: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Down,
    Drag,
    Move,
    Up,
}

/// A pointer event in screen cells, column 0 / row 0 at the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseInput {
    pub kind: MouseKind,
    pub col: u16,
    pub row: u16,
}

/// Outcome of feeding a key to a bottom-bar buffer.
enum LineEvent {
    Submit,
    Cancel,
    Changed,
    Paste,
    Copy,
    Ignored,
}

fn line_event(buffer: &mut String, key: &KeyPress) -> LineEvent {
    match normalize(key) {
        Some(InputAction::Escape) => LineEvent::Cancel,
        Some(InputAction::Enter) => LineEvent::Submit,
        Some(InputAction::Control('v')) => LineEvent::Paste,
        Some(InputAction::Control('y')) => LineEvent::Copy,
        Some(action) if edit_buffer(buffer, &action) => LineEvent::Changed,
        _ => LineEvent::Ignored,
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

fn step(index: usize, delta: i32, len: usize) -> usize {
    let moved = if delta < 0 {
        index.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        index.saturating_add(delta as usize)
    };
    clamp_index(moved, len)
}

pub struct Engine {
    pub screen: Screen,

    // --- Request list ---
    pub requests: Vec<Request>,
    /// Index into `visible_requests()`.
    pub selected: usize,
    /// Identity of the selection, used to notice when it changes.
    selected_id: Option<String>,
    /// Applied filter; live while searching.
    pub filter: String,
    /// SEARCH echo buffer.
    pub search_input: String,
    search_snapshot: String,
    /// COMMAND buffer.
    pub command_buffer: String,
    /// Pending key for two-key chords (gg, ZZ, ZQ).
    pub pending_key: Option<char>,

    // --- History ---
    pub runs: Vec<RunEntry>,
    pub history_selected: usize,
    history_selected_id: Option<i64>,
    pub history_filter: String,
    pub history_search_input: String,
    history_search_snapshot: String,

    pub editor: Option<EditorState>,
    pub scroll: ScrollOffsets,
    pub last_response: Option<ResponsePreview>,
    pub status: Status,

    // --- Panes ---
    pub ratios: SplitRatios,
    /// Divider being dragged, if any.
    pub drag: Option<Divider>,
    pub term_width: u16,
    pub term_height: u16,
    /// Selection to restore once the first request list arrives.
    restore_id: Option<String>,
    editor_sessions: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            screen: Screen::Main(MainMode::Normal),
            requests: Vec::new(),
            selected: 0,
            selected_id: None,
            filter: String::new(),
            search_input: String::new(),
            search_snapshot: String::new(),
            command_buffer: String::new(),
            pending_key: None,
            runs: Vec::new(),
            history_selected: 0,
            history_selected_id: None,
            history_filter: String::new(),
            history_search_input: String::new(),
            history_search_snapshot: String::new(),
            editor: None,
            scroll: ScrollOffsets::default(),
            last_response: None,
            status: Status {
                text: MAIN_IDLE_HINT.to_string(),
                kind: StatusKind::Info,
            },
            ratios: SplitRatios::default(),
            drag: None,
            term_width: 80,
            term_height: 24,
            restore_id: None,
            editor_sessions: 0,
        }
    }

    /// Start from a saved session: its ratios now, its selection once
    /// requests are loaded.
    pub fn with_session(session: SessionState) -> Self {
        Self {
            ratios: session.ratios,
            restore_id: session.selected_request,
            ..Self::new()
        }
    }

    pub fn session_state(&self) -> SessionState {
        SessionState {
            ratios: self.ratios,
            selected_request: self.selected_request().map(|r| r.id.clone()),
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.term_width = width;
        self.term_height = height;
    }

    // ─── Status ─────────────────────────────────────────────────────────────

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Status {
            text: text.into(),
            kind: StatusKind::Info,
        };
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Status {
            text: text.into(),
            kind: StatusKind::Error,
        };
    }

    /// The prompt for the active input mode, if one is showing.
    pub fn prompt(&self) -> Option<String> {
        match self.screen {
            Screen::Main(MainMode::Search(prefix)) => Some(format!("{prefix}{}", self.search_input)),
            Screen::Main(MainMode::Command) => Some(format!(":{}", self.command_buffer)),
            Screen::Main(MainMode::Action) => Some(ACTION_PROMPT.to_string()),
            Screen::Main(MainMode::DeleteConfirm) => {
                let name = self.selected_request().map(|r| r.name.as_str()).unwrap_or("");
                Some(format!("Delete '{name}'? y/n"))
            }
            Screen::History(HistoryMode::Search) => Some(format!("/{}", self.history_search_input)),
            Screen::Editor(EditorMode::Insert) => self.editor.as_ref().map(|ed| {
                format!("INSERT {}: {}", ed.current_field().label(), ed.input)
            }),
            Screen::Editor(EditorMode::Command) => {
                self.editor.as_ref().map(|ed| format!(":{}", ed.command))
            }
            _ => None,
        }
    }

    fn idle_hint(&self) -> &'static str {
        match self.screen {
            Screen::Main(_) => MAIN_IDLE_HINT,
            Screen::History(_) => HISTORY_IDLE_HINT,
            Screen::Editor(_) => EDITOR_IDLE_HINT,
            Screen::Help => HELP_HINT,
        }
    }

    /// Text of the bottom bar and whether it should be styled as an error.
    pub fn bottom_bar(&self) -> (String, bool) {
        let editor = matches!(self.screen, Screen::Editor(_));
        if let Some(prompt) = self.prompt() {
            let text = if editor {
                format!("[EDITOR {}] {prompt}", self.screen.mode_label())
            } else {
                prompt
            };
            return (text, false);
        }
        let hint = self.idle_hint();
        let idle = [MAIN_IDLE_HINT, HISTORY_IDLE_HINT, EDITOR_IDLE_HINT];
        let showing_status = !self.status.text.is_empty() && !idle.contains(&self.status.text.as_str());
        let (text, is_error) = if showing_status {
            (self.status.text.as_str(), self.status.is_error())
        } else {
            (hint, false)
        };
        if editor {
            (format!("[EDITOR] {text}"), is_error)
        } else {
            (text.to_string(), is_error)
        }
    }

    // ─── Lists and selection ────────────────────────────────────────────────

    pub fn visible_requests(&self) -> Vec<&Request> {
        let needle = self.filter.trim().to_lowercase();
        self.requests.iter().filter(|r| r.matches(&needle)).collect()
    }

    pub fn selected_request(&self) -> Option<&Request> {
        self.visible_requests().get(self.selected).copied()
    }

    pub fn visible_runs(&self) -> Vec<&RunEntry> {
        let needle = self.history_filter.trim().to_lowercase();
        self.runs.iter().filter(|r| r.matches(&needle)).collect()
    }

    pub fn selected_run(&self) -> Option<&RunEntry> {
        self.visible_runs().get(self.history_selected).copied()
    }

    /// Re-clamp the request selection against the live visible list. A
    /// change of selected request resets its body scroll and any chord.
    fn sync_selection(&mut self) {
        self.selected = clamp_index(self.selected, self.visible_requests().len());
        let id = self.selected_request().map(|r| r.id.clone());
        if id != self.selected_id {
            self.selected_id = id;
            self.scroll.request_body = 0;
            self.pending_key = None;
        }
    }

    fn sync_history_selection(&mut self) {
        self.history_selected = clamp_index(self.history_selected, self.visible_runs().len());
        let id = self.selected_run().map(|r| r.id);
        if id != self.history_selected_id {
            self.history_selected_id = id;
            self.scroll.history_request = 0;
            self.scroll.history_response = 0;
        }
    }

    /// Select the visible request with `id`; returns false when it is not
    /// visible.
    pub fn select_request_id(&mut self, id: &str) -> bool {
        let found = self.visible_requests().iter().position(|r| r.id == id);
        if let Some(idx) = found {
            self.selected = idx;
        }
        self.sync_selection();
        found.is_some()
    }

    fn replace_requests(&mut self, requests: Vec<Request>, select: Option<&str>) {
        self.requests = requests;
        match select {
            Some(id) => {
                self.select_request_id(id);
            }
            None => self.sync_selection(),
        }
    }

    fn replace_runs(&mut self, runs: Vec<RunEntry>) {
        self.runs = runs;
        self.sync_history_selection();
    }

    fn move_selection(&mut self, delta: i32) {
        self.selected = step(self.selected, delta, self.visible_requests().len());
        self.sync_selection();
    }

    fn move_history_selection(&mut self, delta: i32) {
        self.history_selected = step(self.history_selected, delta, self.visible_runs().len());
        self.sync_history_selection();
    }

    // ─── Key handling ───────────────────────────────────────────────────────

    /// Process a key event and return an action the UI should perform.
    pub fn handle_key(&mut self, key: &KeyPress) -> EngineAction {
        match self.screen {
            Screen::Main(mode) => self.handle_main_key(mode, key),
            Screen::History(mode) => self.handle_history_key(mode, key),
            Screen::Editor(mode) => self.handle_editor_key(mode, key),
            Screen::Help => {
                if key.is(keys::ESCAPE) || key.printable() == Some('q') {
                    self.screen = Screen::Main(MainMode::Normal);
                    self.set_info(MAIN_IDLE_HINT);
                }
                EngineAction::None
            }
        }
    }

    fn handle_main_key(&mut self, mode: MainMode, key: &KeyPress) -> EngineAction {
        match mode {
            MainMode::Normal => self.handle_main_normal(key),
            MainMode::Search(_) => self.handle_search_key(key),
            MainMode::Command => self.handle_command_key(key),
            MainMode::Action => self.handle_action_key(key),
            MainMode::DeleteConfirm => self.handle_delete_key(key),
        }
    }

    fn handle_main_normal(&mut self, key: &KeyPress) -> EngineAction {
        let ch = key.printable();

        // Two-key chords: a non-matching second key is handled on its own.
        if let Some(pending) = self.pending_key.take() {
            match (pending, ch) {
                ('g', Some('g')) => {
                    self.selected = 0;
                    self.sync_selection();
                    return EngineAction::None;
                }
                ('Z', Some('Z' | 'Q')) => return EngineAction::Quit,
                _ => {}
            }
        }

        if key.is(keys::ESCAPE) {
            self.filter.clear();
            self.search_input.clear();
            self.sync_selection();
            self.set_info(MAIN_IDLE_HINT);
            return EngineAction::None;
        }
        if key.is(keys::RETURN) {
            if self.selected_request().is_some() {
                self.screen = Screen::Main(MainMode::Action);
            } else {
                self.set_error("No request selected.");
            }
            return EngineAction::None;
        }
        if key.is(keys::DOWN) {
            self.move_selection(1);
            return EngineAction::None;
        }
        if key.is(keys::UP) {
            self.move_selection(-1);
            return EngineAction::None;
        }

        match ch {
            Some('j') => self.move_selection(1),
            Some('k') => self.move_selection(-1),
            Some('g') | Some('Z') => self.pending_key = ch,
            Some('G') => {
                self.selected = self.visible_requests().len().saturating_sub(1);
                self.sync_selection();
            }
            Some('H') => self.nudge_main_columns(-1),
            Some('L') => self.nudge_main_columns(1),
            Some('K') => self.nudge_main_rows(1),
            Some('J') => self.nudge_main_rows(-1),
            Some(prefix @ ('/' | '?')) => {
                self.search_snapshot = self.filter.clone();
                self.search_input = self.filter.clone();
                self.screen = Screen::Main(MainMode::Search(prefix));
            }
            Some(':') => {
                self.command_buffer.clear();
                self.screen = Screen::Main(MainMode::Command);
            }
            Some('d') => {
                if self.selected_request().is_some() {
                    self.screen = Screen::Main(MainMode::DeleteConfirm);
                } else {
                    self.set_error("No selected request to delete.");
                }
            }
            Some('E') => self.edit_selected(),
            Some('{') => self.scroll.request_body = self.scroll.request_body.saturating_sub(1),
            Some('}') => self.scroll.request_body += 1,
            Some('[') => self.scroll.response_body = self.scroll.response_body.saturating_sub(1),
            Some(']') => self.scroll.response_body += 1,
            _ => {}
        }
        EngineAction::None
    }

    fn handle_search_key(&mut self, key: &KeyPress) -> EngineAction {
        match line_event(&mut self.search_input, key) {
            LineEvent::Cancel => {
                self.filter = self.search_snapshot.clone();
                self.search_input = self.search_snapshot.clone();
                self.screen = Screen::Main(MainMode::Normal);
                self.sync_selection();
                self.set_info(MAIN_IDLE_HINT);
            }
            LineEvent::Submit => {
                self.screen = Screen::Main(MainMode::Normal);
                let shown = if self.filter.is_empty() { "(none)" } else { &self.filter };
                let text = format!("Filter locked: {shown}");
                self.set_info(text);
            }
            LineEvent::Changed => {
                self.filter = self.search_input.clone();
                self.sync_selection();
            }
            LineEvent::Paste => return EngineAction::ReadClipboard,
            LineEvent::Copy => return EngineAction::WriteClipboard(self.search_input.clone()),
            LineEvent::Ignored => {}
        }
        EngineAction::None
    }

    fn handle_command_key(&mut self, key: &KeyPress) -> EngineAction {
        match line_event(&mut self.command_buffer, key) {
            LineEvent::Cancel => {
                self.command_buffer.clear();
                self.screen = Screen::Main(MainMode::Normal);
                self.set_info(MAIN_IDLE_HINT);
            }
            LineEvent::Submit => {
                let line = std::mem::take(&mut self.command_buffer);
                self.screen = Screen::Main(MainMode::Normal);
                return self.execute_command(&line);
            }
            LineEvent::Paste => return EngineAction::ReadClipboard,
            LineEvent::Copy => return EngineAction::WriteClipboard(self.command_buffer.clone()),
            LineEvent::Changed | LineEvent::Ignored => {}
        }
        EngineAction::None
    }

    /// Run a `:` command from the main screen.
    pub fn execute_command(&mut self, raw: &str) -> EngineAction {
        let line = raw.trim();
        if line.is_empty() {
            self.set_info(MAIN_IDLE_HINT);
            return EngineAction::None;
        }
        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();
        let rest = line[line.find(char::is_whitespace).unwrap_or(line.len())..].trim();

        match cmd.as_str() {
            "q" => EngineAction::Quit,
            "help" => {
                self.screen = Screen::Help;
                self.set_info("Help screen opened.");
                EngineAction::None
            }
            "history" => {
                self.set_info("Loading history...");
                EngineAction::Spawn(Task::LoadHistory)
            }
            "new" => {
                let method = parts.next().unwrap_or("GET").to_uppercase();
                let url = parts.next().unwrap_or("");
                self.open_editor(Request::new(&method, url), URL_FIELD_INDEX);
                EngineAction::None
            }
            "edit" => {
                self.edit_selected();
                EngineAction::None
            }
            "export" => {
                self.set_info("Exporting requests...");
                let dir = (!rest.is_empty()).then(|| rest.into());
                EngineAction::Spawn(Task::Export { dir })
            }
            "import" => {
                if rest.is_empty() {
                    self.set_error("Usage: :import <directory>");
                    return EngineAction::None;
                }
                self.set_info(format!("Importing from {rest}..."));
                EngineAction::Spawn(Task::Import { dir: rest.into() })
            }
            _ => {
                self.set_error(format!("Unknown command: {line}"));
                EngineAction::None
            }
        }
    }

    fn handle_action_key(&mut self, key: &KeyPress) -> EngineAction {
        let ch = key.printable();
        if key.is(keys::ESCAPE) || ch == Some('n') {
            self.screen = Screen::Main(MainMode::Normal);
            self.set_info(MAIN_IDLE_HINT);
            return EngineAction::None;
        }
        let Some(ch @ ('y' | 'e' | 'a')) = ch else {
            return EngineAction::None;
        };
        self.screen = Screen::Main(MainMode::Normal);
        let Some(req) = self.selected_request().cloned() else {
            self.set_error("No request selected.");
            return EngineAction::None;
        };
        match ch {
            'y' => {
                self.set_info(format!("Sending {} {}...", req.method, req.url));
                EngineAction::Spawn(Task::Send(req))
            }
            'e' => EngineAction::EditExternally {
                target: EditTarget::RequestBody(req.id),
                text: req.body,
            },
            _ => {
                self.open_editor(req, AUTH_FIELD_INDEX);
                EngineAction::None
            }
        }
    }

    fn handle_delete_key(&mut self, key: &KeyPress) -> EngineAction {
        let ch = key.printable();
        if key.is(keys::ESCAPE) || ch == Some('n') {
            self.screen = Screen::Main(MainMode::Normal);
            self.set_info("Delete cancelled.");
            return EngineAction::None;
        }
        if ch != Some('y') {
            return EngineAction::None;
        }
        self.screen = Screen::Main(MainMode::Normal);
        match self.selected_request() {
            Some(req) => {
                let id = req.id.clone();
                self.set_info("Deleting request...");
                EngineAction::Spawn(Task::Delete { id })
            }
            None => {
                self.set_error("No selected request to delete.");
                EngineAction::None
            }
        }
    }

    fn handle_history_key(&mut self, mode: HistoryMode, key: &KeyPress) -> EngineAction {
        if mode == HistoryMode::Search {
            match line_event(&mut self.history_search_input, key) {
                LineEvent::Cancel => {
                    self.history_filter = self.history_search_snapshot.clone();
                    self.history_search_input = self.history_search_snapshot.clone();
                    self.screen = Screen::History(HistoryMode::Normal);
                    self.sync_history_selection();
                    self.set_info(HISTORY_IDLE_HINT);
                }
                LineEvent::Submit => {
                    self.screen = Screen::History(HistoryMode::Normal);
                    let shown = if self.history_filter.is_empty() {
                        "(none)"
                    } else {
                        &self.history_filter
                    };
                    let text = format!("History filter locked: {shown}");
                    self.set_info(text);
                }
                LineEvent::Changed => {
                    self.history_filter = self.history_search_input.clone();
                    self.sync_history_selection();
                }
                LineEvent::Paste => return EngineAction::ReadClipboard,
                LineEvent::Copy => {
                    return EngineAction::WriteClipboard(self.history_search_input.clone())
                }
                LineEvent::Ignored => {}
            }
            return EngineAction::None;
        }

        if key.is(keys::ESCAPE) {
            self.screen = Screen::Main(MainMode::Normal);
            self.set_info(MAIN_IDLE_HINT);
            return EngineAction::None;
        }
        if key.is(keys::DOWN) {
            self.move_history_selection(1);
            return EngineAction::None;
        }
        if key.is(keys::UP) {
            self.move_history_selection(-1);
            return EngineAction::None;
        }
        match key.printable() {
            Some('/') => {
                self.history_search_snapshot = self.history_filter.clone();
                self.history_search_input = self.history_filter.clone();
                self.screen = Screen::History(HistoryMode::Search);
            }
            Some('j') => self.move_history_selection(1),
            Some('k') => self.move_history_selection(-1),
            Some('r') => return self.replay_selected_run(),
            Some('H') => self.nudge_side_columns(Divider::HistoryVertical, -1),
            Some('L') => self.nudge_side_columns(Divider::HistoryVertical, 1),
            Some('K') => {
                self.ratios.nudge_history_detail(DETAIL_STEP);
                self.set_info("History detail resize: request pane grows");
            }
            Some('J') => {
                self.ratios.nudge_history_detail(-DETAIL_STEP);
                self.set_info("History detail resize: response pane grows");
            }
            Some('{') => {
                self.scroll.history_request = self.scroll.history_request.saturating_sub(1)
            }
            Some('}') => self.scroll.history_request += 1,
            Some('[') => {
                self.scroll.history_response = self.scroll.history_response.saturating_sub(1)
            }
            Some(']') => self.scroll.history_response += 1,
            _ => {}
        }
        EngineAction::None
    }

    fn replay_selected_run(&mut self) -> EngineAction {
        let Some(run) = self.selected_run() else {
            self.set_error("No run selected.");
            return EngineAction::None;
        };
        let (run_id, request_id) = (run.id, run.request_id.clone());
        self.set_info(format!("Replaying run {run_id}..."));
        EngineAction::Spawn(Task::Replay { run_id, request_id })
    }

    // ─── Editor ─────────────────────────────────────────────────────────────

    fn edit_selected(&mut self) {
        match self.selected_request().cloned() {
            Some(req) => self.open_editor(req, NAME_FIELD_INDEX),
            None => self.set_error("No selected request to edit."),
        }
    }

    pub fn open_editor(&mut self, request: Request, field: usize) {
        self.editor_sessions += 1;
        self.editor = Some(EditorState {
            draft: request,
            field: clamp_index(field, EDITOR_FIELDS.len()),
            input: String::new(),
            command: String::new(),
            body_scroll: 0,
            session: self.editor_sessions,
        });
        self.screen = Screen::Editor(EditorMode::Normal);
        self.set_info("Editor opened.");
    }

    /// True while the editor opened as `session` is still on screen.
    fn editor_session_open(&self, session: u64) -> bool {
        matches!(self.screen, Screen::Editor(_))
            && self.editor.as_ref().is_some_and(|ed| ed.session == session)
    }

    fn close_editor(&mut self) {
        self.editor = None;
        self.screen = Screen::Main(MainMode::Normal);
    }

    fn handle_editor_key(&mut self, mode: EditorMode, key: &KeyPress) -> EngineAction {
        let Some(editor) = self.editor.as_mut() else {
            self.close_editor();
            self.set_error("Editor closed: no draft.");
            return EngineAction::None;
        };

        match mode {
            EditorMode::Insert => {
                match line_event(&mut editor.input, key) {
                    LineEvent::Cancel => {
                        editor.input.clear();
                        self.screen = Screen::Editor(EditorMode::Normal);
                    }
                    LineEvent::Submit => {
                        let value = std::mem::take(&mut editor.input);
                        let field = editor.current_field();
                        editor.draft.set_field(field, value);
                        self.screen = Screen::Editor(EditorMode::Normal);
                    }
                    LineEvent::Paste => return EngineAction::ReadClipboard,
                    LineEvent::Copy => return EngineAction::WriteClipboard(editor.input.clone()),
                    LineEvent::Changed | LineEvent::Ignored => {}
                }
                EngineAction::None
            }
            EditorMode::Command => match line_event(&mut editor.command, key) {
                LineEvent::Cancel => {
                    editor.command.clear();
                    self.screen = Screen::Editor(EditorMode::Normal);
                    EngineAction::None
                }
                LineEvent::Submit => {
                    let line = std::mem::take(&mut editor.command);
                    self.screen = Screen::Editor(EditorMode::Normal);
                    self.execute_editor_command(line.trim())
                }
                LineEvent::Paste => EngineAction::ReadClipboard,
                LineEvent::Copy => EngineAction::WriteClipboard(editor.command.clone()),
                LineEvent::Changed | LineEvent::Ignored => EngineAction::None,
            },
            EditorMode::Normal => self.handle_editor_normal(key),
        }
    }

    fn handle_editor_normal(&mut self, key: &KeyPress) -> EngineAction {
        if key.ctrl && key.key_name == "s" {
            return self.save_editor_draft();
        }
        if key.is(keys::ESCAPE) {
            self.close_editor();
            self.set_info("Editor cancelled.");
            return EngineAction::None;
        }
        let Some(editor) = self.editor.as_mut() else {
            return EngineAction::None;
        };
        let ch = key.printable();
        let on_method = editor.current_field() == EditorField::Method;

        if key.is(keys::DOWN) || ch == Some('j') {
            editor.field = step(editor.field, 1, EDITOR_FIELDS.len());
        } else if key.is(keys::UP) || ch == Some('k') {
            editor.field = step(editor.field, -1, EDITOR_FIELDS.len());
        } else if on_method && (key.is(keys::LEFT) || ch == Some('h')) {
            editor.draft.method = cycle_method(&editor.draft.method, -1).to_string();
        } else if on_method && (key.is(keys::RIGHT) || ch == Some('l')) {
            editor.draft.method = cycle_method(&editor.draft.method, 1).to_string();
        } else if key.is(keys::RETURN) || ch == Some('i') {
            let field = editor.current_field();
            if field.editable() {
                editor.input = editor.draft.field(field).to_string();
                self.screen = Screen::Editor(EditorMode::Insert);
            }
        } else if ch == Some(':') {
            editor.command.clear();
            self.screen = Screen::Editor(EditorMode::Command);
        } else if ch == Some('e') {
            return EngineAction::EditExternally {
                target: EditTarget::DraftBody,
                text: editor.draft.body.clone(),
            };
        } else if ch == Some('{') {
            editor.body_scroll = editor.body_scroll.saturating_sub(1);
        } else if ch == Some('}') {
            editor.body_scroll += 1;
        }
        EngineAction::None
    }

    fn execute_editor_command(&mut self, line: &str) -> EngineAction {
        match line {
            "w" | "wq" => return self.save_editor_draft(),
            "q" => {
                self.close_editor();
                self.set_info("Editor cancelled.");
                return EngineAction::None;
            }
            _ => {}
        }
        if let Some(value) = line.strip_prefix("secret ") {
            if value.trim().is_empty() {
                self.set_error("Usage: :secret VALUE");
                return EngineAction::None;
            }
            let secret_ref = self
                .editor
                .as_ref()
                .map(|ed| ed.draft.auth_secret_ref.trim().to_string())
                .unwrap_or_default();
            if secret_ref.is_empty() {
                self.set_error("Set Secret Ref before :secret VALUE");
                return EngineAction::None;
            }
            self.set_info(format!("Storing secret for ref '{secret_ref}'..."));
            return EngineAction::Spawn(Task::StoreSecret {
                secret_ref,
                value: value.trim().to_string(),
            });
        }
        if line == "secret" {
            self.set_error("Usage: :secret VALUE");
            return EngineAction::None;
        }
        self.set_error(format!("Unknown editor command: {line}"));
        EngineAction::None
    }

    /// Validate the draft and hand it to the store. Validation failures
    /// leave the editor open.
    fn save_editor_draft(&mut self) -> EngineAction {
        let Some(editor) = self.editor.as_ref() else {
            self.close_editor();
            self.set_error("No draft to save.");
            return EngineAction::None;
        };
        let session = editor.session;
        match editor.draft.validated() {
            Ok(request) => {
                self.set_info(format!("Saving {}...", request.name));
                EngineAction::Spawn(Task::Save {
                    request,
                    origin: SaveOrigin::Editor { session },
                })
            }
            Err(msg) => {
                self.set_error(msg);
                EngineAction::None
            }
        }
    }

    // ─── Clipboard ──────────────────────────────────────────────────────────

    /// The bottom-bar buffer that has focus, if any.
    fn active_buffer_mut(&mut self) -> Option<&mut String> {
        match self.screen {
            Screen::Main(MainMode::Search(_)) => Some(&mut self.search_input),
            Screen::Main(MainMode::Command) => Some(&mut self.command_buffer),
            Screen::History(HistoryMode::Search) => Some(&mut self.history_search_input),
            Screen::Editor(EditorMode::Insert) => self.editor.as_mut().map(|ed| &mut ed.input),
            Screen::Editor(EditorMode::Command) => self.editor.as_mut().map(|ed| &mut ed.command),
            _ => None,
        }
    }

    /// Append clipboard text to the focused buffer.
    pub fn paste_clipboard(&mut self, clip: anyhow::Result<String>) {
        let text = match clip {
            Ok(text) => normalize_input_text(&text),
            Err(e) => {
                self.set_error(format!("Paste failed: {e:#}"));
                return;
            }
        };
        if text.is_empty() {
            self.set_error("Paste failed: clipboard is empty or non-printable.");
            return;
        }
        let Some(buffer) = self.active_buffer_mut() else {
            return;
        };
        buffer.push_str(&text);
        match self.screen {
            Screen::Main(MainMode::Search(_)) => {
                self.filter = self.search_input.clone();
                self.sync_selection();
            }
            Screen::History(HistoryMode::Search) => {
                self.history_filter = self.history_search_input.clone();
                self.sync_history_selection();
            }
            _ => {}
        }
    }

    pub fn clipboard_written(&mut self, result: anyhow::Result<()>) {
        match result {
            Ok(()) => self.set_info("Copied bottom input to system clipboard."),
            Err(e) => self.set_error(format!("Copy failed: {e:#}")),
        }
    }

    // ─── External editor ────────────────────────────────────────────────────

    /// Resume after an external edit. `Ok(None)` means the editor exited
    /// non-zero.
    pub fn finish_external_edit(
        &mut self,
        target: EditTarget,
        edited: anyhow::Result<Option<String>>,
    ) -> EngineAction {
        let text = match edited {
            Ok(Some(text)) => text,
            Ok(None) => {
                self.set_error("Body edit cancelled.");
                return EngineAction::None;
            }
            Err(e) => {
                self.set_error(format!("External editor failed: {e:#}"));
                return EngineAction::None;
            }
        };
        let body = match prettify_body(&text) {
            Ok(body) => body,
            Err(e) => {
                self.set_error(format!("Body JSON invalid: {e}"));
                return EngineAction::None;
            }
        };
        match target {
            EditTarget::RequestBody(id) => {
                let Some(existing) = self.requests.iter().find(|r| r.id == id) else {
                    self.set_error("Request no longer exists.");
                    return EngineAction::None;
                };
                let request = Request {
                    body,
                    ..existing.clone()
                };
                self.set_info(format!("Saving body for {}...", request.name));
                EngineAction::Spawn(Task::Save {
                    request,
                    origin: SaveOrigin::BodyEdit,
                })
            }
            EditTarget::DraftBody => {
                match self.editor.as_mut() {
                    Some(editor) => {
                        editor.draft.body = body;
                        editor.body_scroll = 0;
                        self.set_info("Editor body updated from external editor.");
                    }
                    None => self.set_error("No editor draft for body edit."),
                }
                EngineAction::None
            }
        }
    }

    // ─── Task outcomes ──────────────────────────────────────────────────────

    /// Apply a finished task against the state as it is now.
    pub fn apply_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Loaded { requests, runs } => {
                match runs {
                    Ok(runs) => self.replace_runs(runs),
                    Err(e) => tracing::warn!("history unavailable at startup: {e:#}"),
                }
                match requests {
                    Ok(requests) => {
                        let count = requests.len();
                        let restore = self.restore_id.take();
                        self.replace_requests(requests, restore.as_deref());
                        self.set_info(format!("Loaded {count} request(s)."));
                    }
                    Err(e) => self.set_error(format!("{e:#}")),
                }
            }
            TaskOutcome::HistoryLoaded(Ok(runs)) => {
                self.replace_runs(runs);
                if matches!(self.screen, Screen::Main(MainMode::Normal)) {
                    self.screen = Screen::History(HistoryMode::Normal);
                }
                self.set_info("History loaded.");
            }
            TaskOutcome::HistoryLoaded(Err(e)) => {
                self.set_error(format!("Failed to load history: {e:#}"));
            }
            TaskOutcome::Sent(report) => self.apply_sent(report),
            TaskOutcome::ReplayFailed { run_id, error } => match error {
                None => self.set_error(format!("Request no longer exists for run {run_id}.")),
                Some(e) => self.set_error(format!("Replay failed: {e:#}")),
            },
            TaskOutcome::Saved { origin, result } => match (origin, result) {
                (SaveOrigin::Editor { session }, Ok((saved, requests))) => {
                    self.replace_requests(requests, Some(saved.id.as_str()));
                    if self.editor_session_open(session) {
                        self.close_editor();
                    }
                    self.set_info(format!("Saved {}.", saved.name));
                }
                (SaveOrigin::Editor { session }, Err(e)) => {
                    if self.editor_session_open(session) {
                        self.close_editor();
                    }
                    self.set_error(format!("Save failed: {e:#}"));
                }
                (SaveOrigin::BodyEdit, Ok((saved, requests))) => {
                    self.replace_requests(requests, Some(saved.id.as_str()));
                    self.set_info(format!("Body updated for {}.", saved.name));
                }
                (SaveOrigin::BodyEdit, Err(e)) => {
                    self.set_error(format!("Body save failed: {e:#}"));
                }
            },
            TaskOutcome::Deleted(Ok(requests)) => {
                self.replace_requests(requests, None);
                self.set_info("Request deleted.");
            }
            TaskOutcome::Deleted(Err(e)) => self.set_error(format!("{e:#}")),
            TaskOutcome::SecretStored { secret_ref, result } => match result {
                Ok(()) => self.set_info(format!("Stored secret for ref '{secret_ref}'.")),
                Err(e) => self.set_error(format!("Secret write failed: {e:#}")),
            },
            TaskOutcome::Exported(Ok(report)) => self.set_info(format!(
                "Exported {} request(s) to {} (scrubbed {} secret ref(s)).",
                report.count,
                report.directory.display(),
                report.scrubbed
            )),
            TaskOutcome::Exported(Err(e)) => self.set_error(format!("Export failed: {e:#}")),
            TaskOutcome::Imported { dir, result } => match result {
                Ok((count, requests)) => {
                    self.replace_requests(requests, None);
                    self.set_info(format!("Imported {count} request(s) from {}.", dir.display()));
                }
                Err(e) => self.set_error(format!("Import failed: {e:#}")),
            },
        }
    }

    fn apply_sent(&mut self, report: SendReport) {
        let SendReport {
            request,
            response,
            at,
            recorded,
            runs,
            replay_of,
        } = report;
        self.last_response = Some(ResponsePreview::new(&request, &response, at));
        self.scroll.response_body = 0;
        if let Some(runs) = runs {
            self.replace_runs(runs);
        }
        // Only leave HISTORY if the user is still idling there.
        if replay_of.is_some() && self.screen == Screen::History(HistoryMode::Normal) {
            self.screen = Screen::Main(MainMode::Normal);
            self.select_request_id(&request.id);
        }

        if !response.error.is_empty() {
            self.set_error(format!("Request failed: {}", response.error));
        } else if let Err(e) = recorded {
            self.set_error(format!("Run not recorded: {e:#}"));
        } else if replay_of.is_some() {
            self.set_info(format!(
                "Replayed {}: {} ({} ms)",
                request.name, response.status_code, response.duration_ms
            ));
        } else {
            self.set_info(format!(
                "{} {} -> {} ({} ms)",
                request.method, request.url, response.status_code, response.duration_ms
            ));
        }
    }

    // ─── Panes ──────────────────────────────────────────────────────────────

    /// Dividers of the screen that is showing, at the current size.
    pub fn dividers(&self) -> ScreenDividers {
        let (w, h) = (self.term_width, self.term_height);
        match self.screen {
            Screen::Main(_) => ScreenDividers::Main(main_layout(w, h, &self.ratios)),
            Screen::History(_) => ScreenDividers::Side(
                side_layout(w, h, self.ratios.history_vertical, HISTORY_LIMITS),
                Divider::HistoryVertical,
            ),
            Screen::Editor(_) => ScreenDividers::Side(
                side_layout(w, h, self.ratios.editor_vertical, EDITOR_LIMITS),
                Divider::EditorVertical,
            ),
            Screen::Help => ScreenDividers::None,
        }
    }

    fn main_resize_status(&self) -> String {
        let (left, _) = split_columns(
            self.term_width,
            self.ratios.main_vertical,
            MAIN_LIMITS.min_left,
            MAIN_LIMITS.min_right,
        );
        let rows = main_layout(self.term_width, self.term_height, &self.ratios).rows;
        format!("Resize: left={left} cols response={} rows", rows.bottom_rows)
    }

    fn side_resize_status(&self, divider: Divider) -> String {
        let limits = if divider == Divider::EditorVertical {
            EDITOR_LIMITS
        } else {
            HISTORY_LIMITS
        };
        let (left, _) = split_columns(
            self.term_width,
            self.ratios.get(divider),
            limits.min_left,
            limits.min_right,
        );
        if divider == Divider::EditorVertical {
            format!("Editor resize: left={left} cols")
        } else {
            format!("History resize: left={left} cols")
        }
    }

    /// False (with a status saying why) when the side pane is not drawn at
    /// the current width, so there is no divider to move.
    fn split_visible(&mut self, ratio: f64, limits: PaneLimits) -> bool {
        if columns_for(self.term_width, ratio, limits).show_right {
            return true;
        }
        self.set_info(format!(
            "Split hidden below {} columns.",
            limits.companion_min_width
        ));
        false
    }

    fn nudge_main_columns(&mut self, delta: i32) {
        if !self.split_visible(self.ratios.main_vertical, MAIN_LIMITS) {
            return;
        }
        let ratio = nudge_columns(self.term_width, self.ratios.main_vertical, MAIN_LIMITS, delta);
        self.ratios.set(Divider::MainVertical, ratio);
        self.set_info(self.main_resize_status());
    }

    fn nudge_main_rows(&mut self, delta: i32) {
        let ratio = nudge_rows(self.term_height, self.ratios.main_horizontal, delta);
        self.ratios.set(Divider::MainHorizontal, ratio);
        self.set_info(self.main_resize_status());
    }

    fn nudge_side_columns(&mut self, divider: Divider, delta: i32) {
        let limits = if divider == Divider::EditorVertical {
            EDITOR_LIMITS
        } else {
            HISTORY_LIMITS
        };
        if !self.split_visible(self.ratios.get(divider), limits) {
            return;
        }
        let ratio = nudge_columns(self.term_width, self.ratios.get(divider), limits, delta);
        self.ratios.set(divider, ratio);
        self.set_info(self.side_resize_status(divider));
    }

    fn apply_drag(&mut self, divider: Divider, col: u16, row: u16) {
        let (w, h) = (self.term_width, self.term_height);
        if w == 0 || h == 0 {
            return;
        }
        let ratio = match divider {
            Divider::MainHorizontal => ratio_from_row(row, h),
            Divider::MainVertical => ratio_from_column(col, w, MAIN_LIMITS.min_left, MAIN_LIMITS.min_right),
            Divider::HistoryVertical => {
                ratio_from_column(col, w, HISTORY_LIMITS.min_left, HISTORY_LIMITS.min_right)
            }
            Divider::EditorVertical => {
                ratio_from_column(col, w, EDITOR_LIMITS.min_left, EDITOR_LIMITS.min_right)
            }
        };
        self.ratios.set(divider, ratio);
    }

    pub fn handle_mouse(&mut self, mouse: MouseInput) {
        match mouse.kind {
            MouseKind::Down => {
                if self.drag.is_some() {
                    return;
                }
                let Some(divider) = hit_test(self.dividers(), mouse.col, mouse.row) else {
                    return;
                };
                self.drag = Some(divider);
                self.set_info(match divider {
                    Divider::MainVertical | Divider::MainHorizontal => {
                        "Dragging main pane divider..."
                    }
                    Divider::HistoryVertical => "Dragging history divider...",
                    Divider::EditorVertical => "Dragging editor divider...",
                });
                self.apply_drag(divider, mouse.col, mouse.row);
            }
            MouseKind::Drag | MouseKind::Move => {
                if let Some(divider) = self.drag {
                    self.apply_drag(divider, mouse.col, mouse.row);
                }
            }
            MouseKind::Up => {
                let Some(divider) = self.drag.take() else {
                    return;
                };
                let text = match divider {
                    Divider::MainVertical | Divider::MainHorizontal => self.main_resize_status(),
                    other => self.side_resize_status(other),
                };
                self.set_info(text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::request::{HttpResponse, DEFAULT_NAME};
    use crate::core::task::ExportReport;
    use std::path::PathBuf;

    fn press_char(engine: &mut Engine, ch: char) -> EngineAction {
        engine.handle_key(&KeyPress::char(ch))
    }

    fn press_special(engine: &mut Engine, name: &str) -> EngineAction {
        engine.handle_key(&KeyPress::named(name))
    }

    fn type_text(engine: &mut Engine, text: &str) {
        for ch in text.chars() {
            press_char(engine, ch);
        }
    }

    fn request(id: &str, name: &str) -> Request {
        Request {
            id: id.to_string(),
            name: name.to_string(),
            url: format!("http://example.test/{}", name.to_lowercase()),
            ..Request::default()
        }
    }

    fn run(id: i64, request_id: &str, name: &str, status: i64) -> RunEntry {
        RunEntry {
            id,
            request_id: request_id.to_string(),
            request_name: name.to_string(),
            method: "GET".to_string(),
            status_code: status,
            ..RunEntry::default()
        }
    }

    fn loaded(names: &[&str]) -> Engine {
        let mut engine = Engine::new();
        engine.resize(120, 40);
        let requests = names
            .iter()
            .enumerate()
            .map(|(i, n)| request(&format!("id{i}"), n))
            .collect();
        engine.apply_outcome(TaskOutcome::Loaded {
            requests: Ok(requests),
            runs: Ok(Vec::new()),
        });
        engine
    }

    fn selected_name(engine: &Engine) -> Option<String> {
        engine.selected_request().map(|r| r.name.clone())
    }

    #[test]
    fn test_bootstrap_status() {
        let engine = loaded(&["A", "B"]);
        assert_eq!(engine.status.text, "Loaded 2 request(s).");
        assert_eq!(selected_name(&engine).as_deref(), Some("A"));
    }

    #[test]
    fn test_bootstrap_restores_session_selection() {
        let session = SessionState {
            selected_request: Some("id1".to_string()),
            ..SessionState::default()
        };
        let mut engine = Engine::with_session(session);
        engine.apply_outcome(TaskOutcome::Loaded {
            requests: Ok(vec![request("id0", "A"), request("id1", "B")]),
            runs: Err(anyhow::anyhow!("no db")),
        });
        assert_eq!(engine.selected, 1);
        assert_eq!(engine.session_state().selected_request.as_deref(), Some("id1"));
    }

    #[test]
    fn test_jk_clamped() {
        let mut engine = loaded(&["A", "B", "C"]);
        press_char(&mut engine, 'k');
        assert_eq!(engine.selected, 0);
        for _ in 0..5 {
            press_char(&mut engine, 'j');
        }
        assert_eq!(engine.selected, 2);
        press_special(&mut engine, keys::UP);
        assert_eq!(engine.selected, 1);
    }

    #[test]
    fn test_gg_chord() {
        let mut engine = loaded(&["A", "B", "C"]);
        press_char(&mut engine, 'G');
        assert_eq!(engine.selected, 2);
        press_char(&mut engine, 'g');
        assert_eq!(engine.pending_key, Some('g'));
        press_char(&mut engine, 'g');
        assert_eq!(engine.selected, 0);
        assert_eq!(engine.pending_key, None);
    }

    #[test]
    fn test_g_then_other_key_does_not_jump() {
        let mut engine = loaded(&["A", "B", "C"]);
        press_char(&mut engine, 'G');
        press_char(&mut engine, 'g');
        press_char(&mut engine, 'k');
        assert_eq!(engine.selected, 1);
        press_char(&mut engine, 'g');
        assert_eq!(engine.selected, 1);
        assert_eq!(engine.pending_key, Some('g'));
    }

    #[test]
    fn test_zz_and_zq_quit() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, 'Z');
        assert_eq!(press_char(&mut engine, 'Z'), EngineAction::Quit);
        press_char(&mut engine, 'Z');
        assert_eq!(press_char(&mut engine, 'Q'), EngineAction::Quit);
        press_char(&mut engine, 'Z');
        assert_eq!(press_char(&mut engine, 'j'), EngineAction::None);
        assert_eq!(press_char(&mut engine, 'Q'), EngineAction::None);
    }

    #[test]
    fn test_reload_clamps_selection() {
        let mut engine = loaded(&["A", "B", "C"]);
        press_char(&mut engine, 'G');
        assert_eq!(engine.selected, 2);
        engine.apply_outcome(TaskOutcome::Deleted(Ok(vec![
            request("id0", "A"),
            request("id1", "B"),
        ])));
        assert_eq!(engine.selected, 1);
        assert_eq!(engine.status.text, "Request deleted.");
    }

    #[test]
    fn test_search_is_live_and_escape_restores() {
        let mut engine = loaded(&["foo", "foobar", "baz"]);
        press_char(&mut engine, '/');
        type_text(&mut engine, "foo");
        press_special(&mut engine, keys::RETURN);
        assert_eq!(engine.filter, "foo");
        assert_eq!(engine.status.text, "Filter locked: foo");

        press_char(&mut engine, '/');
        type_text(&mut engine, "bar");
        assert_eq!(engine.filter, "foobar");
        assert_eq!(engine.visible_requests().len(), 1);
        press_special(&mut engine, keys::ESCAPE);
        assert_eq!(engine.filter, "foo");
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));
        assert_eq!(engine.visible_requests().len(), 2);
    }

    #[test]
    fn test_search_narrowing_clamps_selection() {
        let mut engine = loaded(&["alpha", "beta", "gamma"]);
        press_char(&mut engine, 'G');
        press_char(&mut engine, '?');
        type_text(&mut engine, "alp");
        assert_eq!(engine.selected, 0);
        assert_eq!(selected_name(&engine).as_deref(), Some("alpha"));
        insta::assert_snapshot!(engine.prompt().unwrap_or_default(), @"?alp");
    }

    #[test]
    fn test_escape_in_normal_clears_filter() {
        let mut engine = loaded(&["A", "B"]);
        engine.filter = "a".to_string();
        press_special(&mut engine, keys::ESCAPE);
        assert!(engine.filter.is_empty());
        assert_eq!(engine.status.text, MAIN_IDLE_HINT);
    }

    #[test]
    fn test_lock_empty_filter() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, '/');
        press_special(&mut engine, keys::RETURN);
        insta::assert_snapshot!(engine.status.text, @"Filter locked: (none)");
    }

    #[test]
    fn test_import_without_dir_is_usage_error() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, ':');
        type_text(&mut engine, "import ");
        let action = press_special(&mut engine, keys::RETURN);
        assert_eq!(action, EngineAction::None);
        assert!(engine.status.is_error());
        insta::assert_snapshot!(engine.status.text, @"Usage: :import <directory>");
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));
    }

    #[test]
    fn test_import_with_dir_spawns() {
        let mut engine = loaded(&["A"]);
        let action = engine.execute_command("import /tmp/my export");
        assert_eq!(
            action,
            EngineAction::Spawn(Task::Import {
                dir: PathBuf::from("/tmp/my export")
            })
        );
        engine.apply_outcome(TaskOutcome::Imported {
            dir: PathBuf::from("/tmp/my export"),
            result: Ok((2, vec![request("a", "A"), request("b", "B")])),
        });
        assert_eq!(engine.status.text, "Imported 2 request(s) from /tmp/my export.");
        assert_eq!(engine.requests.len(), 2);
    }

    #[test]
    fn test_export_commands() {
        let mut engine = loaded(&["A"]);
        assert_eq!(
            engine.execute_command("export"),
            EngineAction::Spawn(Task::Export { dir: None })
        );
        assert_eq!(
            engine.execute_command("EXPORT out"),
            EngineAction::Spawn(Task::Export {
                dir: Some(PathBuf::from("out"))
            })
        );
        engine.apply_outcome(TaskOutcome::Exported(Ok(ExportReport {
            directory: PathBuf::from("out"),
            count: 3,
            scrubbed: 1,
        })));
        insta::assert_snapshot!(
            engine.status.text,
            @"Exported 3 request(s) to out (scrubbed 1 secret ref(s))."
        );
    }

    #[test]
    fn test_unknown_and_empty_command() {
        let mut engine = loaded(&["A"]);
        engine.execute_command("frobnicate now");
        assert_eq!(engine.status.text, "Unknown command: frobnicate now");
        assert!(engine.status.is_error());
        engine.execute_command("   ");
        assert_eq!(engine.status.text, MAIN_IDLE_HINT);
    }

    #[test]
    fn test_command_escape_discards() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, ':');
        type_text(&mut engine, "q");
        assert_eq!(press_special(&mut engine, keys::ESCAPE), EngineAction::None);
        assert!(engine.command_buffer.is_empty());
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));
    }

    #[test]
    fn test_quit_and_help_commands() {
        let mut engine = loaded(&["A"]);
        assert_eq!(engine.execute_command("q"), EngineAction::Quit);
        engine.execute_command("help");
        assert_eq!(engine.screen, Screen::Help);
        press_char(&mut engine, 'x');
        assert_eq!(engine.screen, Screen::Help);
        press_char(&mut engine, 'q');
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));
    }

    #[test]
    fn test_new_opens_editor_on_url() {
        let mut engine = loaded(&[]);
        engine.execute_command("new post http://x/y");
        let editor = engine.editor.as_ref().unwrap();
        assert_eq!(editor.draft.method, "POST");
        assert_eq!(editor.draft.url, "http://x/y");
        assert_eq!(editor.draft.name, DEFAULT_NAME);
        assert_eq!(editor.field, URL_FIELD_INDEX);
        assert_eq!(engine.screen, Screen::Editor(EditorMode::Normal));
    }

    #[test]
    fn test_history_command_switches_screen_on_load() {
        let mut engine = loaded(&["A"]);
        assert_eq!(engine.execute_command("history"), EngineAction::Spawn(Task::LoadHistory));
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));
        engine.apply_outcome(TaskOutcome::HistoryLoaded(Ok(vec![run(1, "id0", "A", 200)])));
        assert_eq!(engine.screen, Screen::History(HistoryMode::Normal));
        assert_eq!(engine.status.text, "History loaded.");
    }

    #[test]
    fn test_enter_without_selection() {
        let mut engine = loaded(&[]);
        press_special(&mut engine, keys::RETURN);
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));
        assert_eq!(engine.status.text, "No request selected.");
        press_char(&mut engine, 'd');
        assert_eq!(engine.status.text, "No selected request to delete.");
    }

    #[test]
    fn test_action_send() {
        let mut engine = loaded(&["A"]);
        press_special(&mut engine, keys::RETURN);
        assert_eq!(engine.prompt().as_deref(), Some(ACTION_PROMPT));
        let action = press_char(&mut engine, 'y');
        let EngineAction::Spawn(Task::Send(req)) = action else {
            panic!("expected a send task");
        };
        assert_eq!(req.name, "A");
        assert_eq!(engine.status.text, "Sending GET http://example.test/a...");
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));

        engine.scroll.response_body = 4;
        engine.apply_outcome(TaskOutcome::Sent(SendReport {
            request: req,
            response: HttpResponse {
                status_code: 200,
                duration_ms: 12,
                body: "{}".to_string(),
                error: String::new(),
            },
            at: "2026-01-01T00:00:00Z".to_string(),
            recorded: Ok(7),
            runs: Some(vec![run(7, "id0", "A", 200)]),
            replay_of: None,
        }));
        assert_eq!(engine.scroll.response_body, 0);
        assert_eq!(engine.runs.len(), 1);
        assert_eq!(engine.last_response.as_ref().unwrap().status_code, 200);
        insta::assert_snapshot!(engine.status.text, @"GET http://example.test/a -> 200 (12 ms)");
    }

    #[test]
    fn test_send_transport_failure_is_error() {
        let mut engine = loaded(&["A"]);
        let req = engine.requests[0].clone();
        engine.apply_outcome(TaskOutcome::Sent(SendReport {
            request: req,
            response: HttpResponse::transport_error("connection refused", 3),
            at: String::new(),
            recorded: Ok(1),
            runs: None,
            replay_of: None,
        }));
        assert!(engine.status.is_error());
        assert_eq!(engine.status.text, "Request failed: connection refused");
    }

    #[test]
    fn test_action_cancel_and_auth_editor() {
        let mut engine = loaded(&["A"]);
        press_special(&mut engine, keys::RETURN);
        press_char(&mut engine, 'x');
        assert_eq!(engine.screen, Screen::Main(MainMode::Action));
        press_char(&mut engine, 'n');
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));

        press_special(&mut engine, keys::RETURN);
        press_char(&mut engine, 'a');
        assert_eq!(engine.editor.as_ref().unwrap().field, AUTH_FIELD_INDEX);
    }

    #[test]
    fn test_action_edit_body_round_trip() {
        let mut engine = loaded(&["A"]);
        press_special(&mut engine, keys::RETURN);
        let action = press_char(&mut engine, 'e');
        assert_eq!(
            action,
            EngineAction::EditExternally {
                target: EditTarget::RequestBody("id0".to_string()),
                text: String::new(),
            }
        );
        let next = engine.finish_external_edit(
            EditTarget::RequestBody("id0".to_string()),
            Ok(Some(r#"{"a":1}"#.to_string())),
        );
        let EngineAction::Spawn(Task::Save { request, origin }) = next else {
            panic!("expected a save task");
        };
        assert_eq!(origin, SaveOrigin::BodyEdit);
        assert_eq!(request.body, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_external_edit_failures() {
        let mut engine = loaded(&["A"]);
        let target = EditTarget::RequestBody("id0".to_string());
        engine.finish_external_edit(target.clone(), Ok(None));
        assert_eq!(engine.status.text, "Body edit cancelled.");
        engine.finish_external_edit(target, Ok(Some("{bad".to_string())));
        assert!(engine.status.text.starts_with("Body JSON invalid: "));
        engine.finish_external_edit(EditTarget::RequestBody("gone".to_string()), Ok(Some("x".into())));
        assert_eq!(engine.status.text, "Request no longer exists.");
    }

    #[test]
    fn test_delete_confirm_flow() {
        let mut engine = loaded(&["A", "B"]);
        press_char(&mut engine, 'j');
        press_char(&mut engine, 'd');
        insta::assert_snapshot!(engine.prompt().unwrap_or_default(), @"Delete 'B'? y/n");
        press_char(&mut engine, 'x');
        assert_eq!(engine.screen, Screen::Main(MainMode::DeleteConfirm));
        press_special(&mut engine, keys::ESCAPE);
        assert_eq!(engine.status.text, "Delete cancelled.");

        press_char(&mut engine, 'd');
        let action = press_char(&mut engine, 'y');
        assert_eq!(
            action,
            EngineAction::Spawn(Task::Delete {
                id: "id1".to_string()
            })
        );
    }

    #[test]
    fn test_selection_change_resets_scroll() {
        let mut engine = loaded(&["A", "B"]);
        press_char(&mut engine, '}');
        press_char(&mut engine, '}');
        assert_eq!(engine.scroll.request_body, 2);
        press_char(&mut engine, '{');
        assert_eq!(engine.scroll.request_body, 1);
        press_char(&mut engine, 'j');
        assert_eq!(engine.scroll.request_body, 0);
        press_char(&mut engine, '[');
        assert_eq!(engine.scroll.response_body, 0);
    }

    #[test]
    fn test_resize_keys() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, 'L');
        insta::assert_snapshot!(engine.status.text, @"Resize: left=80 cols response=10 rows");
        press_char(&mut engine, 'K');
        assert_eq!(engine.status.text, "Resize: left=80 cols response=11 rows");
        press_char(&mut engine, 'H');
        press_char(&mut engine, 'J');
        assert_eq!(engine.status.text, "Resize: left=79 cols response=10 rows");
    }

    #[test]
    fn test_editor_fields_and_insert() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, 'E');
        assert_eq!(engine.editor.as_ref().unwrap().field, NAME_FIELD_INDEX);
        press_special(&mut engine, keys::RETURN);
        assert_eq!(engine.screen, Screen::Editor(EditorMode::Insert));
        press_special(&mut engine, keys::BACKSPACE);
        type_text(&mut engine, "lpha");
        insta::assert_snapshot!(engine.bottom_bar().0, @"[EDITOR INSERT] INSERT Name: lpha");
        press_special(&mut engine, keys::RETURN);
        assert_eq!(engine.editor.as_ref().unwrap().draft.name, "lpha");

        // Method is read-only; h/l cycle it instead.
        press_char(&mut engine, 'j');
        press_char(&mut engine, 'i');
        assert_eq!(engine.screen, Screen::Editor(EditorMode::Normal));
        press_char(&mut engine, 'h');
        assert_eq!(engine.editor.as_ref().unwrap().draft.method, "DELETE");
        press_special(&mut engine, keys::RIGHT);
        press_char(&mut engine, 'l');
        assert_eq!(engine.editor.as_ref().unwrap().draft.method, "POST");

        press_char(&mut engine, 'i');
        press_char(&mut engine, 'j');
        assert_eq!(engine.editor.as_ref().unwrap().field, 2);
    }

    #[test]
    fn test_editor_insert_escape_discards() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, 'E');
        press_char(&mut engine, 'i');
        type_text(&mut engine, "zzz");
        press_special(&mut engine, keys::ESCAPE);
        assert_eq!(engine.editor.as_ref().unwrap().draft.name, "A");
        assert_eq!(engine.screen, Screen::Editor(EditorMode::Normal));
    }

    #[test]
    fn test_editor_save_validation() {
        let mut engine = loaded(&[]);
        engine.execute_command("new");
        let action = engine.handle_key(&KeyPress::ctrl('s'));
        assert_eq!(action, EngineAction::None);
        assert_eq!(engine.status.text, "URL is required before save.");
        assert_eq!(engine.screen, Screen::Editor(EditorMode::Normal));

        press_special(&mut engine, keys::RETURN);
        type_text(&mut engine, "http://x");
        press_special(&mut engine, keys::RETURN);
        press_char(&mut engine, ':');
        type_text(&mut engine, "wq");
        let action = press_special(&mut engine, keys::RETURN);
        let EngineAction::Spawn(Task::Save { request, origin }) = action else {
            panic!("expected a save task");
        };
        assert!(matches!(origin, SaveOrigin::Editor { .. }));

        let saved = Request {
            id: "new1".to_string(),
            ..request
        };
        engine.apply_outcome(TaskOutcome::Saved {
            origin,
            result: Ok((saved.clone(), vec![saved])),
        });
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));
        assert!(engine.editor.is_none());
        assert_eq!(engine.status.text, format!("Saved {DEFAULT_NAME}."));
        assert_eq!(engine.selected_request().unwrap().id, "new1");
    }

    #[test]
    fn test_editor_secret_command() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, 'E');
        press_char(&mut engine, ':');
        type_text(&mut engine, "secret hunter2");
        press_special(&mut engine, keys::RETURN);
        assert_eq!(engine.status.text, "Set Secret Ref before :secret VALUE");

        engine.editor.as_mut().unwrap().draft.auth_secret_ref = "api".to_string();
        press_char(&mut engine, ':');
        type_text(&mut engine, "secret  ");
        press_special(&mut engine, keys::RETURN);
        assert_eq!(engine.status.text, "Usage: :secret VALUE");

        press_char(&mut engine, ':');
        type_text(&mut engine, "secret hunter2");
        let action = press_special(&mut engine, keys::RETURN);
        assert_eq!(
            action,
            EngineAction::Spawn(Task::StoreSecret {
                secret_ref: "api".to_string(),
                value: "hunter2".to_string(),
            })
        );
        engine.apply_outcome(TaskOutcome::SecretStored {
            secret_ref: "api".to_string(),
            result: Ok(()),
        });
        assert_eq!(engine.status.text, "Stored secret for ref 'api'.");
    }

    #[test]
    fn test_secret_value_is_trimmed() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, 'E');
        engine.editor.as_mut().unwrap().draft.auth_secret_ref = "api".to_string();
        press_char(&mut engine, ':');
        type_text(&mut engine, "secret  hunter2");
        let action = press_special(&mut engine, keys::RETURN);
        assert_eq!(
            action,
            EngineAction::Spawn(Task::StoreSecret {
                secret_ref: "api".to_string(),
                value: "hunter2".to_string(),
            })
        );
    }

    fn replayed(request: Request) -> TaskOutcome {
        TaskOutcome::Sent(SendReport {
            request,
            response: HttpResponse {
                status_code: 200,
                duration_ms: 5,
                body: String::new(),
                error: String::new(),
            },
            at: "2026-01-01T00:00:00Z".to_string(),
            recorded: Ok(2),
            runs: None,
            replay_of: Some(1),
        })
    }

    #[test]
    fn test_replay_result_returns_to_main_from_history() {
        let mut engine = loaded(&["A", "B"]);
        engine.apply_outcome(TaskOutcome::HistoryLoaded(Ok(vec![run(1, "id1", "B", 200)])));
        assert_eq!(engine.screen, Screen::History(HistoryMode::Normal));
        let b = engine.requests[1].clone();
        engine.apply_outcome(replayed(b));
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));
        assert_eq!(selected_name(&engine).as_deref(), Some("B"));
        assert_eq!(engine.status.text, "Replayed B: 200 (5 ms)");
    }

    #[test]
    fn test_replay_result_leaves_open_editor_alone() {
        let mut engine = loaded(&["A", "B"]);
        engine.apply_outcome(TaskOutcome::HistoryLoaded(Ok(vec![run(1, "id1", "B", 200)])));
        press_char(&mut engine, 'r');
        press_special(&mut engine, keys::ESCAPE);
        press_char(&mut engine, 'E');
        press_char(&mut engine, 'i');
        type_text(&mut engine, "X");
        press_special(&mut engine, keys::RETURN);

        let b = engine.requests[1].clone();
        engine.apply_outcome(replayed(b));
        assert_eq!(engine.screen, Screen::Editor(EditorMode::Normal));
        assert_eq!(engine.editor.as_ref().unwrap().draft.name, "AX");
        assert!(engine.last_response.is_some());
    }

    #[test]
    fn test_late_save_keeps_reopened_editor() {
        let mut engine = loaded(&["A", "B"]);
        press_char(&mut engine, 'E');
        let action = engine.handle_key(&KeyPress::ctrl('s'));
        let EngineAction::Spawn(Task::Save { request, origin }) = action else {
            panic!("expected a save task");
        };
        press_special(&mut engine, keys::ESCAPE);
        press_char(&mut engine, 'j');
        press_char(&mut engine, 'E');
        assert_eq!(engine.editor.as_ref().unwrap().draft.name, "B");

        let requests = engine.requests.clone();
        engine.apply_outcome(TaskOutcome::Saved {
            origin,
            result: Ok((request, requests)),
        });
        assert_eq!(engine.screen, Screen::Editor(EditorMode::Normal));
        assert_eq!(engine.editor.as_ref().unwrap().draft.name, "B");
        assert_eq!(engine.status.text, "Saved A.");
    }

    #[test]
    fn test_column_nudge_needs_visible_split() {
        let mut engine = loaded(&["A"]);
        engine.resize(80, 40);
        let before = engine.ratios.main_vertical;
        press_char(&mut engine, 'L');
        assert_eq!(engine.ratios.main_vertical, before);
        assert_eq!(engine.status.text, "Split hidden below 90 columns.");

        engine.apply_outcome(TaskOutcome::HistoryLoaded(Ok(vec![run(1, "id0", "A", 200)])));
        let before = engine.ratios.history_vertical;
        press_char(&mut engine, 'H');
        assert_eq!(engine.ratios.history_vertical, before);
        assert_eq!(engine.status.text, "Split hidden below 84 columns.");
    }

    #[test]
    fn test_editor_unknown_command_and_quit() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, 'E');
        press_char(&mut engine, ':');
        type_text(&mut engine, "x");
        press_special(&mut engine, keys::RETURN);
        assert_eq!(engine.status.text, "Unknown editor command: x");
        press_char(&mut engine, ':');
        type_text(&mut engine, "q");
        press_special(&mut engine, keys::RETURN);
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));
        assert_eq!(engine.status.text, "Editor cancelled.");
    }

    #[test]
    fn test_editor_draft_body_edit() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, 'E');
        let action = press_char(&mut engine, 'e');
        assert_eq!(
            action,
            EngineAction::EditExternally {
                target: EditTarget::DraftBody,
                text: String::new(),
            }
        );
        engine.finish_external_edit(EditTarget::DraftBody, Ok(Some("[1,2]".to_string())));
        assert_eq!(engine.editor.as_ref().unwrap().draft.body, "[\n  1,\n  2\n]");
        assert_eq!(engine.status.text, "Editor body updated from external editor.");
    }

    #[test]
    fn test_history_navigation_and_replay() {
        let mut engine = loaded(&["A"]);
        engine.apply_outcome(TaskOutcome::HistoryLoaded(Ok(vec![
            run(3, "id0", "A", 500),
            run(2, "id0", "A", 0),
            run(1, "gone", "Old", 200),
        ])));
        press_char(&mut engine, '}');
        assert_eq!(engine.scroll.history_request, 1);
        press_char(&mut engine, 'j');
        assert_eq!(engine.scroll.history_request, 0);
        press_char(&mut engine, 'j');
        let action = press_char(&mut engine, 'r');
        assert_eq!(
            action,
            EngineAction::Spawn(Task::Replay {
                run_id: 1,
                request_id: "gone".to_string()
            })
        );
        engine.apply_outcome(TaskOutcome::ReplayFailed {
            run_id: 1,
            error: None,
        });
        insta::assert_snapshot!(engine.status.text, @"Request no longer exists for run 1.");
        assert_eq!(engine.screen, Screen::History(HistoryMode::Normal));
    }

    #[test]
    fn test_history_search_and_restore() {
        let mut engine = loaded(&["A"]);
        engine.apply_outcome(TaskOutcome::HistoryLoaded(Ok(vec![
            run(2, "id0", "Alpha", 200),
            run(1, "id0", "Beta", 0),
        ])));
        press_char(&mut engine, '/');
        type_text(&mut engine, "err");
        assert_eq!(engine.visible_runs().len(), 1);
        assert_eq!(engine.selected_run().unwrap().id, 1);
        press_special(&mut engine, keys::ESCAPE);
        assert!(engine.history_filter.is_empty());
        assert_eq!(engine.visible_runs().len(), 2);
        press_special(&mut engine, keys::ESCAPE);
        assert_eq!(engine.screen, Screen::Main(MainMode::Normal));
    }

    #[test]
    fn test_history_detail_keys() {
        let mut engine = loaded(&["A"]);
        engine.apply_outcome(TaskOutcome::HistoryLoaded(Ok(Vec::new())));
        let before = engine.ratios.history_detail;
        press_char(&mut engine, 'K');
        assert!(engine.ratios.history_detail > before);
        press_char(&mut engine, 'J');
        press_char(&mut engine, 'J');
        assert!(engine.ratios.history_detail < before);
        press_char(&mut engine, 'L');
        assert_eq!(engine.status.text, "History resize: left=51 cols");
        assert_eq!(press_char(&mut engine, 'r'), EngineAction::None);
        assert_eq!(engine.status.text, "No run selected.");
    }

    #[test]
    fn test_clipboard_paste_into_search() {
        let mut engine = loaded(&["foo bar", "baz"]);
        press_char(&mut engine, '/');
        assert_eq!(engine.handle_key(&KeyPress::ctrl('v')), EngineAction::ReadClipboard);
        engine.paste_clipboard(Ok("foo\nbar".to_string()));
        assert_eq!(engine.search_input, "foo bar");
        assert_eq!(engine.filter, "foo bar");
        assert_eq!(engine.visible_requests().len(), 1);

        engine.paste_clipboard(Ok("\x01".to_string()));
        assert_eq!(
            engine.status.text,
            "Paste failed: clipboard is empty or non-printable."
        );
        assert_eq!(
            engine.handle_key(&KeyPress::ctrl('y')),
            EngineAction::WriteClipboard("foo bar".to_string())
        );
        engine.clipboard_written(Err(anyhow::anyhow!("no display")));
        assert_eq!(engine.status.text, "Copy failed: no display");
    }

    #[test]
    fn test_bracketed_paste_and_clear_line() {
        let mut engine = loaded(&["A"]);
        press_char(&mut engine, ':');
        engine.handle_key(&KeyPress::paste("\x1b[200~export out\x1b[201~"));
        assert_eq!(engine.command_buffer, "export out");
        let mut clear = KeyPress::named(keys::BACKSPACE);
        clear.ctrl = true;
        engine.handle_key(&clear);
        assert!(engine.command_buffer.is_empty());
    }

    #[test]
    fn test_mouse_drag_main_divider() {
        let mut engine = loaded(&["A"]);
        let at = |kind, col, row| MouseInput { kind, col, row };
        engine.handle_mouse(at(MouseKind::Down, 79, 5));
        assert_eq!(engine.drag, Some(Divider::MainVertical));
        assert_eq!(engine.status.text, "Dragging main pane divider...");
        engine.handle_mouse(at(MouseKind::Drag, 60, 5));
        assert_eq!(engine.ratios.main_vertical, 0.5);
        engine.handle_mouse(at(MouseKind::Up, 60, 5));
        assert_eq!(engine.drag, None);
        assert_eq!(engine.status.text, "Resize: left=60 cols response=10 rows");
    }

    #[test]
    fn test_mouse_drag_horizontal_and_miss() {
        let mut engine = loaded(&["A"]);
        engine.handle_mouse(MouseInput {
            kind: MouseKind::Down,
            col: 10,
            row: 10,
        });
        assert_eq!(engine.drag, None);
        engine.handle_mouse(MouseInput {
            kind: MouseKind::Down,
            col: 10,
            row: 27,
        });
        assert_eq!(engine.drag, Some(Divider::MainHorizontal));
        engine.handle_mouse(MouseInput {
            kind: MouseKind::Move,
            col: 10,
            row: 21,
        });
        assert_eq!(main_layout(120, 40, &engine.ratios).rows.bottom_rows, 16);
    }

    #[test]
    fn test_bottom_bar_prefers_status_over_hint() {
        let mut engine = loaded(&["A"]);
        engine.set_error("boom");
        assert_eq!(engine.bottom_bar(), ("boom".to_string(), true));
        engine.set_info(MAIN_IDLE_HINT);
        assert_eq!(engine.bottom_bar(), (MAIN_IDLE_HINT.to_string(), false));
        press_char(&mut engine, 'E');
        engine.set_info(EDITOR_IDLE_HINT);
        assert_eq!(engine.bottom_bar().0, format!("[EDITOR] {EDITOR_IDLE_HINT}"));
    }
}
