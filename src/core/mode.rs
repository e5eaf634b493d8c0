/// Modes of the request list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainMode {
    Normal,
    /// Live filter input; the char is the prompt (`/` or `?`).
    Search(char),
    Command,
    /// y / e / a / n menu on the selected request.
    Action,
    DeleteConfirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Normal,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Normal,
    Insert,
    Command,
}

/// The active screen, carrying that screen's mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Main(MainMode),
    History(HistoryMode),
    Editor(EditorMode),
    Help,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Main(_) => "MAIN",
            Screen::History(_) => "HISTORY",
            Screen::Editor(_) => "EDITOR",
            Screen::Help => "HELP",
        }
    }

    /// Label for the title bar.
    pub fn mode_label(&self) -> &'static str {
        match self {
            Screen::Main(MainMode::Normal)
            | Screen::History(HistoryMode::Normal)
            | Screen::Editor(EditorMode::Normal) => "NORMAL",
            Screen::Main(MainMode::Search(_)) | Screen::History(HistoryMode::Search) => "SEARCH",
            Screen::Main(MainMode::Command) | Screen::Editor(EditorMode::Command) => "COMMAND",
            Screen::Main(MainMode::Action) => "ACTION",
            Screen::Main(MainMode::DeleteConfirm) => "DELETE",
            Screen::Editor(EditorMode::Insert) => "INSERT",
            Screen::Help => "HELP",
        }
    }
}

/// A draggable pane divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Divider {
    MainVertical,
    MainHorizontal,
    HistoryVertical,
    EditorVertical,
}
