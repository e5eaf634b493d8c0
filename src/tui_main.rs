//! Terminal front end.
//!
//! Owns the terminal: sets up raw mode and the alternate screen, feeds
//! crossterm events to the engine, performs the engine's actions, and paints
//! the `render::Frame` built from engine state with ratatui.
//!
//! **No engine logic here.** Key meaning lives in `core`, frame contents in
//! `render`.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{
    self as ct_event, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
    EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color as RColor, Modifier};
use ratatui::Terminal;

use crate::core::engine::{EngineAction, MouseInput, MouseKind};
use crate::core::input::{keys, KeyPress};
use crate::core::paths::AppPaths;
use crate::core::session::SessionState;
use crate::core::settings::Settings;
use crate::core::task::Task;
use crate::core::Engine;
use crate::render::{self, build_frame, Color, Orientation, Palette, StyledLine};
use crate::services::clipboard::SystemClipboard;
use crate::services::{editor, Services, TaskRunner};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Everything the event loop drives besides the terminal itself.
struct App {
    engine: Engine,
    runner: TaskRunner,
    clipboard: SystemClipboard,
    settings: Settings,
    palette: Palette,
}

/// Build the services, set up the terminal, run the event loop, and restore
/// the terminal and save the session on exit.
pub fn run(paths: &AppPaths, settings: Settings) -> Result<()> {
    let services = Services::production(paths, &settings)?;
    let session_file = paths.session_file();
    let mut app = App {
        engine: Engine::with_session(SessionState::load(&session_file)),
        runner: TaskRunner::new(services),
        clipboard: SystemClipboard::new(),
        settings,
        palette: Palette::DEFAULT,
    };
    app.runner.dispatch(Task::Bootstrap);

    let mut terminal = enter_terminal(app.settings.mouse)?;
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        event_loop(&mut terminal, &mut app)
    }));
    restore_terminal(&mut terminal, app.settings.mouse);

    if let Err(e) = app.engine.session_state().save(&session_file) {
        tracing::warn!("failed to save session: {}", e);
    }
    match result {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

fn enter_terminal(mouse: bool) -> Result<Term> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("enter alternate screen")?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term, mouse: bool) {
    let _ = disable_raw_mode();
    if mouse {
        let _ = execute!(terminal.backend_mut(), DisableMouseCapture);
    }
    let _ = execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    );
    let _ = terminal.show_cursor();
}

// ─── Event loop ───────────────────────────────────────────────────────────────

fn event_loop(terminal: &mut Term, app: &mut App) -> Result<()> {
    loop {
        let size = terminal.size()?;
        app.engine.resize(size.width, size.height);

        // Finished tasks are applied once per frame (~20 ms latency).
        for outcome in app.runner.poll_outcomes() {
            app.engine.apply_outcome(outcome);
        }

        let frame = build_frame(&app.engine, &app.palette);
        terminal.draw(|f| draw_frame(f, &frame, &app.palette))?;

        if !ct_event::poll(Duration::from_millis(20))? {
            continue;
        }
        let quit = match ct_event::read()? {
            Event::Key(key_event) => match translate_key(key_event) {
                Some(key) => {
                    let action = app.engine.handle_key(&key);
                    handle_action(terminal, app, action)?
                }
                None => false,
            },
            Event::Paste(text) => {
                let action = app.engine.handle_key(&KeyPress::paste(&text));
                handle_action(terminal, app, action)?
            }
            Event::Mouse(mut mouse_event) => {
                // Coalesce consecutive drag events to avoid render-per-cell lag
                if matches!(mouse_event.kind, MouseEventKind::Drag(_)) {
                    while ct_event::poll(Duration::ZERO).unwrap_or(false) {
                        match ct_event::read() {
                            Ok(Event::Mouse(next)) if matches!(next.kind, MouseEventKind::Drag(_)) => {
                                mouse_event = next;
                            }
                            Ok(Event::Mouse(next)) => {
                                // Apply the coalesced drag first, then the new event
                                if let Some(input) = translate_mouse(mouse_event) {
                                    app.engine.handle_mouse(input);
                                }
                                mouse_event = next;
                                break;
                            }
                            _ => break,
                        }
                    }
                }
                if let Some(input) = translate_mouse(mouse_event) {
                    app.engine.handle_mouse(input);
                }
                false
            }
            Event::Resize(width, height) => {
                app.engine.resize(width, height);
                false
            }
            _ => false,
        };
        if quit {
            tracing::info!("quit requested");
            return Ok(());
        }
    }
}

// ─── Engine action handling ───────────────────────────────────────────────────

/// Perform `action`; returns true when the app should exit.
fn handle_action(terminal: &mut Term, app: &mut App, action: EngineAction) -> Result<bool> {
    let mut action = action;
    loop {
        action = match action {
            EngineAction::None => return Ok(false),
            EngineAction::Quit => return Ok(true),
            EngineAction::Spawn(task) => {
                app.runner.dispatch(task);
                return Ok(false);
            }
            EngineAction::ReadClipboard => {
                let clip = app.clipboard.read();
                app.engine.paste_clipboard(clip);
                return Ok(false);
            }
            EngineAction::WriteClipboard(text) => {
                let written = app.clipboard.write(text);
                app.engine.clipboard_written(written);
                return Ok(false);
            }
            EngineAction::EditExternally { target, text } => {
                let command = app.settings.editor_command();
                suspend_terminal(terminal, app.settings.mouse)?;
                let edited = editor::edit_text(&command, &text);
                resume_terminal(terminal, app.settings.mouse)?;
                // Saving the edited body may need a task of its own.
                app.engine.finish_external_edit(target, edited)
            }
        };
    }
}

/// Hand the terminal to a child process.
fn suspend_terminal(terminal: &mut Term, mouse: bool) -> Result<()> {
    if mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    disable_raw_mode()?;
    terminal.show_cursor()?;
    Ok(())
}

fn resume_terminal(terminal: &mut Term, mouse: bool) -> Result<()> {
    enable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        EnterAlternateScreen,
        EnableBracketedPaste
    )?;
    if mouse {
        execute!(terminal.backend_mut(), EnableMouseCapture)?;
    }
    terminal.clear()?;
    Ok(())
}

// ─── Frame rendering ──────────────────────────────────────────────────────────

fn draw_frame(f: &mut ratatui::Frame, frame: &render::Frame, palette: &Palette) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    let (title_area, content_area, status_area, bottom_area) =
        (chunks[0], chunks[1], chunks[2], chunks[3]);
    let buf = f.buffer_mut();

    fill(buf, content_area, rc(palette.bg));
    render_bar(buf, title_area, &frame.title, rc(palette.panel_soft));

    for pane in &frame.panes {
        let pane_area = Rect::new(pane.area.x, pane.area.y, pane.area.width, pane.area.height)
            .intersection(content_area);
        let bg = rc(pane.bg);
        fill(buf, pane_area, bg);
        // One column of padding on each side.
        let text_width = pane_area.width.saturating_sub(2);
        for (row, line) in pane.lines.iter().take(pane_area.height as usize).enumerate() {
            let text_area = Rect::new(pane_area.x + 1, pane_area.y + row as u16, text_width, 1);
            render_line(buf, text_area, line, bg);
        }
    }

    for divider in &frame.dividers {
        let d = Rect::new(
            divider.area.x,
            divider.area.y,
            divider.area.width,
            divider.area.height,
        )
        .intersection(content_area);
        let ch = match divider.orientation {
            Orientation::Vertical => '│',
            Orientation::Horizontal => '─',
        };
        for y in d.y..d.y + d.height {
            for x in d.x..d.x + d.width {
                set_cell(buf, x, y, ch, rc(divider.color), rc(palette.bg));
            }
        }
    }

    render_bar(buf, status_area, &frame.status_line, rc(palette.panel_soft));
    render_bar(buf, bottom_area, &frame.bottom_bar, rc(palette.panel_soft));
}

fn fill(buf: &mut ratatui::buffer::Buffer, area: Rect, bg: RColor) {
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            set_cell(buf, x, y, ' ', bg, bg);
        }
    }
}

fn render_bar(buf: &mut ratatui::buffer::Buffer, area: Rect, line: &StyledLine, bg: RColor) {
    fill(buf, area, bg);
    render_line(buf, area, line, bg);
}

/// Paint `line` into the single-row `area`, clipping at its right edge.
fn render_line(buf: &mut ratatui::buffer::Buffer, area: Rect, line: &StyledLine, bg: RColor) {
    let end = area.x + area.width;
    let mut x = area.x;
    for span in &line.spans {
        let modifier = if span.style.bold {
            Modifier::BOLD
        } else {
            Modifier::empty()
        };
        for ch in span.text.chars() {
            if x >= end {
                return;
            }
            set_cell_styled(buf, x, area.y, ch, rc(span.style.fg), bg, modifier);
            x += 1;
        }
    }
}

fn set_cell(buf: &mut ratatui::buffer::Buffer, x: u16, y: u16, ch: char, fg: RColor, bg: RColor) {
    set_cell_styled(buf, x, y, ch, fg, bg, Modifier::empty());
}

fn set_cell_styled(
    buf: &mut ratatui::buffer::Buffer,
    x: u16,
    y: u16,
    ch: char,
    fg: RColor,
    bg: RColor,
    modifier: Modifier,
) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch).set_fg(fg).set_bg(bg);
        cell.modifier = modifier;
    }
}

// ─── Input translation ────────────────────────────────────────────────────────

fn translate_key(event: KeyEvent) -> Option<KeyPress> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);
    let named = |name: &str| KeyPress {
        key_name: name.to_string(),
        ctrl,
        meta: alt,
        shift,
        ..KeyPress::default()
    };
    let key = match event.code {
        KeyCode::Char(c) if ctrl => {
            let lower = c.to_ascii_lowercase();
            // Keep the control byte too: Ctrl+H is how many terminals send
            // Ctrl+Backspace.
            let sequence = if lower.is_ascii_alphabetic() {
                ((lower as u8) & 0x1f) as char
            } else {
                lower
            };
            KeyPress {
                key_name: lower.to_string(),
                sequence: sequence.to_string(),
                ctrl,
                meta: alt,
                shift,
                option: false,
            }
        }
        KeyCode::Char(c) => KeyPress {
            sequence: c.to_string(),
            meta: alt,
            shift: shift || c.is_uppercase(),
            ..KeyPress::default()
        },
        KeyCode::Esc => named(keys::ESCAPE),
        KeyCode::Enter => named(keys::RETURN),
        KeyCode::Backspace => named(keys::BACKSPACE),
        KeyCode::Delete => named(keys::DELETE),
        KeyCode::Tab => named(keys::TAB),
        KeyCode::Up => named(keys::UP),
        KeyCode::Down => named(keys::DOWN),
        KeyCode::Left => named(keys::LEFT),
        KeyCode::Right => named(keys::RIGHT),
        _ => return None,
    };
    Some(key)
}

fn translate_mouse(event: MouseEvent) -> Option<MouseInput> {
    let kind = match event.kind {
        MouseEventKind::Down(MouseButton::Left) => MouseKind::Down,
        MouseEventKind::Drag(MouseButton::Left) => MouseKind::Drag,
        MouseEventKind::Moved => MouseKind::Move,
        MouseEventKind::Up(_) => MouseKind::Up,
        _ => return None,
    };
    Some(MouseInput {
        kind,
        col: event.column,
        row: event.row,
    })
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Convert a `render::Color` to a ratatui `Color::Rgb`.
#[inline]
fn rc(c: Color) -> RColor {
    RColor::Rgb(c.r, c.g, c.b)
}
