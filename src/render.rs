//! Terminal-agnostic frame description.
//!
//! [`build_frame`] turns engine state into positioned panes of styled lines.
//! Nothing here touches the terminal: `tui_main` paints the result with
//! ratatui, and the tests inspect it directly.

use crate::core::engine::{Engine, HELP_LINES};
use crate::core::layout::{
    history_detail_rows, main_layout, side_layout, ColumnSplit, EDITOR_LIMITS, HISTORY_LIMITS,
};
use crate::core::mode::{Divider, HistoryMode, Screen};
use crate::core::request::{parse_snapshot, prettify_body, EditorField, RunEntry, EDITOR_FIELDS};
use crate::core::syntax::{is_likely_json, tokenize, TokenKind};
use crate::core::text::{body_window, fit_to, trim_to, wrap_label_value};

// ─── Color ───────────────────────────────────────────────────────────────────

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const fn hex_digit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => panic!("invalid hex digit"),
    }
}

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`. Only used in const context, so a bad literal fails
    /// the build rather than the program.
    pub const fn from_hex(s: &str) -> Self {
        let b = s.as_bytes();
        assert!(b.len() == 7 && b[0] == b'#', "expected #rrggbb");
        Self {
            r: hex_digit(b[1]) * 16 + hex_digit(b[2]),
            g: hex_digit(b[3]) * 16 + hex_digit(b[4]),
            b: hex_digit(b[5]) * 16 + hex_digit(b[6]),
        }
    }
}

// ─── Palette ─────────────────────────────────────────────────────────────────

/// Every colour the UI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    /// List panes.
    pub panel: Color,
    /// Title and bottom bars.
    pub panel_soft: Color,
    pub divider: Color,
    /// Section headings, and a divider while it is dragged.
    pub section: Color,
    pub hint: Color,
    pub ok: Color,
    pub warn: Color,
    pub error: Color,
    pub method_get: Color,
    pub method_post: Color,
    pub method_put: Color,
    pub method_patch: Color,
    pub method_delete: Color,
    pub json_string: Color,
}

impl Palette {
    pub const DEFAULT: Palette = Palette {
        bg: Color::from_hex("#101215"),
        panel: Color::from_hex("#161b22"),
        panel_soft: Color::from_hex("#1f2731"),
        divider: Color::from_hex("#7c6ea8"),
        section: Color::from_hex("#7db2d3"),
        hint: Color::from_hex("#9db3c2"),
        ok: Color::from_hex("#76d6a8"),
        warn: Color::from_hex("#f0c56d"),
        error: Color::from_hex("#ef8d8d"),
        method_get: Color::from_hex("#88d3a8"),
        method_post: Color::from_hex("#f1c76e"),
        method_put: Color::from_hex("#88c6f0"),
        method_patch: Color::from_hex("#cf9bf2"),
        method_delete: Color::from_hex("#f19393"),
        json_string: Color::from_hex("#a8d8b9"),
    };

    pub fn method_color(&self, method: &str) -> Color {
        match method.to_uppercase().as_str() {
            "GET" => self.method_get,
            "POST" => self.method_post,
            "PUT" => self.method_put,
            "PATCH" => self.method_patch,
            "DELETE" => self.method_delete,
            _ => self.hint,
        }
    }

    /// Colour for an HTTP status; anything below 200 uses the hint colour.
    pub fn status_color(&self, code: i64) -> Color {
        match code {
            500.. => self.error,
            400.. => self.warn,
            300.. => self.section,
            200.. => self.ok,
            _ => self.hint,
        }
    }

    pub fn run_color(&self, run: &RunEntry) -> Color {
        if run.is_transport_failure() {
            self.error
        } else {
            self.status_color(run.status_code)
        }
    }

    pub fn token_color(&self, kind: TokenKind) -> Color {
        match kind {
            TokenKind::Delimiter | TokenKind::Key => self.section,
            TokenKind::StringValue => self.json_string,
            TokenKind::Literal | TokenKind::Number => self.warn,
            TokenKind::Plain => self.hint,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─── Styled text ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

/// One row of text made of differently styled pieces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledLine {
    pub spans: Vec<Span>,
}

impl StyledLine {
    pub fn plain(text: impl Into<String>, fg: Color) -> Self {
        Self::default().push(text, fg)
    }

    pub fn push(mut self, text: impl Into<String>, fg: Color) -> Self {
        self.spans.push(Span {
            text: text.into(),
            style: Style { fg, bold: false },
        });
        self
    }

    pub fn push_bold(mut self, text: impl Into<String>, fg: Color) -> Self {
        self.spans.push(Span {
            text: text.into(),
            style: Style { fg, bold: true },
        });
        self
    }

    /// The concatenated text without styling.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

// ─── Frame ───────────────────────────────────────────────────────────────────

/// A rectangle in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Area {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// A filled rectangle whose lines start one column in from its left edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    pub area: Area,
    pub bg: Color,
    pub lines: Vec<StyledLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// A one-cell divider line, drawn in `color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DividerLine {
    pub orientation: Orientation,
    pub area: Area,
    pub color: Color,
}

/// Everything needed to paint one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub title: StyledLine,
    pub panes: Vec<Pane>,
    pub dividers: Vec<DividerLine>,
    pub status_line: StyledLine,
    pub bottom_bar: StyledLine,
}

/// Build the frame for the engine's current screen and terminal size.
pub fn build_frame(engine: &Engine, palette: &Palette) -> Frame {
    let (width, height) = (engine.term_width, engine.term_height);
    let mut frame = Frame {
        width,
        height,
        title: StyledLine::default()
            .push_bold(" tuiman", palette.section)
            .push(format!("  {}", engine.screen.name()), palette.hint),
        panes: Vec::new(),
        dividers: Vec::new(),
        status_line: status_line(engine, palette),
        bottom_bar: bottom_bar(engine, palette, width),
    };
    match engine.screen {
        Screen::Main(_) => build_main(engine, palette, &mut frame),
        Screen::History(mode) => build_history(engine, mode, palette, &mut frame),
        Screen::Editor(_) => build_editor(engine, palette, &mut frame),
        Screen::Help => build_help(engine, palette, &mut frame),
    }
    frame
}

fn status_line(engine: &Engine, palette: &Palette) -> StyledLine {
    let context = match engine.screen {
        Screen::Main(_) => format!(
            "{}/{} request(s)",
            engine.visible_requests().len(),
            engine.requests.len()
        ),
        Screen::History(_) => format!("{}/{} run(s)", engine.visible_runs().len(), engine.runs.len()),
        Screen::Editor(_) => engine
            .editor
            .as_ref()
            .map(|ed| format!("{} | {}", ed.draft.name, ed.current_field().label()))
            .unwrap_or_default(),
        Screen::Help => String::new(),
    };
    StyledLine::default()
        .push_bold(format!(" -- {} -- ", engine.screen.mode_label()), palette.section)
        .push(context, palette.hint)
}

fn bottom_bar(engine: &Engine, palette: &Palette, width: u16) -> StyledLine {
    let (text, is_error) = engine.bottom_bar();
    let fg = if is_error { palette.error } else { palette.hint };
    StyledLine::plain(format!(" {}", fit_to(&text, width.saturating_sub(2) as usize)), fg)
}

// ─── Shared pieces ───────────────────────────────────────────────────────────

fn text_width(pane_width: u16) -> usize {
    (pane_width as usize).saturating_sub(2).max(1)
}

fn divider_color(engine: &Engine, palette: &Palette, divider: Divider) -> Color {
    if engine.drag == Some(divider) {
        palette.section
    } else {
        palette.divider
    }
}

/// First visible index of a list of `len` rows showing `rows` at a time,
/// keeping `selected` near the middle.
fn list_start(len: usize, selected: usize, rows: usize) -> usize {
    let max_start = len.saturating_sub(rows);
    selected.saturating_sub(rows / 2).min(max_start)
}

fn labelled(label: &str, value: &str, width: usize, value_fg: Color, palette: &Palette) -> StyledLine {
    let lv = wrap_label_value(label, value, width, 1);
    StyledLine::default()
        .push_bold(format!("{} ", lv.label), palette.hint)
        .push(lv.value_lines[0].clone(), value_fg)
}

/// A label row plus one continuation row for long values such as URLs.
fn labelled_two(label: &str, value: &str, width: usize, palette: &Palette) -> [StyledLine; 2] {
    let lv = wrap_label_value(label, value, width, 2);
    [
        StyledLine::default()
            .push_bold(format!("{} ", lv.label), palette.hint)
            .push(lv.value_lines[0].clone(), palette.hint),
        StyledLine::plain(lv.continuation(1), palette.hint),
    ]
}

/// Prettify JSON-looking bodies for display; anything else is shown as is.
fn display_body(body: &str) -> String {
    if body.is_empty() {
        return "(empty)".to_string();
    }
    prettify_body(body).unwrap_or_else(|_| body.to_string())
}

/// A scrolled, wrapped body, syntax coloured when it looks like JSON.
fn body_lines(body: &str, width: usize, offset: usize, rows: usize, palette: &Palette) -> Vec<StyledLine> {
    if rows == 0 {
        return Vec::new();
    }
    let display = display_body(body);
    let json = is_likely_json(&display);
    body_window(&display, width, offset, rows)
        .into_iter()
        .map(|row| {
            if !json {
                return StyledLine::plain(row, palette.hint);
            }
            tokenize(&row)
                .into_iter()
                .fold(StyledLine::default(), |line, token| {
                    line.push(token.text, palette.token_color(token.kind))
                })
        })
        .collect()
}

fn remaining(rows: u16, used: usize) -> usize {
    (rows as usize).saturating_sub(used)
}

/// Left pane, divider and right pane of a side-by-side screen.
fn split_areas(columns: ColumnSplit, top: u16, rows: u16) -> (Area, Option<(Area, Area)>) {
    let left = Area {
        x: 0,
        y: top,
        width: columns.left,
        height: rows,
    };
    let right = columns.divider_col().map(|col| {
        (
            Area {
                x: col,
                y: top,
                width: 1,
                height: rows,
            },
            Area {
                x: col + 1,
                y: top,
                width: columns.right,
                height: rows,
            },
        )
    });
    (left, right)
}

// ─── Main screen ─────────────────────────────────────────────────────────────

fn build_main(engine: &Engine, palette: &Palette, frame: &mut Frame) {
    let layout = main_layout(frame.width, frame.height, &engine.ratios);
    let top_rows = layout.rows.top_rows;
    let (list_area, right) = split_areas(layout.columns, 1, top_rows);

    frame.panes.push(Pane {
        area: list_area,
        bg: palette.panel,
        lines: request_list(engine, palette, list_area),
    });
    if let Some((divider, preview_area)) = right {
        frame.dividers.push(DividerLine {
            orientation: Orientation::Vertical,
            area: divider,
            color: divider_color(engine, palette, Divider::MainVertical),
        });
        frame.panes.push(Pane {
            area: preview_area,
            bg: palette.bg,
            lines: request_preview(engine, palette, preview_area),
        });
    }

    let divider_row = layout.rows.divider_row();
    frame.dividers.push(DividerLine {
        orientation: Orientation::Horizontal,
        area: Area {
            x: 0,
            y: divider_row,
            width: frame.width,
            height: 1,
        },
        color: divider_color(engine, palette, Divider::MainHorizontal),
    });
    let response_area = Area {
        x: 0,
        y: divider_row + 1,
        width: frame.width,
        height: layout.rows.bottom_rows,
    };
    frame.panes.push(Pane {
        area: response_area,
        bg: palette.bg,
        lines: response_pane(engine, palette, response_area),
    });
}

fn request_list(engine: &Engine, palette: &Palette, area: Area) -> Vec<StyledLine> {
    let width = text_width(area.width);
    let filter = if engine.filter.is_empty() { "(none)" } else { &engine.filter };
    let mut lines = vec![
        StyledLine::plain("Requests", palette.section),
        StyledLine::plain(fit_to(&format!("Filter: {filter}"), width), palette.hint),
        StyledLine::default(),
    ];
    let visible = engine.visible_requests();
    if visible.is_empty() {
        lines.push(StyledLine::plain(fit_to("No matching requests.", width), palette.warn));
        return lines;
    }
    let rows = remaining(area.height, lines.len()).max(1);
    let start = list_start(visible.len(), engine.selected, rows);
    let name_width = width.saturating_sub(8).max(1);
    for (idx, req) in visible.iter().enumerate().skip(start).take(rows) {
        let active = idx == engine.selected;
        let fg = if active { palette.ok } else { palette.hint };
        lines.push(
            StyledLine::default()
                .push(if active { ">" } else { " " }, fg)
                .push(format!("{:<6}", req.method), palette.method_color(&req.method))
                .push(format!(" {}", fit_to(&req.name, name_width)), fg),
        );
    }
    lines
}

fn request_preview(engine: &Engine, palette: &Palette, area: Area) -> Vec<StyledLine> {
    let width = text_width(area.width);
    let selected = engine.selected_request();
    let or_none = |v: Option<&str>| v.filter(|s| !s.is_empty()).unwrap_or("(none)").to_string();
    let method = or_none(selected.map(|r| r.method.as_str()));
    let method_fg = selected
        .map(|r| palette.method_color(&r.method))
        .unwrap_or(palette.hint);
    let mut lines = vec![
        StyledLine::plain("Request Preview", palette.section),
        StyledLine::default(),
        labelled("name:", &or_none(selected.map(|r| r.name.as_str())), width, palette.hint, palette),
        labelled("method:", &method, width, method_fg, palette),
    ];
    lines.extend(labelled_two("url:", &or_none(selected.map(|r| r.url.as_str())), width, palette));
    lines.push(match selected {
        Some(_) => StyledLine::default(),
        None => StyledLine::plain(fit_to("No request selected.", width), palette.warn),
    });
    lines.push(StyledLine::plain("Body", palette.section));
    if let Some(req) = selected {
        let rows = remaining(area.height, lines.len());
        lines.extend(body_lines(&req.body, width, engine.scroll.request_body, rows, palette));
    }
    lines
}

fn response_pane(engine: &Engine, palette: &Palette, area: Area) -> Vec<StyledLine> {
    let width = text_width(area.width);
    let mut lines = vec![StyledLine::plain("Response", palette.section)];
    let Some(resp) = &engine.last_response else {
        lines.push(StyledLine::plain(
            fit_to("No response yet. Select a request, press Enter, then y.", width),
            palette.hint,
        ));
        return lines;
    };
    let error_fg = if resp.error.is_empty() { palette.hint } else { palette.error };
    let request = format!("{} ({})", resp.request_name, resp.request_id);
    lines.push(labelled("request:", &request, width, palette.hint, palette));
    lines.push(labelled("method:", &resp.method, width, palette.method_color(&resp.method), palette));
    lines.extend(labelled_two("url:", &resp.url, width, palette));
    lines.push(labelled("at:", &resp.at, width, palette.hint, palette));
    lines.push(labelled(
        "status:",
        &resp.status_code.to_string(),
        width,
        palette.status_color(resp.status_code),
        palette,
    ));
    lines.push(labelled("ms:", &resp.duration_ms.to_string(), width, palette.hint, palette));
    lines.push(labelled("error:", &resp.error, width, error_fg, palette));
    lines.push(StyledLine::plain("Body", palette.section));
    let rows = remaining(area.height, lines.len());
    lines.extend(body_lines(&resp.body, width, engine.scroll.response_body, rows, palette));
    lines
}

// ─── History screen ──────────────────────────────────────────────────────────

fn build_history(engine: &Engine, mode: HistoryMode, palette: &Palette, frame: &mut Frame) {
    let layout = side_layout(
        frame.width,
        frame.height,
        engine.ratios.history_vertical,
        HISTORY_LIMITS,
    );
    let (list_area, right) = split_areas(layout.columns, 1, layout.content_rows);
    frame.panes.push(Pane {
        area: list_area,
        bg: palette.panel,
        lines: run_list(engine, mode, palette, list_area),
    });
    if let Some((divider, detail_area)) = right {
        frame.dividers.push(DividerLine {
            orientation: Orientation::Vertical,
            area: divider,
            color: divider_color(engine, palette, Divider::HistoryVertical),
        });
        build_run_detail(engine, palette, detail_area, frame);
    }
}

fn run_list(engine: &Engine, mode: HistoryMode, palette: &Palette, area: Area) -> Vec<StyledLine> {
    let width = text_width(area.width);
    let filter = if engine.history_filter.is_empty() {
        "(none)"
    } else {
        &engine.history_filter
    };
    let label = match mode {
        HistoryMode::Search => "Filter (/):",
        HistoryMode::Normal => "Filter:",
    };
    let mut lines = vec![
        StyledLine::plain("History", palette.section),
        StyledLine::plain(fit_to(&format!("{label} {filter}"), width), palette.hint),
        StyledLine::default(),
    ];
    let visible = engine.visible_runs();
    if visible.is_empty() {
        lines.push(StyledLine::plain(fit_to("No matching history runs.", width), palette.warn));
        return lines;
    }
    let rows = remaining(area.height, lines.len()).max(1);
    let start = list_start(visible.len(), engine.history_selected, rows);
    let name_width = width.saturating_sub(14).max(1);
    for (idx, run) in visible.iter().enumerate().skip(start).take(rows) {
        let active = idx == engine.history_selected;
        let fg = if active { palette.ok } else { palette.hint };
        let name = if run.request_name.is_empty() {
            &run.request_id
        } else {
            &run.request_name
        };
        lines.push(
            StyledLine::default()
                .push(if active { ">" } else { " " }, fg)
                .push(format!("{:<6}", run.method), palette.method_color(&run.method))
                .push(format!(" {}", fit_to(name, name_width)), fg)
                .push(format!(" {}", fit_to(&run.status_label(), 5)), palette.run_color(run)),
        );
    }
    lines
}

fn build_run_detail(engine: &Engine, palette: &Palette, area: Area, frame: &mut Frame) {
    let width = text_width(area.width);
    let heading = vec![StyledLine::plain("Run Detail", palette.section), StyledLine::default()];
    let Some(run) = engine.selected_run() else {
        let mut lines = heading;
        lines.push(StyledLine::plain("No run selected.", palette.warn));
        frame.panes.push(Pane {
            area,
            bg: palette.bg,
            lines,
        });
        return;
    };

    let rows = history_detail_rows(area.height, engine.ratios.history_detail);
    let heading_rows = heading.len() as u16;
    frame.panes.push(Pane {
        area: Area {
            height: heading_rows.min(area.height),
            ..area
        },
        bg: palette.bg,
        lines: heading,
    });

    let request_area = Area {
        y: area.y + heading_rows,
        height: rows.request_rows,
        ..area
    };
    let snapshot = parse_snapshot(&run.request_snapshot);
    let auth_header = format!(
        "{}; {}",
        snapshot.get("auth").filter(|v| !v.is_empty()).unwrap_or("none"),
        snapshot.get("header").filter(|v| !v.is_empty()).unwrap_or("none"),
    );
    let mut request = vec![
        StyledLine::plain("Request", palette.section),
        labelled("run/at:", &format!("#{} {}", run.id, run.created_at), width, palette.hint, palette),
        labelled("name:", &run.request_name, width, palette.hint, palette),
        labelled("method:", &run.method, width, palette.method_color(&run.method), palette),
    ];
    request.extend(labelled_two("url:", &run.url, width, palette));
    request.push(labelled("auth/header:", &auth_header, width, palette.hint, palette));
    request.push(StyledLine::plain("Body", palette.section));
    let body_rows = remaining(request_area.height, request.len());
    request.extend(body_lines(
        &snapshot.body,
        width,
        engine.scroll.history_request,
        body_rows,
        palette,
    ));
    frame.panes.push(Pane {
        area: request_area,
        bg: palette.bg,
        lines: request,
    });

    frame.dividers.push(DividerLine {
        orientation: Orientation::Horizontal,
        area: Area {
            y: request_area.y + request_area.height,
            height: 1,
            ..area
        },
        color: palette.divider,
    });

    let response_area = Area {
        y: request_area.y + request_area.height + 1,
        height: rows.response_rows,
        ..area
    };
    let error_fg = if run.error.is_empty() { palette.hint } else { palette.error };
    let mut response = vec![
        StyledLine::plain("Response", palette.section),
        labelled(
            "request:",
            &format!("{} ({})", run.request_name, run.request_id),
            width,
            palette.hint,
            palette,
        ),
        labelled("method:", &run.method, width, palette.method_color(&run.method), palette),
        labelled("status:", &run.status_label(), width, palette.run_color(run), palette),
        labelled("ms:", &run.duration_ms.to_string(), width, palette.hint, palette),
    ];
    let [error, error_more] = labelled_two("error:", &run.error, width, palette);
    response.push(recolor(error, error_fg));
    response.push(recolor(error_more, error_fg));
    response.push(StyledLine::plain("Body", palette.section));
    let body_rows = remaining(response_area.height, response.len());
    response.extend(body_lines(
        &run.response_body,
        width,
        engine.scroll.history_response,
        body_rows,
        palette,
    ));
    frame.panes.push(Pane {
        area: response_area,
        bg: palette.bg,
        lines: response,
    });
}

fn recolor(mut line: StyledLine, fg: Color) -> StyledLine {
    for span in &mut line.spans {
        span.style.fg = fg;
    }
    line
}

// ─── Editor screen ───────────────────────────────────────────────────────────

fn build_editor(engine: &Engine, palette: &Palette, frame: &mut Frame) {
    let layout = side_layout(
        frame.width,
        frame.height,
        engine.ratios.editor_vertical,
        EDITOR_LIMITS,
    );
    let (fields_area, right) = split_areas(layout.columns, 1, layout.content_rows);
    let width = text_width(fields_area.width);

    let mut lines = vec![StyledLine::plain("Editor", palette.section), StyledLine::default()];
    match &engine.editor {
        Some(ed) => {
            for (idx, field) in EDITOR_FIELDS.iter().enumerate() {
                let active = idx == ed.field;
                let prefix = format!("{}{}: ", if active { "> " } else { "  " }, field.label());
                let value = ed.draft.field(*field);
                let value_fg = if *field == EditorField::Method {
                    palette.method_color(value)
                } else if active {
                    palette.ok
                } else {
                    palette.hint
                };
                let value_width = width.saturating_sub(prefix.chars().count()).max(1);
                let shown = if value.is_empty() { "(empty)" } else { value };
                lines.push(
                    StyledLine::default()
                        .push(prefix, if active { palette.ok } else { palette.section })
                        .push(fit_to(shown, value_width), value_fg),
                );
            }
        }
        None => lines.push(StyledLine::plain("No draft.", palette.warn)),
    }
    frame.panes.push(Pane {
        area: fields_area,
        bg: palette.panel,
        lines,
    });

    let (Some((divider, preview_area)), Some(ed)) = (right, &engine.editor) else {
        return;
    };
    frame.dividers.push(DividerLine {
        orientation: Orientation::Vertical,
        area: divider,
        color: divider_color(engine, palette, Divider::EditorVertical),
    });
    let width = text_width(preview_area.width);
    let or_empty = |s: &str| if s.is_empty() { "(empty)".to_string() } else { s.to_string() };
    let mut lines = vec![
        StyledLine::plain("Preview", palette.section),
        StyledLine::default(),
        StyledLine::plain(fit_to(&format!("name: {}", or_empty(&ed.draft.name)), width), palette.hint),
        StyledLine::plain(
            fit_to(&format!("method: {}", ed.draft.method), width),
            palette.method_color(&ed.draft.method),
        ),
        StyledLine::plain(fit_to(&format!("url: {}", or_empty(&ed.draft.url)), width), palette.hint),
        StyledLine::plain("Body", palette.section),
    ];
    let body_rows = remaining(preview_area.height, lines.len() + 1);
    lines.extend(body_lines(&ed.draft.body, width, ed.body_scroll, body_rows, palette));
    lines.push(StyledLine::plain(
        fit_to(&format!("Field: {}", ed.current_field().label()), width),
        palette.hint,
    ));
    frame.panes.push(Pane {
        area: preview_area,
        bg: palette.bg,
        lines,
    });
}

// ─── Help screen ─────────────────────────────────────────────────────────────

fn build_help(_engine: &Engine, palette: &Palette, frame: &mut Frame) {
    let width = (frame.width as usize).saturating_sub(4).max(24);
    let mut lines = vec![StyledLine::plain("Help", palette.section), StyledLine::default()];
    lines.extend(
        HELP_LINES
            .iter()
            .map(|line| StyledLine::plain(trim_to(line, width), palette.hint)),
    );
    frame.panes.push(Pane {
        area: Area {
            x: 0,
            y: 1,
            width: frame.width,
            height: frame.height.saturating_sub(3),
        },
        bg: palette.bg,
        lines,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::KeyPress;
    use crate::core::mode::MainMode;
    use crate::core::request::{HttpResponse, Request, ResponsePreview};

    fn engine_with(requests: Vec<Request>) -> Engine {
        let mut engine = Engine::new();
        engine.resize(120, 40);
        engine.requests = requests;
        engine
    }

    fn req(id: &str, name: &str, method: &str) -> Request {
        Request {
            id: id.to_string(),
            name: name.to_string(),
            method: method.to_string(),
            url: format!("http://{id}.test"),
            ..Request::default()
        }
    }

    fn pane_text(pane: &Pane) -> Vec<String> {
        pane.lines.iter().map(|l| l.text().trim_end().to_string()).collect()
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#7db2d3"), Color::from_rgb(0x7d, 0xb2, 0xd3));
        assert_eq!(Color::from_hex("#FFFFFF"), Color::from_rgb(255, 255, 255));
    }

    #[test]
    fn test_status_colors() {
        let p = Palette::DEFAULT;
        assert_eq!(p.status_color(503), p.error);
        assert_eq!(p.status_color(404), p.warn);
        assert_eq!(p.status_color(301), p.section);
        assert_eq!(p.status_color(200), p.ok);
        assert_eq!(p.status_color(101), p.hint);
        let failed = RunEntry {
            status_code: 0,
            ..RunEntry::default()
        };
        assert_eq!(p.run_color(&failed), p.error);
        assert_eq!(p.method_color("patch"), p.method_patch);
        assert_eq!(p.method_color("OPTIONS"), p.hint);
    }

    #[test]
    fn test_main_frame_geometry() {
        let engine = engine_with(vec![req("a", "Alpha", "GET")]);
        let frame = build_frame(&engine, &Palette::DEFAULT);
        assert_eq!(frame.panes.len(), 3);
        let (list, preview, response) = (&frame.panes[0], &frame.panes[1], &frame.panes[2]);
        assert_eq!(list.area.width + 1 + preview.area.width, 120);
        assert_eq!(frame.dividers[0].area.x, list.area.width);
        assert_eq!(response.area.y, frame.dividers[1].area.y + 1);
        assert_eq!(response.area.y + response.area.height, 38);
    }

    #[test]
    fn test_narrow_main_drops_preview() {
        let mut engine = engine_with(vec![req("a", "Alpha", "GET")]);
        engine.resize(80, 30);
        let frame = build_frame(&engine, &Palette::DEFAULT);
        assert_eq!(frame.panes.len(), 2);
        assert_eq!(frame.panes[0].area.width, 80);
        assert_eq!(frame.dividers.len(), 1);
        assert_eq!(frame.dividers[0].orientation, Orientation::Horizontal);
    }

    #[test]
    fn test_request_list_rows() {
        let engine = engine_with(vec![req("a", "Alpha", "GET"), req("b", "Beta", "DELETE")]);
        let frame = build_frame(&engine, &Palette::DEFAULT);
        let text = pane_text(&frame.panes[0]);
        assert_eq!(text[0], "Requests");
        assert_eq!(text[1], "Filter: (none)");
        assert_eq!(text[3], ">GET    Alpha");
        assert_eq!(text[4], " DELETE Beta");
        let row = &frame.panes[0].lines[4];
        assert_eq!(row.spans[1].style.fg, Palette::DEFAULT.method_delete);
    }

    #[test]
    fn test_empty_states() {
        let engine = engine_with(Vec::new());
        let frame = build_frame(&engine, &Palette::DEFAULT);
        assert_eq!(pane_text(&frame.panes[0])[3], "No matching requests.");
        assert!(pane_text(&frame.panes[1]).contains(&"No request selected.".to_string()));
        insta::assert_snapshot!(pane_text(&frame.panes[2]).join("\n"), @r"
        Response
        No response yet. Select a request, press Enter, then y.
        ");
    }

    #[test]
    fn test_preview_body_is_prettified_and_coloured() {
        let mut with_body = req("a", "Alpha", "POST");
        with_body.body = r#"{"ok":true}"#.to_string();
        let engine = engine_with(vec![with_body]);
        let frame = build_frame(&engine, &Palette::DEFAULT);
        let preview = &frame.panes[1];
        let text = pane_text(preview);
        let body_at = text.iter().position(|l| l == "Body").unwrap();
        assert_eq!(text[body_at + 1], "{");
        assert_eq!(text[body_at + 2], "  \"ok\": true");
        let key_line = &preview.lines[body_at + 2];
        let key = key_line.spans.iter().find(|s| s.text == "\"ok\"").unwrap();
        assert_eq!(key.style.fg, Palette::DEFAULT.section);
    }

    #[test]
    fn test_response_pane_fields() {
        let mut engine = engine_with(vec![req("a", "Alpha", "GET")]);
        engine.resize(120, 60);
        let response = HttpResponse {
            status_code: 404,
            duration_ms: 9,
            body: "nope".to_string(),
            error: "HTTP status 404".to_string(),
        };
        engine.last_response = Some(ResponsePreview::new(
            &engine.requests[0].clone(),
            &response,
            "2026-01-01T00:00:00Z".to_string(),
        ));
        let frame = build_frame(&engine, &Palette::DEFAULT);
        let pane = &frame.panes[2];
        let text = pane_text(pane);
        assert_eq!(text[1], "request: Alpha (a)");
        assert_eq!(text[5], "at: 2026-01-01T00:00:00Z");
        assert_eq!(text[6], "status: 404");
        assert_eq!(pane.lines[6].spans[1].style.fg, Palette::DEFAULT.warn);
        assert_eq!(pane.lines[8].spans[1].style.fg, Palette::DEFAULT.error);
        assert_eq!(text[10], "nope");
    }

    #[test]
    fn test_history_frame() {
        let mut engine = engine_with(Vec::new());
        engine.runs = vec![
            RunEntry {
                id: 2,
                request_id: "a".to_string(),
                request_name: "Alpha".to_string(),
                method: "GET".to_string(),
                url: "http://a.test".to_string(),
                status_code: 0,
                error: "connection refused".to_string(),
                request_snapshot: req("a", "Alpha", "GET").snapshot(),
                ..RunEntry::default()
            },
            RunEntry {
                id: 1,
                request_name: "Alpha".to_string(),
                method: "GET".to_string(),
                status_code: 200,
                ..RunEntry::default()
            },
        ];
        engine.screen = Screen::History(HistoryMode::Normal);
        let frame = build_frame(&engine, &Palette::DEFAULT);
        let list = pane_text(&frame.panes[0]);
        assert!(list[3].starts_with(">GET    Alpha"));
        assert!(list[3].ends_with("ERR"));
        assert!(list[4].ends_with("[200]"));

        let request = pane_text(&frame.panes[2]);
        assert_eq!(request[1], "run/at: #2");
        assert_eq!(request[6], "auth/header: none; none");
        let response = &frame.panes[3];
        let error_row = response.lines.iter().find(|l| l.text().starts_with("error:")).unwrap();
        assert!(error_row.spans.iter().all(|s| s.style.fg == Palette::DEFAULT.error));
    }

    #[test]
    fn test_editor_frame() {
        let mut engine = engine_with(Vec::new());
        engine.open_editor(req("a", "Alpha", "PUT"), 2);
        let frame = build_frame(&engine, &Palette::DEFAULT);
        let fields = pane_text(&frame.panes[0]);
        assert_eq!(fields[2], "  Name: Alpha");
        assert_eq!(fields[4], "> URL: http://a.test");
        assert_eq!(fields[5], "  Header Key: (empty)");
        assert_eq!(
            frame.panes[0].lines[3].spans[1].style.fg,
            Palette::DEFAULT.method_put
        );
        let preview = pane_text(&frame.panes[1]);
        assert_eq!(preview.last().map(String::as_str), Some("Field: URL"));
        assert!(frame.status_line.text().contains("Alpha | URL"));
    }

    #[test]
    fn test_help_and_bars() {
        let mut engine = engine_with(Vec::new());
        engine.execute_command("help");
        let frame = build_frame(&engine, &Palette::DEFAULT);
        assert_eq!(pane_text(&frame.panes[0])[0], "Help");
        assert_eq!(frame.title.text(), " tuiman  HELP");
        assert_eq!(frame.bottom_bar.text().trim(), "Help screen opened.");

        engine.handle_key(&KeyPress::named("Escape"));
        engine.handle_key(&KeyPress::char(':'));
        assert_eq!(engine.screen, Screen::Main(MainMode::Command));
        let frame = build_frame(&engine, &Palette::DEFAULT);
        assert_eq!(frame.bottom_bar.text().trim(), ":");
        assert!(frame.status_line.text().starts_with(" -- COMMAND -- "));
    }

    #[test]
    fn test_dragged_divider_highlight() {
        let mut engine = engine_with(vec![req("a", "Alpha", "GET")]);
        engine.drag = Some(Divider::MainHorizontal);
        let frame = build_frame(&engine, &Palette::DEFAULT);
        assert_eq!(frame.dividers[0].color, Palette::DEFAULT.divider);
        assert_eq!(frame.dividers[1].color, Palette::DEFAULT.section);
    }

    #[test]
    fn test_list_start_centres_selection() {
        assert_eq!(list_start(3, 2, 10), 0);
        assert_eq!(list_start(100, 50, 10), 45);
        assert_eq!(list_start(100, 99, 10), 90);
    }
}
