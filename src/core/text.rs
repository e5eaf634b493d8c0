//! Fixed-width text blocks for scrollable panes.
//!
//! Everything here is character based (not byte based) and never fails:
//! widths and line counts below 1 are treated as 1 so degenerate pane sizes
//! still produce a well-formed block.

/// Hard-wrap `text` into rows of exactly `width` characters.
///
/// Lines are split on `\n` (a trailing `\r` is dropped), then chunked every
/// `width` characters without looking for word boundaries. The last chunk of
/// each line is right-padded with spaces. An empty source line still yields
/// one blank row, so `wrap("", w)` is never empty.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(blank(width));
            continue;
        }
        for chunk in chars.chunks(width) {
            let mut row: String = chunk.iter().collect();
            pad_to(&mut row, chunk.len(), width);
            rows.push(row);
        }
    }
    rows
}

/// Return exactly `max_lines` rows starting at `offset`.
///
/// The offset is clamped into `[0, lines.len() - 1]`. Missing rows are filled
/// with blanks as wide as the first source row.
pub fn window(lines: &[String], offset: usize, max_lines: usize) -> Vec<String> {
    let max_lines = max_lines.max(1);
    let width = lines
        .first()
        .map(|l| l.chars().count())
        .unwrap_or(1)
        .max(1);
    let start = clamp_offset(offset, lines.len());
    let mut out: Vec<String> = lines.iter().skip(start).take(max_lines).cloned().collect();
    while out.len() < max_lines {
        out.push(blank(width));
    }
    out
}

/// Wrap then window in one step; the usual way a pane renders a body.
pub fn body_window(text: &str, width: usize, offset: usize, max_lines: usize) -> Vec<String> {
    window(&wrap(text, width), offset, max_lines)
}

/// Clamp a scroll offset into `[0, len - 1]` (0 for an empty list).
pub fn clamp_offset(offset: usize, len: usize) -> usize {
    offset.min(len.saturating_sub(1))
}

/// Cut `text` to `width` characters, ending in `...` when it had to be cut.
pub fn trim_to(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// [`trim_to`] then pad with spaces to exactly `width` (at least 1).
pub fn fit_to(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out: String = trim_to(text, width).chars().take(width).collect();
    let len = out.chars().count();
    pad_to(&mut out, len, width);
    out
}

/// Chunk a single logical line (newlines are not special) into at most
/// `max_lines` rows of `width`, padding with blank rows.
pub fn wrap_fixed_lines(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let width = width.max(1);
    let max_lines = max_lines.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut rows: Vec<String> = if chars.is_empty() {
        vec![blank(width)]
    } else {
        chars
            .chunks(width)
            .map(|chunk| {
                let mut row: String = chunk.iter().collect();
                pad_to(&mut row, chunk.len(), width);
                row
            })
            .collect()
    };
    rows.truncate(max_lines);
    while rows.len() < max_lines {
        rows.push(blank(width));
    }
    rows
}

/// A `label: value` row whose value wraps under its own column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelValue {
    pub label: String,
    /// Width of the label plus its trailing space.
    pub label_width: usize,
    pub value_width: usize,
    pub value_lines: Vec<String>,
}

impl LabelValue {
    /// Continuation rows are indented by the label width.
    pub fn continuation(&self, idx: usize) -> String {
        let value = self
            .value_lines
            .get(idx)
            .cloned()
            .unwrap_or_else(|| blank(self.value_width));
        format!("{}{}", " ".repeat(self.label_width), value)
    }
}

pub fn wrap_label_value(label: &str, value: &str, total_width: usize, max_lines: usize) -> LabelValue {
    let label_width = label.chars().count() + 1;
    let value_width = total_width.saturating_sub(label_width).max(1);
    LabelValue {
        label: label.to_string(),
        label_width,
        value_width,
        value_lines: wrap_fixed_lines(value, value_width, max_lines),
    }
}

fn blank(width: usize) -> String {
    " ".repeat(width)
}

fn pad_to(s: &mut String, len: usize, width: usize) {
    for _ in len..width {
        s.push(' ');
    }
}
