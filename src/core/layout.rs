//! Pane geometry: terminal size + split ratios -> concrete cell counts.
//!
//! Screen rows are laid out as one title row, `content_rows` of panes, then
//! the status line and the prompt line. Column 0 is the left edge; a vertical
//! divider occupies exactly one column at index `left`.
//!
//! Ratios are never clamped when stored. Every derivation clamps instead, so
//! a ratio saved on a wide terminal still yields legal panes on a narrow one.

use serde::{Deserialize, Serialize};

use super::mode::Divider;

/// Title bar + status line + prompt line.
pub const CHROME_ROWS: u16 = 3;
pub const MAIN_MIN_TOP_ROWS: i32 = 8;
pub const MAIN_MIN_BOTTOM_ROWS: i32 = 6;
/// Ratio changes smaller than this are ignored while dragging.
pub const RATIO_EPSILON: f64 = 0.0001;
pub const DETAIL_STEP: f64 = 0.04;
pub const DETAIL_MIN: f64 = 0.32;
pub const DETAIL_MAX: f64 = 0.75;

/// Minimum column counts for one left/right split, and the terminal width
/// below which the right-hand companion pane is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLimits {
    pub min_left: u16,
    pub min_right: u16,
    pub companion_min_width: u16,
}

pub const MAIN_LIMITS: PaneLimits = PaneLimits {
    min_left: 20,
    min_right: 12,
    companion_min_width: 90,
};

pub const HISTORY_LIMITS: PaneLimits = PaneLimits {
    min_left: 22,
    min_right: 20,
    companion_min_width: 84,
};

pub const EDITOR_LIMITS: PaneLimits = PaneLimits {
    min_left: 24,
    min_right: 18,
    companion_min_width: 90,
};

// ─── Ratio store ──────────────────────────────────────────────────────────────

/// One fraction per divider, plus the history detail split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    #[serde(default = "default_main_vertical")]
    pub main_vertical: f64,
    #[serde(default = "default_main_horizontal")]
    pub main_horizontal: f64,
    #[serde(default = "default_history_vertical")]
    pub history_vertical: f64,
    #[serde(default = "default_editor_vertical")]
    pub editor_vertical: f64,
    /// Share of the history detail column given to the request snapshot.
    #[serde(default = "default_history_detail")]
    pub history_detail: f64,
}

fn default_main_vertical() -> f64 {
    0.66
}

fn default_main_horizontal() -> f64 {
    0.28
}

fn default_history_vertical() -> f64 {
    0.42
}

fn default_editor_vertical() -> f64 {
    0.5
}

fn default_history_detail() -> f64 {
    0.52
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            main_vertical: default_main_vertical(),
            main_horizontal: default_main_horizontal(),
            history_vertical: default_history_vertical(),
            editor_vertical: default_editor_vertical(),
            history_detail: default_history_detail(),
        }
    }
}

impl SplitRatios {
    pub fn get(&self, divider: Divider) -> f64 {
        match divider {
            Divider::MainVertical => self.main_vertical,
            Divider::MainHorizontal => self.main_horizontal,
            Divider::HistoryVertical => self.history_vertical,
            Divider::EditorVertical => self.editor_vertical,
        }
    }

    /// Store `ratio` for `divider`. Returns false (and stores nothing) when
    /// the change is below [`RATIO_EPSILON`] or the value is not a fraction.
    pub fn set(&mut self, divider: Divider, ratio: f64) -> bool {
        if !ratio.is_finite() || ratio <= 0.0 || ratio >= 1.0 {
            return false;
        }
        let slot = match divider {
            Divider::MainVertical => &mut self.main_vertical,
            Divider::MainHorizontal => &mut self.main_horizontal,
            Divider::HistoryVertical => &mut self.history_vertical,
            Divider::EditorVertical => &mut self.editor_vertical,
        };
        if (*slot - ratio).abs() < RATIO_EPSILON {
            return false;
        }
        *slot = ratio;
        true
    }

    pub fn nudge_history_detail(&mut self, delta: f64) {
        self.history_detail = (self.history_detail + delta).clamp(DETAIL_MIN, DETAIL_MAX);
    }
}

/// Which minimums apply to a vertical divider.
pub fn limits_for(divider: Divider) -> PaneLimits {
    match divider {
        Divider::HistoryVertical => HISTORY_LIMITS,
        Divider::EditorVertical => EDITOR_LIMITS,
        Divider::MainVertical | Divider::MainHorizontal => MAIN_LIMITS,
    }
}

// ─── Columns ──────────────────────────────────────────────────────────────────

/// Lower bound wins when the bounds cross, so minimums beat the ratio.
fn clamp_soft(value: i32, lo: i32, hi: i32) -> i32 {
    value.min(hi).max(lo)
}

fn to_cells(value: i32) -> u16 {
    value.clamp(0, u16::MAX as i32) as u16
}

/// Columns left and right of a one-column divider.
///
/// `left + right + 1 == width` whenever `width >= min_left + min_right + 1`;
/// on narrower terminals both sides keep their minimums.
pub fn split_columns(width: u16, ratio: f64, min_left: u16, min_right: u16) -> (u16, u16) {
    let w = width as i32;
    let (min_l, min_r) = (min_left as i32, min_right as i32);
    let max_left = min_l.max(w - min_r - 1);
    let left = clamp_soft((ratio * w as f64).round() as i32, min_l, max_left);
    let right = min_r.max(w - left - 1);
    (to_cells(left), to_cells(right))
}

/// Inverse of [`split_columns`]: a pointer column becomes the new left width.
pub fn ratio_from_column(col: u16, width: u16, min_left: u16, min_right: u16) -> f64 {
    let w = width as i32;
    let (min_l, min_r) = (min_left as i32, min_right as i32);
    let max_left = min_l.max(w - min_r - 1);
    let left = clamp_soft(col as i32, min_l, max_left);
    left as f64 / w.max(1) as f64
}

/// A left/right split that may have dropped its companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSplit {
    pub left: u16,
    pub right: u16,
    pub show_right: bool,
}

impl ColumnSplit {
    /// Column of the divider, when one is drawn.
    pub fn divider_col(&self) -> Option<u16> {
        self.show_right.then_some(self.left)
    }
}

pub fn columns_for(width: u16, ratio: f64, limits: PaneLimits) -> ColumnSplit {
    if width < limits.companion_min_width {
        return ColumnSplit {
            left: width.max(1),
            right: 0,
            show_right: false,
        };
    }
    let (left, right) = split_columns(width, ratio, limits.min_left, limits.min_right);
    ColumnSplit {
        left,
        right,
        show_right: true,
    }
}

/// Move a vertical divider by `delta` columns and return the new ratio.
pub fn nudge_columns(width: u16, ratio: f64, limits: PaneLimits, delta: i32) -> f64 {
    let (left, _) = split_columns(width, ratio, limits.min_left, limits.min_right);
    let target = (left as i32 + delta).max(0) as u16;
    ratio_from_column(target, width, limits.min_left, limits.min_right)
}

// ─── Rows ─────────────────────────────────────────────────────────────────────

/// Top/bottom allocation of the main screen's pane area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSplit {
    pub content_rows: u16,
    pub top_rows: u16,
    pub bottom_rows: u16,
    pub top_min: u16,
    pub bottom_min: u16,
    pub max_bottom: u16,
}

impl RowSplit {
    /// Absolute screen row of the horizontal divider.
    pub fn divider_row(&self) -> u16 {
        1 + self.top_rows
    }
}

pub fn content_rows(height: u16) -> i32 {
    3.max(height as i32 - CHROME_ROWS as i32)
}

fn row_bounds(content: i32) -> (i32, i32, i32) {
    let top_min = MAIN_MIN_TOP_ROWS.min(1.max(content - MAIN_MIN_BOTTOM_ROWS - 1));
    let bottom_min = MAIN_MIN_BOTTOM_ROWS.min(1.max(content - top_min - 1));
    let max_bottom = bottom_min.max(content - top_min - 1);
    (top_min, bottom_min, max_bottom)
}

pub fn split_rows(height: u16, ratio: f64) -> RowSplit {
    let content = content_rows(height);
    let (top_min, bottom_min, max_bottom) = row_bounds(content);
    let bottom = clamp_soft((ratio * content as f64).round() as i32, bottom_min, max_bottom);
    let top = 1.max(content - bottom - 1);
    RowSplit {
        content_rows: to_cells(content),
        top_rows: to_cells(top),
        bottom_rows: to_cells(bottom),
        top_min: to_cells(top_min),
        bottom_min: to_cells(bottom_min),
        max_bottom: to_cells(max_bottom),
    }
}

/// Inverse of [`split_rows`]: a pointer row becomes the new divider row.
pub fn ratio_from_row(row: u16, height: u16) -> f64 {
    let content = content_rows(height);
    let (_, bottom_min, max_bottom) = row_bounds(content);
    let top = clamp_soft(row as i32 - 1, 1, content);
    let bottom = clamp_soft(content - top - 1, bottom_min, max_bottom);
    bottom as f64 / content as f64
}

/// Grow (positive) or shrink the bottom pane by `delta` rows.
pub fn nudge_rows(height: u16, ratio: f64, delta: i32) -> f64 {
    let split = split_rows(height, ratio);
    let bottom = clamp_soft(
        split.bottom_rows as i32 + delta,
        split.bottom_min as i32,
        split.max_bottom as i32,
    );
    bottom as f64 / split.content_rows.max(1) as f64
}

// ─── Screens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainLayout {
    pub columns: ColumnSplit,
    pub rows: RowSplit,
}

pub fn main_layout(width: u16, height: u16, ratios: &SplitRatios) -> MainLayout {
    MainLayout {
        columns: columns_for(width, ratios.main_vertical, MAIN_LIMITS),
        rows: split_rows(height, ratios.main_horizontal),
    }
}

/// History and editor screens: one left/right split over the full pane area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideLayout {
    pub columns: ColumnSplit,
    pub content_rows: u16,
}

pub fn side_layout(width: u16, height: u16, ratio: f64, limits: PaneLimits) -> SideLayout {
    SideLayout {
        columns: columns_for(width, ratio, limits),
        content_rows: to_cells(content_rows(height)),
    }
}

/// Rows of the two stacked history detail viewers (request over response).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRows {
    pub request_rows: u16,
    pub response_rows: u16,
}

pub fn history_detail_rows(content_rows: u16, ratio: f64) -> DetailRows {
    let available = 5.max(content_rows as i32 - 3);
    let request = clamp_soft(
        (ratio * (available - 1) as f64).round() as i32,
        5,
        5.max(available - 1 - 4),
    );
    let response = 4.max(available - request - 1);
    DetailRows {
        request_rows: to_cells(request),
        response_rows: to_cells(response),
    }
}

/// Which divider, if any, sits under the pointer (one cell of slack).
pub fn hit_test(dividers: ScreenDividers, col: u16, row: u16) -> Option<Divider> {
    let near = |a: u16, b: u16| (a as i32 - b as i32).abs() <= 1;
    match dividers {
        ScreenDividers::Main(layout) => {
            let in_top = row >= 1 && row <= layout.rows.top_rows;
            if let Some(div_col) = layout.columns.divider_col() {
                if in_top && near(col, div_col) {
                    return Some(Divider::MainVertical);
                }
            }
            near(row, layout.rows.divider_row()).then_some(Divider::MainHorizontal)
        }
        ScreenDividers::Side(layout, divider) => {
            let in_content = row >= 1 && row <= layout.content_rows;
            let div_col = layout.columns.divider_col()?;
            (in_content && near(col, div_col)).then_some(divider)
        }
        ScreenDividers::None => None,
    }
}

/// The dividers of whichever screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenDividers {
    Main(MainLayout),
    Side(SideLayout, Divider),
    None,
}
