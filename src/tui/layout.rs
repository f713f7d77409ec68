//! Fixed three-panel layout: function list on the left, logs top-right,
//! configuration bottom-right, one status row at the bottom.

#![allow(missing_docs)]

/// Terminal size below which only a "too small" notice is drawn.
pub const MIN_USABLE_COLS: u16 = 40;
pub const MIN_USABLE_ROWS: u16 = 8;

/// Rows taken by a panel title.
pub const PANEL_TITLE_ROWS: u16 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rows available below the panel title.
    #[must_use]
    pub const fn content_height(self) -> u16 {
        self.height.saturating_sub(PANEL_TITLE_ROWS)
    }

    #[must_use]
    pub const fn contains_row(self, row: u16) -> bool {
        row >= self.y && row < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub entities: Rect,
    /// One-column divider between the list and the right-hand panels.
    pub divider: Rect,
    pub logs: Rect,
    pub metadata: Rect,
    pub status: Rect,
}

#[must_use]
pub const fn is_terminal_too_small(cols: u16, rows: u16) -> bool {
    cols < MIN_USABLE_COLS || rows < MIN_USABLE_ROWS
}

/// Compute panel rectangles for a `cols` x `rows` terminal.
///
/// The list keeps its configured width and the metadata panel its configured
/// height as long as the logs panel retains at least a title and one row;
/// beyond that both shrink.
#[must_use]
pub fn build_layout(cols: u16, rows: u16, side_width: u16, metadata_rows: u16) -> DashboardLayout {
    let body_rows = rows.saturating_sub(1);
    let side = side_width.min(cols.saturating_sub(2) / 2).max(1);
    let right_x = side + 1;
    let right_width = cols.saturating_sub(right_x);
    let meta = metadata_rows.min(body_rows.saturating_sub(PANEL_TITLE_ROWS + 1));
    let logs_height = body_rows.saturating_sub(meta);

    DashboardLayout {
        entities: Rect::new(0, 0, side, body_rows),
        divider: Rect::new(side, 0, 1, body_rows),
        logs: Rect::new(right_x, 0, right_width, logs_height),
        metadata: Rect::new(right_x, logs_height, right_width, meta),
        status: Rect::new(0, body_rows, cols, 1),
    }
}
