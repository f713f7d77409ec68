//! Scroll position and live-tail state for a bounded line buffer.
//!
//! The same controller drives both the log panel (autoscroll on) and the
//! function list (autoscroll off, cursor navigation). It tracks only line
//! counts; the buffer itself lives with the panel that owns it.
//!
//! Invariants after every operation:
//! - `0 <= origin <= max(0, total_lines - visible_height)`
//! - `0 <= cursor < total_lines`, or `cursor == 0` when the buffer is empty
//! - with autoscroll on, the last line is visible after any append

#![allow(missing_docs)]

use std::ops::Range;

/// Snapshot of viewport position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    /// Index of the first visible line.
    pub origin: usize,
    /// Index of the highlighted line.
    pub cursor: usize,
    /// Follow new content as it arrives.
    pub autoscroll: bool,
}

impl ViewportState {
    /// State at the start of a refresh cycle.
    pub const INITIAL: Self = Self {
        origin: 0,
        cursor: 0,
        autoscroll: true,
    };
}

/// What a user scroll request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Moved within the buffer; live-tail is paused.
    Moved,
    /// Hit the end; live-tail re-engaged and the view pinned to the bottom.
    FollowingTail,
    /// Zero-length request.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportController {
    state: ViewportState,
    total_lines: usize,
    visible_height: usize,
}

impl ViewportController {
    /// Controller in the reset state (autoscroll on).
    #[must_use]
    pub fn new(visible_height: usize) -> Self {
        Self {
            state: ViewportState::INITIAL,
            total_lines: 0,
            visible_height: visible_height.max(1),
        }
    }

    /// Controller for a navigation list that never follows appended content.
    #[must_use]
    pub fn without_autoscroll(visible_height: usize) -> Self {
        let mut viewport = Self::new(visible_height);
        viewport.state.autoscroll = false;
        viewport
    }

    #[must_use]
    pub const fn state(&self) -> ViewportState {
        self.state
    }

    #[must_use]
    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    #[must_use]
    pub const fn visible_height(&self) -> usize {
        self.visible_height
    }

    /// Largest valid origin for the current buffer and height.
    #[must_use]
    pub const fn max_origin(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_height)
    }

    /// Buffer indices currently on screen.
    #[must_use]
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.state.origin + self.visible_height).min(self.total_lines);
        self.state.origin..end
    }

    /// Back to origin 0, cursor 0, autoscroll on, over an empty buffer.
    pub fn reset(&mut self) {
        self.state = ViewportState::INITIAL;
        self.total_lines = 0;
    }

    /// `n` lines were appended to the buffer.
    pub fn append(&mut self, n: usize) {
        self.total_lines = self.total_lines.saturating_add(n);
        if self.state.autoscroll {
            self.state.origin = self.max_origin();
        }
        self.clamp();
    }

    /// The buffer was replaced wholesale with `total` lines.
    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        if self.state.autoscroll {
            self.state.origin = self.max_origin();
        }
        self.clamp();
    }

    /// The panel was resized.
    pub fn set_visible_height(&mut self, height: usize) {
        self.visible_height = height.max(1);
        if self.state.autoscroll {
            self.state.origin = self.max_origin();
        }
        self.clamp();
    }

    /// User scroll by `delta` lines (negative is up).
    ///
    /// Scrolling forward into the last page re-engages autoscroll instead of
    /// moving; any other scroll pauses it.
    pub fn scroll_by(&mut self, delta: isize) -> ScrollOutcome {
        if delta == 0 {
            return ScrollOutcome::Unchanged;
        }
        let max_origin = to_signed(self.max_origin());
        let target = to_signed(self.state.origin).saturating_add(delta);

        if delta > 0 && target > max_origin - 1 {
            self.follow_tail();
            return ScrollOutcome::FollowingTail;
        }

        self.state.autoscroll = false;
        self.state.origin = clamp_index(target, self.max_origin());
        let cursor = to_signed(self.state.cursor).saturating_add(delta);
        self.state.cursor = clamp_index(cursor, self.last_line());
        self.clamp();
        ScrollOutcome::Moved
    }

    /// Pin the view to the bottom and follow new content.
    pub fn follow_tail(&mut self) {
        self.state.autoscroll = true;
        self.state.origin = self.max_origin();
        self.clamp();
    }

    /// Move the cursor by `delta`, dragging the origin along when the cursor
    /// would leave the visible window. Leaving the last page pauses autoscroll.
    pub fn cursor_move(&mut self, delta: isize) {
        if self.total_lines == 0 {
            return;
        }
        let target = to_signed(self.state.cursor).saturating_add(delta);
        self.state.cursor = clamp_index(target, self.last_line());
        self.reveal_cursor();
        if self.state.origin < self.max_origin() {
            self.state.autoscroll = false;
        }
    }

    /// Move the origin the least distance that puts the cursor on screen.
    pub fn reveal_cursor(&mut self) {
        if self.total_lines == 0 {
            return;
        }
        if self.state.cursor < self.state.origin {
            self.state.origin = self.state.cursor;
        } else if self.state.cursor >= self.state.origin + self.visible_height {
            self.state.origin = self.state.cursor + 1 - self.visible_height;
        }
        self.clamp();
    }

    /// Whether buffer index `line` is on screen.
    #[must_use]
    pub fn is_visible(&self, line: usize) -> bool {
        self.visible_range().contains(&line)
    }

    const fn last_line(&self) -> usize {
        self.total_lines.saturating_sub(1)
    }

    fn clamp(&mut self) {
        self.state.origin = self.state.origin.min(self.max_origin());
        self.state.cursor = self.state.cursor.min(self.last_line());
    }
}

fn to_signed(value: usize) -> isize {
    isize::try_from(value).unwrap_or(isize::MAX)
}

fn clamp_index(value: isize, max: usize) -> usize {
    usize::try_from(value.max(0)).map_or(max, |v| v.min(max))
}
