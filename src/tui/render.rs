//! Frame composition and painting.
//!
//! [`compose_frame`] turns the model into rows of styled segments without
//! touching the terminal, so every screen state can be asserted as text.
//! [`paint`] writes a composed frame with crossterm.

#![allow(missing_docs)]

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::layout::{MIN_USABLE_COLS, MIN_USABLE_ROWS, is_terminal_too_small};
use super::model::{DashboardModel, Focus, PanelStatus};
use super::theme::StyleToken;
use crate::logs::{format_timestamp, sanitize_for_display};

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: StyleToken,
}

impl Segment {
    #[must_use]
    pub fn new(text: impl Into<String>, style: StyleToken) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// One full screen; every row spans the terminal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub rows: Vec<Vec<Segment>>,
}

impl Frame {
    /// Unstyled text of row `y`.
    #[must_use]
    pub fn row_text(&self, y: usize) -> String {
        self.rows
            .get(y)
            .map(|row| row.iter().map(|s| s.text.as_str()).collect())
            .unwrap_or_default()
    }

    /// Unstyled text of the whole frame, rows joined by newlines.
    #[must_use]
    pub fn to_text(&self) -> String {
        (0..self.rows.len())
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Accumulates segments for a cell of fixed width, clipping at the edge.
///
/// Widths are terminal columns, so a wide character counts as two.
struct CellBuilder {
    segments: Vec<Segment>,
    remaining: usize,
}

impl CellBuilder {
    fn new(width: u16) -> Self {
        Self {
            segments: Vec::new(),
            remaining: usize::from(width),
        }
    }

    fn push(&mut self, text: &str, style: StyleToken) -> &mut Self {
        if self.remaining == 0 || text.is_empty() {
            return self;
        }
        let mut clipped = String::with_capacity(text.len());
        let mut used = 0;
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > self.remaining {
                break;
            }
            used += w;
            clipped.push(c);
        }
        self.remaining -= used;
        if !clipped.is_empty() {
            self.segments.push(Segment::new(clipped, style));
        }
        self
    }

    /// Pad to the full width with `style` and return the segments.
    fn finish(mut self, style: StyleToken) -> Vec<Segment> {
        if self.remaining > 0 {
            self.segments
                .push(Segment::new(" ".repeat(self.remaining), style));
        }
        self.segments
    }
}

/// Build the frame for the current model state.
#[must_use]
pub fn compose_frame(model: &DashboardModel) -> Frame {
    let (cols, rows) = model.terminal_size;

    if is_terminal_too_small(cols, rows) {
        let mut frame_rows = Vec::with_capacity(usize::from(rows));
        for y in 0..rows {
            let mut cell = CellBuilder::new(cols);
            if y == 0 {
                cell.push(
                    &format!("terminal too small (need {MIN_USABLE_COLS}x{MIN_USABLE_ROWS})"),
                    StyleToken::Error,
                );
            }
            frame_rows.push(cell.finish(StyleToken::Plain));
        }
        return Frame { rows: frame_rows };
    }

    let layout = model.layout();
    let mut frame_rows = Vec::with_capacity(usize::from(rows));
    for y in 0..rows {
        if layout.status.contains_row(y) {
            frame_rows.push(status_row(model, layout.status.width));
            continue;
        }
        let mut row = entity_cell(model, y - layout.entities.y, layout.entities.width);
        row.push(Segment::new("│", StyleToken::Border));
        if layout.logs.contains_row(y) {
            row.extend(log_cell(model, y - layout.logs.y, layout.logs.width));
        } else {
            row.extend(metadata_cell(
                model,
                y - layout.metadata.y,
                layout.metadata.width,
            ));
        }
        frame_rows.push(row);
    }
    Frame { rows: frame_rows }
}

/// Plain text of the frame for the current model state.
#[must_use]
pub fn render_to_string(model: &DashboardModel) -> String {
    compose_frame(model).to_text()
}

fn title_style(model: &DashboardModel, panel: Focus) -> StyleToken {
    if model.focus == panel {
        StyleToken::TitleFocused
    } else {
        StyleToken::Title
    }
}

fn entity_cell(model: &DashboardModel, row: u16, width: u16) -> Vec<Segment> {
    let mut cell = CellBuilder::new(width);
    if row == 0 {
        let style = title_style(model, Focus::Entities);
        cell.push(&format!(" Functions ({})", model.entities.len()), style);
        return cell.finish(style);
    }

    let state = model.entity_view.state();
    let index = state.origin + usize::from(row) - 1;
    let Some(name) = model.entities.get(index) else {
        if model.entities.is_empty() && row == 1 {
            cell.push(" (no functions)", StyleToken::Muted);
        }
        return cell.finish(StyleToken::Plain);
    };

    let marker = if model.selection.selected() == Some(name.as_str()) {
        "*"
    } else {
        " "
    };
    let style = match (index == state.cursor, model.focus) {
        (true, Focus::Entities) => StyleToken::Cursor,
        (true, Focus::Logs) => StyleToken::CursorIdle,
        (false, _) => StyleToken::Plain,
    };
    cell.push(marker, style).push(name, style);
    cell.finish(style)
}

fn log_cell(model: &DashboardModel, row: u16, width: u16) -> Vec<Segment> {
    let mut cell = CellBuilder::new(width);
    if row == 0 {
        // Name the function the buffer belongs to, which lags the selection
        // until its cycle is applied.
        let style = title_style(model, Focus::Logs);
        let shown = model.panels.metadata.as_ref().map(|(entity, _)| entity.as_str());
        let title = match shown {
            Some(entity) => format!(" Logs: {entity}"),
            None => " Logs".to_string(),
        };
        cell.push(&title, style);
        if let PanelStatus::Loading { entity } = &model.panels.status {
            cell.push(&format!(" (loading {entity}...)"), StyleToken::Muted);
        }
        return cell.finish(style);
    }

    let panels = &model.panels;
    let index = panels.log_view.state().origin + usize::from(row) - 1;
    if let Some(line) = panels.log_lines.get(index) {
        cell.push(
            &format_timestamp(line.timestamp, model.settings.zone),
            StyleToken::Label,
        )
        .push(" - ", StyleToken::Plain)
        .push(
            &sanitize_for_display(&line.text),
            StyleToken::for_category(line.category),
        );
    } else if panels.log_lines.is_empty() && row == 1 {
        let hint = match &panels.status {
            PanelStatus::Idle => "select a function and press Enter".to_string(),
            PanelStatus::Loading { entity } => format!("loading {entity}..."),
            PanelStatus::Ready => "(no log events)".to_string(),
            PanelStatus::Failed { .. } => "(logs unavailable)".to_string(),
        };
        cell.push(&hint, StyleToken::Muted);
    }
    cell.finish(StyleToken::Plain)
}

fn metadata_cell(model: &DashboardModel, row: u16, width: u16) -> Vec<Segment> {
    let mut cell = CellBuilder::new(width);
    if row == 0 {
        cell.push(" Configuration", StyleToken::Title);
        return cell.finish(StyleToken::Title);
    }

    let Some((_, metadata)) = &model.panels.metadata else {
        return cell.finish(StyleToken::Plain);
    };
    let label_width = metadata.keys().map(|k| k.width()).max().unwrap_or(0);
    if let Some((label, value)) = metadata.iter().nth(usize::from(row) - 1) {
        let padding = " ".repeat(label_width - label.width());
        cell.push(&format!("{label}{padding}"), StyleToken::Label)
            .push(" ", StyleToken::Plain)
            .push(&sanitize_for_display(value), StyleToken::Plain);
    }
    cell.finish(StyleToken::Plain)
}

fn status_row(model: &DashboardModel, width: u16) -> Vec<Segment> {
    let mut cell = CellBuilder::new(width);
    let selected = model.selection.selected().unwrap_or("-");
    let follow = if model.panels.log_view.state().autoscroll {
        "[LIVE]"
    } else {
        "[PAUSED]"
    };
    cell.push(
        &format!(
            " {selected} | {} lines {follow} | focus: {} ",
            model.panels.log_lines.len(),
            model.focus.label()
        ),
        StyleToken::Status,
    );
    match &model.panels.status {
        PanelStatus::Failed {
            entity,
            stage,
            message,
        } => {
            cell.push(
                &format!("| {entity} {} failed: {message} ", stage.label()),
                StyleToken::Error,
            );
        }
        PanelStatus::Loading { .. } => {
            cell.push("| loading ", StyleToken::Status);
        }
        PanelStatus::Idle | PanelStatus::Ready => {}
    }
    cell.finish(StyleToken::Status)
}

#[cfg(feature = "tui")]
pub use self::paint::paint;

#[cfg(feature = "tui")]
mod paint {
    use std::io::{self, Write};

    use crossterm::cursor::MoveTo;
    use crossterm::queue;
    use crossterm::style::{
        Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    };

    use super::Frame;
    use crate::tui::theme::{ColorMode, TermStyle, term_style};

    /// Write `frame` to `out` starting at the top-left corner.
    ///
    /// # Errors
    /// Returns I/O errors from the terminal writer.
    pub fn paint<W: Write>(out: &mut W, frame: &Frame, mode: ColorMode) -> io::Result<()> {
        for (y, row) in frame.rows.iter().enumerate() {
            let y = u16::try_from(y).unwrap_or(u16::MAX);
            queue!(out, MoveTo(0, y))?;
            for segment in row {
                apply(out, term_style(segment.style, mode))?;
                queue!(
                    out,
                    Print(&segment.text),
                    SetAttribute(Attribute::Reset),
                    ResetColor
                )?;
            }
        }
        out.flush()
    }

    fn apply<W: Write>(out: &mut W, style: TermStyle) -> io::Result<()> {
        if let Some(fg) = style.fg {
            queue!(out, SetForegroundColor(fg.into()))?;
        }
        if let Some(bg) = style.bg {
            queue!(out, SetBackgroundColor(bg.into()))?;
        }
        if style.bold {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        if style.reverse {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        Ok(())
    }
}
