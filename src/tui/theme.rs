//! Style tokens for dashboard rendering and their terminal mapping.

#![allow(missing_docs)]

use std::env;

use crate::logs::classify::LineCategory;

/// Color output mode for compatibility with `NO_COLOR`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Enabled,
    Disabled,
}

impl ColorMode {
    #[must_use]
    pub const fn from_no_color_flag(no_color: bool) -> Self {
        if no_color {
            Self::Disabled
        } else {
            Self::Enabled
        }
    }

    #[must_use]
    pub fn from_environment() -> Self {
        Self::from_no_color_flag(env::var_os("NO_COLOR").is_some())
    }
}

/// Semantic style of a rendered span, independent of concrete colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StyleToken {
    #[default]
    Plain,
    Title,
    /// Title of the panel holding focus.
    TitleFocused,
    Border,
    /// List cursor row while the list holds focus.
    Cursor,
    /// List cursor row while another panel holds focus.
    CursorIdle,
    /// Log line timestamp and metadata labels.
    Label,
    /// Invocation boundary line.
    Boundary,
    Muted,
    Status,
    Error,
}

impl StyleToken {
    /// Style for the message part of a classified log line.
    #[must_use]
    pub const fn for_category(category: LineCategory) -> Self {
        match category {
            LineCategory::Boundary => Self::Boundary,
            LineCategory::Plain => Self::Plain,
        }
    }
}

/// Concrete attributes for a token. Colors are dropped when color is disabled;
/// reverse video and bold are kept so focus and boundaries stay visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermStyle {
    pub fg: Option<TermColor>,
    pub bg: Option<TermColor>,
    pub bold: bool,
    pub reverse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermColor {
    Green,
    Black,
    Cyan,
    Red,
    DarkGrey,
}

#[must_use]
pub const fn term_style(token: StyleToken, mode: ColorMode) -> TermStyle {
    let colored = matches!(mode, ColorMode::Enabled);
    let none = TermStyle {
        fg: None,
        bg: None,
        bold: false,
        reverse: false,
    };
    match token {
        StyleToken::Plain | StyleToken::Border => none,
        StyleToken::Title => TermStyle { bold: true, ..none },
        StyleToken::TitleFocused => TermStyle {
            fg: if colored { Some(TermColor::Cyan) } else { None },
            bold: true,
            reverse: !colored,
            ..none
        },
        StyleToken::Cursor => {
            if colored {
                TermStyle {
                    fg: Some(TermColor::Black),
                    bg: Some(TermColor::Green),
                    ..none
                }
            } else {
                TermStyle {
                    reverse: true,
                    ..none
                }
            }
        }
        StyleToken::CursorIdle => TermStyle { bold: true, ..none },
        StyleToken::Label => TermStyle {
            fg: if colored { Some(TermColor::Green) } else { None },
            ..none
        },
        StyleToken::Boundary | StyleToken::Status => TermStyle {
            reverse: true,
            ..none
        },
        StyleToken::Muted => TermStyle {
            fg: if colored { Some(TermColor::DarkGrey) } else { None },
            ..none
        },
        StyleToken::Error => TermStyle {
            fg: if colored { Some(TermColor::Red) } else { None },
            bold: true,
            ..none
        },
    }
}

#[cfg(feature = "tui")]
impl From<TermColor> for crossterm::style::Color {
    fn from(color: TermColor) -> Self {
        match color {
            TermColor::Green => Self::Green,
            TermColor::Black => Self::Black,
            TermColor::Cyan => Self::Cyan,
            TermColor::Red => Self::Red,
            TermColor::DarkGrey => Self::DarkGrey,
        }
    }
}
