//! Log line pipeline: classification, stream merge, and text normalization
//! for display.

pub mod classify;
pub mod merger;

use chrono::{DateTime, Local, Utc};

/// Format used for the timestamp prefix of every rendered log line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Tab stops used when expanding tabs in log messages.
const TAB_WIDTH: usize = 4;

/// Which clock rendered timestamps are shown in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeZoneMode {
    /// The machine's local offset.
    #[default]
    Local,
    /// Always `+0000`.
    Utc,
}

/// Human-readable rendering of an epoch-seconds timestamp.
///
/// Out-of-range values render as the raw number.
#[must_use]
pub fn format_timestamp(epoch_secs: i64, zone: TimeZoneMode) -> String {
    let Some(utc) = DateTime::<Utc>::from_timestamp(epoch_secs, 0) else {
        return epoch_secs.to_string();
    };
    match zone {
        TimeZoneMode::Utc => utc.format(TIMESTAMP_FORMAT).to_string(),
        TimeZoneMode::Local => utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
    }
}

/// Make a message safe for a single terminal row: tabs become spaces up to the
/// next tab stop, newlines become spaces, other control characters are dropped.
#[must_use]
pub fn sanitize_for_display(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut column = 0usize;
    for ch in message.chars() {
        match ch {
            '\t' => {
                let pad = TAB_WIDTH - (column % TAB_WIDTH);
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(' ');
                column += 1;
            }
            c if c.is_control() => {}
            c => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}
