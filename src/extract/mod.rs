//! Recovery of the original creation date embedded in imported note bodies.
//!
//! Notes imported from iCloud carry a "Date Received:" line in their body.
//! Two markup layouts have been observed for that line; each has its own
//! matcher and they are tried in a fixed order.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RedateError, Result};

/// Label preceding the embedded date. Also used as the catalog filter.
pub const DATE_LABEL: &str = "Date Received:";

/// Layout of the cleaned date text.
pub const DATE_FORMAT: &str = "%d %b %Y %H:%M";

/// Dates are written in Moscow time (UTC+3, no DST).
pub const SOURCE_UTC_OFFSET: &str = "+0300";

/// Russian genitive month names paired with the English abbreviations
/// understood by `%b`.
pub const MONTHS: [(&str, &str); 12] = [
    ("января", "Jan"),
    ("февраля", "Feb"),
    ("марта", "Mar"),
    ("апреля", "Apr"),
    ("мая", "May"),
    ("июня", "Jun"),
    ("июля", "Jul"),
    ("августа", "Aug"),
    ("сентября", "Sep"),
    ("октября", "Oct"),
    ("ноября", "Nov"),
    ("декабря", "Dec"),
];

const YEAR_ABBREVIATION: &str = "г. ";

static SPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Date Received:[strongspa<>/]+[^0-9A-Za-z_]*([0-9][^<]+)</span").expect("valid span marker regex")
});
static BOLD_BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Date Received:(?:<b>)?</b>[^0-9A-Za-z_]*([0-9][^<]+)<br").expect("valid bold marker regex")
});

/// Known layouts of the "Date Received:" line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `Date Received:</strong></span><span> 5 Jan 2014 14:30</span>`
    Span,
    /// `Date Received:</b> 5 Jan 2014 14:30<br/>`
    BoldBreak,
}

impl Marker {
    /// Matchers in priority order.
    pub const ALL: [Marker; 2] = [Marker::Span, Marker::BoldBreak];

    fn regex(self) -> &'static Regex {
        match self {
            Marker::Span => &*SPAN_RE,
            Marker::BoldBreak => &*BOLD_BREAK_RE,
        }
    }

    /// Raw date text following this marker, if present.
    pub fn find(self, content: &str) -> Option<&str> {
        self.regex()
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marker::Span => write!(f, "span"),
            Marker::BoldBreak => write!(f, "bold-break"),
        }
    }
}

/// First marker that matches `content`, with the raw date text it captured.
pub fn find_date_text(content: &str) -> Option<(Marker, &str)> {
    Marker::ALL
        .into_iter()
        .find_map(|marker| marker.find(content).map(|text| (marker, text)))
}

/// Translate a localized month name and drop the year abbreviation.
pub fn normalize_date_text(text: &str) -> String {
    let mut normalized = text.to_string();
    if let Some((ru, en)) = MONTHS.iter().find(|(ru, _)| normalized.contains(ru)) {
        normalized = normalized.replacen(ru, en, 1);
    }
    normalized.replace(YEAR_ABBREVIATION, "").trim().to_string()
}

/// Parse cleaned date text in the source zone and convert it to UTC.
pub fn parse_date_text(text: &str) -> Result<DateTime<Utc>> {
    let with_zone = format!("{} {}", text, SOURCE_UTC_OFFSET);
    DateTime::parse_from_str(&with_zone, &format!("{} %z", DATE_FORMAT))
        .map(|date| date.with_timezone(&Utc))
        .map_err(|source| RedateError::DateParse {
            text: text.to_string(),
            source,
        })
}

/// Extract the embedded creation date from a note body.
///
/// Returns `Ok(None)` when no marker is present. A marker followed by text
/// that does not fit [`DATE_FORMAT`] is an error, not a missing date.
pub fn extract(content: &str) -> Result<Option<DateTime<Utc>>> {
    let Some((_, raw)) = find_date_text(content) else {
        return Ok(None);
    };
    parse_date_text(&normalize_date_text(raw)).map(Some)
}
