use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::Value;

static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)(st|nd|rd|th)\b").expect("valid ordinal regex"));

/// Date formats tried in order after ISO and RFC 3339.
const LOOSE_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
];

/// Canned date options offered by the request form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePreset {
    Today,
    Next7Days,
    Next14Days,
    Next30Days,
}

impl DatePreset {
    pub const ALL: [DatePreset; 4] = [
        DatePreset::Today,
        DatePreset::Next7Days,
        DatePreset::Next14Days,
        DatePreset::Next30Days,
    ];

    /// Text sent to the webhook and shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            DatePreset::Today => "Today",
            DatePreset::Next7Days => "Next 7 Days",
            DatePreset::Next14Days => "Next 14 Days",
            DatePreset::Next30Days => "Next 30 Days",
        }
    }

    /// Accepts the label (`"Next 7 Days"`) or a slug (`"next-7-days"`).
    pub fn parse(text: &str) -> Option<Self> {
        let wanted = normalize_preset(text);
        Self::ALL
            .into_iter()
            .find(|preset| normalize_preset(preset.label()) == wanted)
    }
}

impl fmt::Display for DatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_preset(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Which kind of date input the form is currently configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateInputMode {
    #[default]
    Single,
    Range,
    Preset,
}

/// A date chosen on the request form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelection {
    Single(NaiveDate),
    Range { from: NaiveDate, to: NaiveDate },
    Preset(DatePreset),
}

impl DateSelection {
    pub fn mode(&self) -> DateInputMode {
        match self {
            DateSelection::Single(_) => DateInputMode::Single,
            DateSelection::Range { .. } => DateInputMode::Range,
            DateSelection::Preset(_) => DateInputMode::Preset,
        }
    }
}

/// The date attached to a generated report.
///
/// Webhook replies carry loosely typed values; they are discriminated into this
/// type once, at the boundary, so nothing downstream inspects field presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDate {
    Selection(DateSelection),
    /// A string echoed by the webhook that is not an ISO date.
    Text(String),
    Absent,
}

impl ReportDate {
    /// Discriminates a loosely typed JSON value.
    ///
    /// Objects count as a range only when both `from` and `to` are real dates;
    /// a lone endpoint is `Absent`.
    pub fn from_loose(value: &Value) -> Self {
        match value {
            Value::String(text) => Self::from_text(text),
            Value::Object(map) => {
                let from = map.get("from").and_then(loose_value_date);
                let to = map.get("to").and_then(loose_value_date);
                Self::from_endpoints(from, to)
            }
            _ => ReportDate::Absent,
        }
    }

    /// Builds the date from the reply's `date` or `dateFrom`/`dateTo` fields.
    ///
    /// Returns `None` when the reply carries no date fields at all, so callers
    /// can fall back to what was submitted.
    pub fn from_reply_fields(
        date: Option<&Value>,
        date_from: Option<&Value>,
        date_to: Option<&Value>,
    ) -> Option<Self> {
        // Blank echoes count as not echoed.
        fn present(value: Option<&Value>) -> Option<&Value> {
            value.filter(|v| match v {
                Value::Null => false,
                Value::String(text) => !text.trim().is_empty(),
                _ => true,
            })
        }
        match (present(date), present(date_from), present(date_to)) {
            (_, Some(from), Some(to)) => Some(Self::from_endpoints(
                loose_value_date(from),
                loose_value_date(to),
            )),
            (_, Some(_), None) | (_, None, Some(_)) => Some(ReportDate::Absent),
            (Some(date), None, None) => Some(Self::from_loose(date)),
            (None, None, None) => None,
        }
    }

    fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ReportDate::Absent;
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return ReportDate::Selection(DateSelection::Single(date));
        }
        if let Some(preset) = DatePreset::parse(trimmed) {
            return ReportDate::Selection(DateSelection::Preset(preset));
        }
        ReportDate::Text(trimmed.to_string())
    }

    fn from_endpoints(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        match (from, to) {
            (Some(from), Some(to)) => ReportDate::Selection(DateSelection::Range { from, to }),
            _ => ReportDate::Absent,
        }
    }
}

impl From<DateSelection> for ReportDate {
    fn from(selection: DateSelection) -> Self {
        ReportDate::Selection(selection)
    }
}

fn loose_value_date(value: &Value) -> Option<NaiveDate> {
    value.as_str().and_then(parse_loose_date)
}

/// Parses a date string the way the webhook tends to send them.
///
/// Tries RFC 3339, ISO dates and a handful of human formats, then retries with
/// ordinal suffixes (`23rd`) stripped.
pub fn parse_loose_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_direct(trimmed).or_else(|| {
        let stripped = strip_ordinal_suffixes(trimmed);
        if stripped == trimmed {
            None
        } else {
            parse_direct(&stripped)
        }
    })
}

/// `"23rd March 2025"` -> `"23 March 2025"`.
pub fn strip_ordinal_suffixes(text: &str) -> String {
    ORDINAL_SUFFIX.replace_all(text, "$1").into_owned()
}

fn parse_direct(text: &str) -> Option<NaiveDate> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    // `2025-03-23T10:00:00` without an offset.
    if let Some((date_part, _)) = text.split_once('T') {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Some(date);
        }
    }
    LOOSE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}
