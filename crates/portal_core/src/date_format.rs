use std::fmt;

use chrono::NaiveDate;

use crate::selection::{parse_loose_date, DateSelection, ReportDate};

/// Filename token used when no real date can be extracted.
pub const UNKNOWN_DATE_TOKEN: &str = "unknown-date";

const LABEL_FORMAT: &str = "%B %-d, %Y";
const TOKEN_FORMAT: &str = "%Y-%m-%d";

/// Human label for a report date, or an explicit marker the renderer can flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateLabel {
    Valid(String),
    Invalid,
}

impl DateLabel {
    pub fn is_valid(&self) -> bool {
        matches!(self, DateLabel::Valid(_))
    }
}

impl fmt::Display for DateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateLabel::Valid(text) => f.write_str(text),
            DateLabel::Invalid => f.write_str("Invalid date"),
        }
    }
}

pub fn format_report_date(date: &ReportDate) -> DateLabel {
    match date {
        ReportDate::Selection(DateSelection::Single(day)) => DateLabel::Valid(label(*day)),
        ReportDate::Selection(DateSelection::Range { from, to }) => {
            if from == to {
                DateLabel::Valid(label(*from))
            } else {
                DateLabel::Valid(format!("{} - {}", label(*from), label(*to)))
            }
        }
        ReportDate::Selection(DateSelection::Preset(preset)) => {
            DateLabel::Valid(preset.label().to_string())
        }
        ReportDate::Text(text) => match parse_loose_date(text) {
            Some(day) => DateLabel::Valid(label(day)),
            None => DateLabel::Invalid,
        },
        ReportDate::Absent => DateLabel::Invalid,
    }
}

/// Filesystem-safe date token: `2025-03-23`, `2025-03-01_to_2025-03-05` or `unknown-date`.
pub fn filename_date_token(date: &ReportDate) -> String {
    match date {
        ReportDate::Selection(DateSelection::Single(day)) => token(*day),
        ReportDate::Selection(DateSelection::Range { from, to }) => {
            if from == to {
                token(*from)
            } else {
                format!("{}_to_{}", token(*from), token(*to))
            }
        }
        ReportDate::Text(text) => parse_loose_date(text)
            .map(token)
            .unwrap_or_else(|| UNKNOWN_DATE_TOKEN.to_string()),
        ReportDate::Selection(DateSelection::Preset(_)) | ReportDate::Absent => {
            UNKNOWN_DATE_TOKEN.to_string()
        }
    }
}

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_location(location: &str) -> String {
    location
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `security-report-{date}-{location}.pdf`
pub fn report_filename(date: &ReportDate, location: &str) -> String {
    format!(
        "security-report-{}-{}.pdf",
        filename_date_token(date),
        sanitize_location(location.trim())
    )
}

fn label(day: NaiveDate) -> String {
    day.format(LABEL_FORMAT).to_string()
}

fn token(day: NaiveDate) -> String {
    day.format(TOKEN_FORMAT).to_string()
}
