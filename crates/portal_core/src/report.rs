use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::selection::{DateInputMode, DateSelection, ReportDate};

/// Identifier of a generated report: milliseconds since the epoch at submission.
pub type ReportId = i64;

/// A CSV file attached to the request form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvAttachment {
    pub filename: String,
    pub content: String,
}

/// Fields of the request form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormData {
    pub location: String,
    pub date_mode: DateInputMode,
    pub date: Option<DateSelection>,
    pub email: String,
    pub csv: Option<CsvAttachment>,
}

/// Everything the webhook needs for one report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub location: String,
    pub date: DateSelection,
    pub email: String,
    pub csv: Option<CsvAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    pub id: ReportId,
    pub location: String,
    pub email: String,
    pub date: ReportDate,
    pub report_url: String,
    pub generated_at: DateTime<Utc>,
}

/// Why a webhook reply could not be turned into a report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplyError {
    #[error("reply is not a JSON object")]
    NotAnObject,
    #[error("incomplete data: missing {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
}

/// Validates a webhook reply and builds the report, preferring echoed values.
///
/// `location`, `email` and `urlOfSecurityReport` must be present and non-blank.
/// The submitted date is used when the reply echoes no date at all.
pub fn report_from_reply(
    reply: &Value,
    submitted: &ReportRequest,
    id: ReportId,
    generated_at: DateTime<Utc>,
) -> Result<GeneratedReport, ReplyError> {
    if !reply.is_object() {
        return Err(ReplyError::NotAnObject);
    }
    // Fields of the wrong JSON type count as missing.
    let mut missing = Vec::new();
    let location = required(reply, "location", &mut missing);
    let email = required(reply, "email", &mut missing);
    let report_url = required(reply, "urlOfSecurityReport", &mut missing);
    if !missing.is_empty() {
        return Err(ReplyError::Incomplete(missing));
    }

    let date = ReportDate::from_reply_fields(
        reply.get("date"),
        reply.get("dateFrom"),
        reply.get("dateTo"),
    )
    .unwrap_or_else(|| submitted.date.into());

    Ok(GeneratedReport {
        id,
        location,
        email,
        date,
        report_url,
        generated_at,
    })
}

fn required(reply: &Value, key: &'static str, missing: &mut Vec<&'static str>) -> String {
    match reply
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        Some(v) => v.to_string(),
        None => {
            missing.push(key);
            String::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("The start date must not be after the end date")]
    ReversedRange,
}

impl FormData {
    /// Checks the preconditions for a submission and builds the request.
    pub fn to_request(&self) -> Result<ReportRequest, FormError> {
        let location = self.location.trim();
        let email = self.email.trim();

        let mut missing = Vec::new();
        if location.is_empty() {
            missing.push("location");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if email.is_empty() {
            missing.push("email");
        }
        let Some(date) = self.date.filter(|_| missing.is_empty()) else {
            return Err(FormError::MissingFields(missing));
        };
        if let DateSelection::Range { from, to } = date {
            if from > to {
                return Err(FormError::ReversedRange);
            }
        }

        Ok(ReportRequest {
            location: location.to_string(),
            date,
            email: email.to_string(),
            csv: self.csv.clone(),
        })
    }
}
