use std::cmp::Reverse;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// Rows requested from the hosted table by default.
pub const DEFAULT_DOCUMENT_LIMIT: usize = 20;

pub const CSV_HEADER: &str = "id,location,date,type,source,content";

static CONTENT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("valid content date regex")
});

/// Loosely structured metadata bag attached to a document row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub doc_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
}

impl DocumentMetadata {
    /// Reads the bag from any JSON value; non-objects yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// Accepts strings and numbers, drops everything else.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: i64,
    pub content: String,
    pub metadata: Option<DocumentMetadata>,
}

impl Document {
    /// First real `YYYY-MM-DD` date mentioned in the content.
    pub fn content_date(&self) -> Option<NaiveDate> {
        extract_content_date(&self.content)
    }

    fn meta_field(&self, pick: impl Fn(&DocumentMetadata) -> Option<&String>) -> &str {
        self.metadata
            .as_ref()
            .and_then(pick)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn location(&self) -> &str {
        self.meta_field(|m| m.location.as_ref())
    }

    pub fn doc_type(&self) -> &str {
        self.meta_field(|m| m.doc_type.as_ref())
    }

    pub fn source(&self) -> &str {
        self.meta_field(|m| m.source.as_ref())
    }
}

pub fn extract_content_date(content: &str) -> Option<NaiveDate> {
    CONTENT_DATE.captures_iter(content).find_map(|caps| {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// Newest content date first; undated rows last; ties by id descending.
pub fn sort_documents(documents: &mut [Document]) {
    // `Reverse(None)` orders after every `Reverse(Some(_))`.
    documents.sort_by_cached_key(|doc| (Reverse(doc.content_date()), Reverse(doc.id)));
}

/// Client-side filters; every set field must match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentFilter {
    pub location: Option<String>,
    pub doc_type: Option<String>,
    pub source: Option<String>,
    pub content: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl DocumentFilter {
    pub fn is_empty(&self) -> bool {
        *self == DocumentFilter::default()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        contains(doc.location(), self.location.as_deref())
            && contains(doc.doc_type(), self.doc_type.as_deref())
            && contains(doc.source(), self.source.as_deref())
            && contains(&doc.content, self.content.as_deref())
            && self.date_matches(doc)
    }

    fn date_matches(&self, doc: &Document) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        let Some(date) = doc.content_date() else {
            return false;
        };
        self.date_from.is_none_or(|from| date >= from) && self.date_to.is_none_or(|to| date <= to)
    }
}

fn contains(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

pub fn apply_filter<'a>(documents: &'a [Document], filter: &DocumentFilter) -> Vec<&'a Document> {
    matching_indices(documents, filter)
        .into_iter()
        .map(|index| &documents[index])
        .collect()
}

/// Positions of the documents the filter keeps, in list order.
pub(crate) fn matching_indices(documents: &[Document], filter: &DocumentFilter) -> Vec<usize> {
    documents
        .iter()
        .enumerate()
        .filter(|(_, doc)| filter.matches(doc))
        .map(|(index, _)| index)
        .collect()
}

/// Builds the export CSV. Only the content column is quoted.
pub fn documents_to_csv<'a>(documents: impl IntoIterator<Item = &'a Document>) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for doc in documents {
        let date = doc
            .content_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{},{},{},{},{},\"{}\"\n",
            doc.id,
            doc.location(),
            date,
            doc.doc_type(),
            doc.source(),
            doc.content.replace('"', "\"\"")
        ));
    }
    out
}

/// `documents-export-2025-03-23.csv`
pub fn export_filename(today: NaiveDate) -> String {
    format!("documents-export-{}.csv", today.format("%Y-%m-%d"))
}
