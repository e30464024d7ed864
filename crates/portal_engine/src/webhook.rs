use portal_logging::{mask_email, portal_info};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::fetch::{build_client, ensure_success, map_reqwest_error, parse_url, read_json};
use crate::{FailureKind, FetchError, FetchSettings};

/// Wire shape of the report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookMode {
    /// GET with query parameters.
    #[default]
    Get,
    /// POST `multipart/form-data`, CSV attached as `file`.
    Multipart,
    /// POST JSON object with the same field names as the query.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    pub url: String,
    pub mode: WebhookMode,
    pub fetch: FetchSettings,
}

/// Date fields as the webhook expects them, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParams {
    /// `date=YYYY-MM-DD`
    Single(String),
    /// `dateFrom` + `dateTo`
    Range { from: String, to: String },
    /// `dateOption=Next 7 Days`
    Option(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPayload {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub location: String,
    pub date: DateParams,
    pub email: String,
    pub csv: Option<CsvPayload>,
}

impl ReportQuery {
    /// Flat `(name, value)` pairs in the order the webhook documents them.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("location", self.location.clone())];
        match &self.date {
            DateParams::Single(date) => fields.push(("date", date.clone())),
            DateParams::Range { from, to } => {
                fields.push(("dateFrom", from.clone()));
                fields.push(("dateTo", to.clone()));
            }
            DateParams::Option(option) => fields.push(("dateOption", option.clone())),
        }
        fields.push(("email", self.email.clone()));
        if let Some(csv) = &self.csv {
            fields.push(("csvContent", csv.content.clone()));
        }
        fields
    }
}

#[async_trait::async_trait]
pub trait ReportWebhook: Send + Sync {
    /// Sends one report request and returns the parsed JSON reply.
    async fn submit(&self, query: &ReportQuery) -> Result<Value, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestWebhook {
    settings: WebhookSettings,
}

impl ReqwestWebhook {
    pub fn new(settings: WebhookSettings) -> Self {
        Self { settings }
    }

    fn multipart_form(query: &ReportQuery) -> Result<Form, FetchError> {
        let mut form = Form::new();
        for (name, value) in query.fields() {
            // The file part carries the CSV; no need to send it twice.
            if name != "csvContent" {
                form = form.text(name, value);
            }
        }
        if let Some(csv) = &query.csv {
            let part = Part::bytes(csv.content.clone().into_bytes())
                .file_name(csv.filename.clone())
                .mime_str("text/csv")
                .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
            form = form.part("file", part);
        }
        Ok(form)
    }
}

#[async_trait::async_trait]
impl ReportWebhook for ReqwestWebhook {
    async fn submit(&self, query: &ReportQuery) -> Result<Value, FetchError> {
        let url = parse_url(&self.settings.url)?;
        let client = build_client(&self.settings.fetch)?;
        portal_info!(
            "Calling report webhook mode={:?} host={} location={} email={}",
            self.settings.mode,
            url.host_str().unwrap_or(""),
            query.location,
            mask_email(&query.email)
        );

        let request = match self.settings.mode {
            WebhookMode::Get => client.get(url).query(&query.fields()),
            WebhookMode::Multipart => client.post(url).multipart(Self::multipart_form(query)?),
            WebhookMode::Json => {
                let body: Map<String, Value> = query
                    .fields()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), Value::String(value)))
                    .collect();
                client.post(url).json(&body)
            }
        };

        let response = request.send().await.map_err(map_reqwest_error)?;
        ensure_success(&response)?;
        read_json(response, self.settings.fetch.max_bytes).await
    }
}
