use portal_logging::portal_info;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use crate::fetch::{build_client, ensure_success, map_reqwest_error, parse_url, read_body};
use crate::{FailureKind, FetchError, FetchSettings, UploadReceipt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadBody {
    /// `multipart/form-data` with a `file` part.
    #[default]
    Multipart,
    /// `{ "filename", "csvData", "timestamp" }`
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvUpload {
    pub filename: String,
    pub content: String,
    /// RFC 3339 time of the upload click.
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct CsvUploader {
    default_url: Option<String>,
    fetch: FetchSettings,
}

impl CsvUploader {
    pub fn new(default_url: Option<String>, fetch: FetchSettings) -> Self {
        Self { default_url, fetch }
    }

    /// Posts the file to `url_override`, or the configured webhook.
    pub async fn upload(
        &self,
        upload: &CsvUpload,
        url_override: Option<&str>,
        body: UploadBody,
    ) -> Result<UploadReceipt, FetchError> {
        let target = url_override
            .or(self.default_url.as_deref())
            .ok_or_else(|| FetchError::new(FailureKind::NotConfigured, "no upload webhook"))?;
        let url = parse_url(target)?;
        let client = build_client(&self.fetch)?;
        portal_info!(
            "Uploading {} ({} bytes) as {:?} to {}",
            upload.filename,
            upload.content.len(),
            body,
            url.host_str().unwrap_or("")
        );

        let request = match body {
            UploadBody::Multipart => {
                let part = Part::bytes(upload.content.clone().into_bytes())
                    .file_name(upload.filename.clone())
                    .mime_str("text/csv")
                    .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
                client.post(url).multipart(Form::new().part("file", part))
            }
            UploadBody::Json => client.post(url).json(&json!({
                "filename": upload.filename,
                "csvData": upload.content,
                "timestamp": upload.timestamp,
            })),
        };

        let response = request.send().await.map_err(map_reqwest_error)?;
        ensure_success(&response)?;
        let status = response.status().as_u16();
        let bytes = read_body(response, self.fetch.max_bytes, |_| {}).await?;
        Ok(UploadReceipt {
            status,
            body: serde_json::from_slice(&bytes).ok(),
        })
    }
}
