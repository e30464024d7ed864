use portal_logging::portal_info;
use url::Url;

use crate::fetch::{build_client, ensure_success, map_reqwest_error, read_json};
use crate::{DocumentRecord, FailureKind, FetchError, FetchSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentsSettings {
    /// Project URL of the hosted database, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    pub table: String,
    pub api_key: Option<String>,
    pub fetch: FetchSettings,
}

#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    /// Most recent rows, ordered by id descending.
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<DocumentRecord>, FetchError>;
}

/// Reads the documents table through its PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct RestDocumentSource {
    settings: DocumentsSettings,
}

impl RestDocumentSource {
    pub fn new(settings: DocumentsSettings) -> Self {
        Self { settings }
    }

    /// `{base}/rest/v1/{table}?select=id,content,metadata&order=id.desc&limit={limit}`
    pub fn query_url(&self, limit: usize) -> Result<Url, FetchError> {
        let base = self.settings.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(FetchError::new(
                FailureKind::NotConfigured,
                "documents base url is not set",
            ));
        }
        let mut url = Url::parse(&format!("{base}/rest/v1/{}", self.settings.table))
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("select", "id,content,metadata")
            .append_pair("order", "id.desc")
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl DocumentSource for RestDocumentSource {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<DocumentRecord>, FetchError> {
        let url = self.query_url(limit)?;
        let client = build_client(&self.settings.fetch)?;
        let mut request = client.get(url.as_str());
        if let Some(key) = self.settings.api_key.as_deref() {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        ensure_success(&response)?;
        let body = read_json(response, self.settings.fetch.max_bytes).await?;
        let rows: Vec<DocumentRecord> = serde_json::from_value(body)
            .map_err(|err| FetchError::new(FailureKind::InvalidJson, err.to_string()))?;
        portal_info!(
            "Fetched {} rows from table {}",
            rows.len(),
            self.settings.table
        );
        Ok(rows)
    }
}
