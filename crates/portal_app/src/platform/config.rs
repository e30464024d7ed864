use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use portal_core::DEFAULT_DOCUMENT_LIMIT;
use portal_engine::{
    DocumentsSettings, EngineConfig, FetchSettings, UploadBody, WebhookMode, WebhookSettings,
};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "portal.ron";

pub const ENV_WEBHOOK_URL: &str = "PORTAL_WEBHOOK_URL";
pub const ENV_UPLOAD_WEBHOOK_URL: &str = "PORTAL_UPLOAD_WEBHOOK_URL";
pub const ENV_DOCUMENTS_URL: &str = "PORTAL_DOCUMENTS_URL";
pub const ENV_DOCUMENTS_KEY: &str = "PORTAL_DOCUMENTS_KEY";

/// Contents of `portal.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub webhook_url: String,
    pub webhook_mode: WebhookMode,
    /// Falls back to `webhook_url` when unset.
    pub upload_webhook_url: Option<String>,
    pub upload_format: UploadBody,
    pub documents: DocumentsConfig,
    pub output_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_download_bytes: u64,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Hosted database URL; the Documents tab is disabled without it.
    pub base_url: Option<String>,
    pub table: String,
    pub api_key: Option<String>,
    pub limit: usize,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            table: "documents".to_string(),
            api_key: None,
            limit: DEFAULT_DOCUMENT_LIMIT,
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            webhook_url: String::new(),
            webhook_mode: WebhookMode::default(),
            upload_webhook_url: None,
            upload_format: UploadBody::default(),
            documents: DocumentsConfig::default(),
            output_dir: PathBuf::from("downloads"),
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_download_bytes: fetch.max_bytes,
            log_level: "info".to_string(),
        }
    }
}

impl PortalConfig {
    /// Reads a RON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        ron::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Applies `PORTAL_*` overrides. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        if let Some(url) = var(ENV_WEBHOOK_URL) {
            self.webhook_url = url;
        }
        if let Some(url) = var(ENV_UPLOAD_WEBHOOK_URL) {
            self.upload_webhook_url = Some(url);
        }
        if let Some(url) = var(ENV_DOCUMENTS_URL) {
            self.documents.base_url = Some(url);
        }
        if let Some(key) = var(ENV_DOCUMENTS_KEY) {
            self.documents.api_key = Some(key);
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_download_bytes,
            ..FetchSettings::default()
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        let fetch = self.fetch_settings();
        let documents = self
            .documents
            .base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .map(|base_url| DocumentsSettings {
                base_url,
                table: self.documents.table.clone(),
                api_key: self.documents.api_key.clone(),
                fetch: fetch.clone(),
            });
        let upload_url = self
            .upload_webhook_url
            .clone()
            .or_else(|| Some(self.webhook_url.clone()).filter(|url| !url.is_empty()));

        EngineConfig {
            webhook: WebhookSettings {
                url: self.webhook_url.clone(),
                mode: self.webhook_mode,
                fetch: fetch.clone(),
            },
            documents,
            upload_url,
            fetch,
            output_dir: self.output_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = PortalConfig::load(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.documents.limit, 20);
        assert_eq!(config.request_timeout_secs, 180);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("portal.ron");
        fs::write(
            &path,
            r#"(
                webhook_url: "https://flows.example.com/webhook/security-report",
                webhook_mode: json,
                upload_webhook_url: Some("https://flows.example.com/webhook/upload"),
                documents: (base_url: Some("https://db.example.com"), limit: 50),
                request_timeout_secs: 30,
            )"#,
        )
        .unwrap();

        let config = PortalConfig::load(&path).unwrap();
        assert_eq!(config.webhook_mode, WebhookMode::Json);
        assert_eq!(config.documents.table, "documents");
        assert_eq!(config.documents.limit, 50);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.upload_format, UploadBody::Multipart);

        let engine = config.engine_config();
        assert_eq!(engine.fetch.request_timeout, Duration::from_secs(30));
        assert_eq!(
            engine.upload_url.as_deref(),
            Some("https://flows.example.com/webhook/upload")
        );
        assert_eq!(
            engine.documents.map(|d| d.base_url),
            Some("https://db.example.com".to_string())
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("portal.ron");
        fs::write(&path, "(webhook_url: 42)").unwrap();
        let err = PortalConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing config"));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_WEBHOOK_URL, "https://env.example.com/hook"),
            (ENV_DOCUMENTS_URL, " https://db.example.com "),
            (ENV_DOCUMENTS_KEY, "anon"),
            (ENV_UPLOAD_WEBHOOK_URL, "   "),
        ]);
        let mut config = PortalConfig {
            webhook_url: "https://file.example.com/hook".into(),
            ..PortalConfig::default()
        };
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.webhook_url, "https://env.example.com/hook");
        assert_eq!(config.documents.base_url.as_deref(), Some("https://db.example.com"));
        assert_eq!(config.documents.api_key.as_deref(), Some("anon"));
        assert_eq!(config.upload_webhook_url, None);
    }

    #[test]
    fn upload_url_falls_back_to_report_webhook() {
        let config = PortalConfig {
            webhook_url: "https://flows.example.com/hook".into(),
            ..PortalConfig::default()
        };
        let engine = config.engine_config();
        assert_eq!(engine.upload_url.as_deref(), Some("https://flows.example.com/hook"));
        assert!(engine.documents.is_none());

        assert_eq!(PortalConfig::default().engine_config().upload_url, None);
    }
}
