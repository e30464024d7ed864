use std::time::Duration;

use futures_util::StreamExt;
use portal_logging::portal_debug;

use crate::{EngineEvent, FailureKind, FetchError};

/// Transport limits shared by every outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Webhook workflows can take minutes to render a report.
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(180),
            redirect_limit: 10,
            max_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Receives engine events; implemented by the app to turn them into messages.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

pub(crate) fn build_client(settings: &FetchSettings) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
        .build()
        .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
}

pub(crate) fn parse_url(url: &str) -> Result<reqwest::Url, FetchError> {
    if url.trim().is_empty() {
        return Err(FetchError::new(FailureKind::NotConfigured, "no url given"));
    }
    reqwest::Url::parse(url.trim())
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
}

pub(crate) fn ensure_success(response: &reqwest::Response) -> Result<(), FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

/// Streams the body into memory, failing once it grows past `max_bytes`.
///
/// `on_chunk` sees the running byte count after every chunk.
pub(crate) async fn read_body(
    response: reqwest::Response,
    max_bytes: u64,
    mut on_chunk: impl FnMut(u64),
) -> Result<Vec<u8>, FetchError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(too_large(max_bytes, content_len));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(too_large(max_bytes, next_len));
        }
        bytes.extend_from_slice(&chunk);
        on_chunk(next_len);
    }
    portal_debug!("Read {} response bytes", bytes.len());
    Ok(bytes)
}

/// Reads the body and parses it as JSON.
pub(crate) async fn read_json(
    response: reqwest::Response,
    max_bytes: u64,
) -> Result<serde_json::Value, FetchError> {
    let bytes = read_body(response, max_bytes, |_| {}).await?;
    serde_json::from_slice(&bytes)
        .map_err(|err| FetchError::new(FailureKind::InvalidJson, err.to_string()))
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
