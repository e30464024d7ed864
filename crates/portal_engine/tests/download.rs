use std::fs;
use std::sync::{Arc, Mutex};

use portal_engine::{EngineEvent, EventSink, FailureKind, FetchSettings, ReportDownloader};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[tokio::test]
async fn saves_report_and_emits_progress() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/export"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let downloader = ReportDownloader::new(FetchSettings::default(), temp.path().join("reports"));
    let sink = TestSink::default();
    let url = format!("{}/export", server.uri());

    let saved = downloader
        .download(4, &url, "security-report-2025-03-23-Dallas.pdf", &sink)
        .await
        .expect("download ok");
    assert_eq!(saved.file_name().unwrap(), "security-report-2025-03-23-Dallas.pdf");
    assert_eq!(fs::read(&saved).unwrap(), b"%PDF-1.7");

    let progress: Vec<u64> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::DownloadProgress { report_id: 4, bytes } => Some(bytes),
            _ => None,
        })
        .collect();
    assert_eq!(progress.last(), Some(&8));
}

#[tokio::test]
async fn oversized_report_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("01234567890"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let downloader = ReportDownloader::new(settings, temp.path().to_path_buf());
    let sink = TestSink::default();

    let err = downloader
        .download(1, &server.uri(), "report.pdf", &sink)
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
    assert!(!temp.path().join("report.pdf").exists());
}

#[tokio::test]
async fn missing_report_is_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let downloader = ReportDownloader::new(FetchSettings::default(), temp.path().to_path_buf());
    let err = downloader
        .download(2, &server.uri(), "report.pdf", &TestSink::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn path_like_filename_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pdf"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let downloader = ReportDownloader::new(FetchSettings::default(), temp.path().join("out"));
    let err = downloader
        .download(3, &server.uri(), "../escape.pdf", &TestSink::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
    assert!(!temp.path().join("escape.pdf").exists());
}
