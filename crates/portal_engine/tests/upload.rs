use portal_engine::{CsvUpload, CsvUploader, FailureKind, FetchSettings, UploadBody};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn upload() -> CsvUpload {
    CsvUpload {
        filename: "guards.csv".into(),
        content: "name,shift\nKim,night\n".into(),
        timestamp: "2025-03-23T10:00:00+00:00".into(),
    }
}

#[tokio::test]
async fn multipart_upload_sends_file_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/upload"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"guards.csv\""))
        .and(body_string_contains("Kim,night"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let uploader = CsvUploader::new(
        Some(format!("{}/webhook/upload", server.uri())),
        FetchSettings::default(),
    );
    let receipt = uploader
        .upload(&upload(), None, UploadBody::Multipart)
        .await
        .expect("receipt");
    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.body, Some(json!({"ok": true})));
}

#[tokio::test]
async fn json_upload_uses_override_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/other"))
        .and(body_json(json!({
            "filename": "guards.csv",
            "csvData": "name,shift\nKim,night\n",
            "timestamp": "2025-03-23T10:00:00+00:00"
        })))
        .respond_with(ResponseTemplate::new(202).set_body_string("accepted"))
        .expect(1)
        .mount(&server)
        .await;

    let uploader = CsvUploader::new(Some("http://127.0.0.1:1/unused".into()), FetchSettings::default());
    let override_url = format!("{}/other", server.uri());
    let receipt = uploader
        .upload(&upload(), Some(&override_url), UploadBody::Json)
        .await
        .expect("receipt");
    assert_eq!(receipt.status, 202);
    assert_eq!(receipt.body, None);
}

#[tokio::test]
async fn rejected_upload_is_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let uploader = CsvUploader::new(Some(server.uri()), FetchSettings::default());
    let err = uploader
        .upload(&upload(), None, UploadBody::Multipart)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(413));
}

#[tokio::test]
async fn missing_webhook_is_not_configured() {
    let uploader = CsvUploader::new(None, FetchSettings::default());
    let err = uploader
        .upload(&upload(), None, UploadBody::Json)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotConfigured);
}
