use std::time::Duration;

use portal_engine::{
    CsvPayload, DateParams, FailureKind, FetchSettings, ReportQuery, ReportWebhook,
    ReqwestWebhook, WebhookMode, WebhookSettings,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer, mode: WebhookMode) -> WebhookSettings {
    WebhookSettings {
        url: format!("{}/webhook/security-report", server.uri()),
        mode,
        fetch: FetchSettings::default(),
    }
}

fn query(date: DateParams) -> ReportQuery {
    ReportQuery {
        location: "Dallas".to_string(),
        date,
        email: "ops@example.com".to_string(),
        csv: None,
    }
}

fn reply() -> serde_json::Value {
    json!({
        "location": "Dallas",
        "date": "2025-03-23",
        "email": "ops@example.com",
        "urlOfSecurityReport": "https://docs.google.com/document/d/abc/edit"
    })
}

#[tokio::test]
async fn get_mode_sends_single_date_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/webhook/security-report"))
        .and(query_param("location", "Dallas"))
        .and(query_param("date", "2025-03-23"))
        .and(query_param("email", "ops@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply()))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = ReqwestWebhook::new(settings(&server, WebhookMode::Get));
    let body = webhook
        .submit(&query(DateParams::Single("2025-03-23".into())))
        .await
        .expect("reply");
    assert_eq!(body, reply());
}

#[tokio::test]
async fn get_mode_sends_range_and_option_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("dateFrom", "2025-03-01"))
        .and(query_param("dateTo", "2025-03-07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("dateOption", "Next 7 Days"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply()))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = ReqwestWebhook::new(settings(&server, WebhookMode::Get));
    webhook
        .submit(&query(DateParams::Range {
            from: "2025-03-01".into(),
            to: "2025-03-07".into(),
        }))
        .await
        .expect("range reply");
    webhook
        .submit(&query(DateParams::Option("Next 7 Days".into())))
        .await
        .expect("option reply");
}

#[tokio::test]
async fn json_mode_posts_fields_as_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/security-report"))
        .and(body_json(json!({
            "location": "Dallas",
            "date": "2025-03-23",
            "email": "ops@example.com",
            "csvContent": "a,b\n1,2\n"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply()))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = query(DateParams::Single("2025-03-23".into()));
    request.csv = Some(CsvPayload {
        filename: "incidents.csv".into(),
        content: "a,b\n1,2\n".into(),
    });
    let webhook = ReqwestWebhook::new(settings(&server, WebhookMode::Json));
    webhook.submit(&request).await.expect("reply");
}

#[tokio::test]
async fn multipart_mode_attaches_csv_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"location\""))
        .and(body_string_contains("filename=\"incidents.csv\""))
        .and(body_string_contains("a,b\n1,2\n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply()))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = query(DateParams::Single("2025-03-23".into()));
    request.csv = Some(CsvPayload {
        filename: "incidents.csv".into(),
        content: "a,b\n1,2\n".into(),
    });
    let webhook = ReqwestWebhook::new(settings(&server, WebhookMode::Multipart));
    webhook.submit(&request).await.expect("reply");
}

#[tokio::test]
async fn server_error_is_reported_as_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let webhook = ReqwestWebhook::new(settings(&server, WebhookMode::Get));
    let err = webhook
        .submit(&query(DateParams::Single("2025-03-23".into())))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn non_json_reply_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>workflow started</html>"))
        .mount(&server)
        .await;

    let webhook = ReqwestWebhook::new(settings(&server, WebhookMode::Get));
    let err = webhook
        .submit(&query(DateParams::Single("2025-03-23".into())))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidJson);
}

#[tokio::test]
async fn slow_webhook_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(reply()),
        )
        .mount(&server)
        .await;

    let mut settings = settings(&server, WebhookMode::Get);
    settings.fetch.request_timeout = Duration::from_millis(50);
    let webhook = ReqwestWebhook::new(settings);
    let err = webhook
        .submit(&query(DateParams::Single("2025-03-23".into())))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn empty_url_is_not_configured() {
    let webhook = ReqwestWebhook::new(WebhookSettings {
        url: String::new(),
        mode: WebhookMode::Get,
        fetch: FetchSettings::default(),
    });
    let err = webhook
        .submit(&query(DateParams::Single("2025-03-23".into())))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotConfigured);
}
