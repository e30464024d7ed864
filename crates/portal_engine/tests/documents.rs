use portal_engine::{DocumentSource, DocumentsSettings, FailureKind, FetchSettings, RestDocumentSource};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(base_url: String, api_key: Option<&str>) -> RestDocumentSource {
    RestDocumentSource::new(DocumentsSettings {
        base_url,
        table: "documents".into(),
        api_key: api_key.map(str::to_string),
        fetch: FetchSettings::default(),
    })
}

#[test]
fn query_url_selects_latest_rows() {
    let url = source("https://db.example.com/".into(), None)
        .query_url(20)
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://db.example.com/rest/v1/documents?select=id%2Ccontent%2Cmetadata&order=id.desc&limit=20"
    );
}

#[tokio::test]
async fn fetches_rows_with_api_key_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/documents"))
        .and(query_param("select", "id,content,metadata"))
        .and(query_param("order", "id.desc"))
        .and(query_param("limit", "20"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 9, "content": "Gate alarm 2025-03-20", "metadata": {"location": "Dallas"}},
            {"id": 8, "content": null, "metadata": null}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = source(server.uri(), Some("anon-key"))
        .fetch_latest(20)
        .await
        .expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, 9);
    assert_eq!(rows[0].content.as_deref(), Some("Gate alarm 2025-03-20"));
    assert_eq!(rows[0].metadata, Some(json!({"location": "Dallas"})));
    assert_eq!(rows[1].content, None);
}

#[tokio::test]
async fn non_array_body_is_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;

    let err = source(server.uri(), None).fetch_latest(5).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidJson);
}

#[tokio::test]
async fn unauthorized_is_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = source(server.uri(), Some("bad")).fetch_latest(5).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(401));
}

#[tokio::test]
async fn blank_base_url_is_not_configured() {
    let err = source("  ".into(), None).fetch_latest(5).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::NotConfigured);
}
