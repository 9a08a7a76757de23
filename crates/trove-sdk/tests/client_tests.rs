//! Mock-based tests for the HTTP client: authentication, status mapping,
//! caching and response decoding.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trove_sdk::client::{TitleListOptions, TitleOptions};
use trove_sdk::models::{Encoding, RecordType, TitleKind};
use trove_sdk::{
    AnyRecord, Category, ClientError, Config, Pid, RecordOptions, Resolved, SearchBuilder,
    SearchParams, SortBy, TroveClient,
};

fn client_for(server: &MockServer) -> TroveClient {
    TroveClient::new(Config::for_testing(&server.uri())).unwrap()
}

fn book_page(total: u64, next: Option<&str>, ids: &[&str]) -> serde_json::Value {
    let works: Vec<_> = ids
        .iter()
        .map(|id| json!({"id": id, "title": format!("Work {id}"), "issued": "1901"}))
        .collect();
    json!({
        "query": "federation",
        "category": [{
            "code": "book",
            "name": "Books & Libraries",
            "records": {"s": "*", "n": ids.len(), "total": total, "nextStart": next, "work": works}
        }]
    })
}

// =============================================================================
// Requests
// =============================================================================

#[tokio::test]
async fn test_search_sends_key_and_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/result"))
        .and(header("X-API-KEY", "test-key"))
        .and(query_param("q", "federation"))
        .and(query_param("category", "book"))
        .and(query_param("l-decade", "190"))
        .and(query_param("n", "5"))
        .and(query_param_is_missing("sortby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(book_page(42, Some("abc"), &["1", "2"])))
        .expect(1)
        .mount(&server)
        .await;

    let response = SearchBuilder::new()
        .text("federation")
        .category(Category::Book)
        .decade(190)
        .page_size(5)
        .send(&client_for(&server))
        .await
        .unwrap();

    assert_eq!(response.total_results(), 42);
    assert_eq!(response.next_cursor(Category::Book), Some("abc"));
    let records = response.records(Category::Book);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].display_title(), "Work 1");
}

#[tokio::test]
async fn test_invalid_params_never_reach_the_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut params = SearchParams::new("gold", &[Category::Book, Category::Newspaper]);
    params.cursor = Some("abc".to_string());

    let err = client_for(&server).search(&params).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation { ref field, .. } if field == "s"));
}

#[tokio::test]
async fn test_missing_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = Config::for_testing(&server.uri());
    config.api_key = None;
    let client = TroveClient::new(config).unwrap();

    assert!(!client.has_api_key());
    let err = client.get_work("123", &RecordOptions::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::MissingApiKey));
}

// =============================================================================
// Status mapping
// =============================================================================

async fn error_for(status: u16, extra: Option<(&str, &str)>) -> ClientError {
    let server = MockServer::start().await;
    let mut template = ResponseTemplate::new(status).set_body_string("nope");
    if let Some((name, value)) = extra {
        template = template.insert_header(name, value);
    }
    Mock::given(method("GET")).respond_with(template).mount(&server).await;

    client_for(&server).get_work("123", &RecordOptions::default()).await.unwrap_err()
}

#[tokio::test]
async fn test_unauthorized() {
    let err = error_for(401, None).await;
    assert!(matches!(err, ClientError::Unauthorized { status: 401, .. }));
    assert!(!err.is_retryable());

    let err = error_for(403, None).await;
    assert!(matches!(err, ClientError::Unauthorized { status: 403, .. }));
}

#[tokio::test]
async fn test_not_found_names_the_path() {
    let err = error_for(404, None).await;
    match err {
        ClientError::NotFound { resource } => assert_eq!(resource, "/work/123"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_reads_retry_after() {
    let err = error_for(429, Some(("Retry-After", "17"))).await;
    assert!(err.is_retryable());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(17)));

    let err = error_for(429, None).await;
    assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));
}

#[tokio::test]
async fn test_bad_request_and_server_errors() {
    let err = error_for(400, None).await;
    assert!(matches!(err, ClientError::BadRequest { ref message } if message == "nope"));

    let err = error_for(503, None).await;
    assert!(matches!(err, ClientError::Server { status: 503, .. }));
    assert!(err.is_retryable());

    let err = error_for(418, None).await;
    assert!(matches!(err, ClientError::UnexpectedStatus { status: 418, .. }));
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn test_identical_requests_are_served_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/work/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "123", "title": "Cached"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config::for_testing(&server.uri()).with_cache(Duration::from_secs(60), 100);
    let client = TroveClient::new(config).unwrap();

    let first = client.get_work("123", &RecordOptions::default()).await.unwrap();
    let second = client.get_work("123", &RecordOptions::default()).await.unwrap();

    assert_eq!(first.title.as_deref(), Some("Cached"));
    assert_eq!(second.title.as_deref(), Some("Cached"));
    assert_eq!(client.cache_entry_count().await, 1);
}

#[tokio::test]
async fn test_different_options_are_cached_separately() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/work/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "123"})))
        .expect(2)
        .mount(&server)
        .await;

    let config = Config::for_testing(&server.uri()).with_cache(Duration::from_secs(60), 100);
    let client = TroveClient::new(config).unwrap();

    client.get_work("123", &RecordOptions::default()).await.unwrap();
    client.get_work("123", &RecordOptions::full()).await.unwrap();
    client.get_work("123", &RecordOptions::full()).await.unwrap();
}

#[tokio::test]
async fn test_query_text_with_separators_is_cached_apart() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/result"))
        .and(query_param("q", "gold&sortby=dateasc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(book_page(1, None, &["1"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/result"))
        .and(query_param("q", "gold"))
        .and(query_param("sortby", "dateasc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(book_page(2, None, &["2", "3"])))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config::for_testing(&server.uri()).with_cache(Duration::from_secs(60), 100);
    let client = TroveClient::new(config).unwrap();

    let literal = SearchBuilder::new()
        .text("gold&sortby=dateasc")
        .category(Category::Book)
        .send(&client)
        .await
        .unwrap();
    let sorted = SearchBuilder::new()
        .text("gold")
        .category(Category::Book)
        .sort(SortBy::DateAsc)
        .send(&client)
        .await
        .unwrap();

    assert_eq!(literal.total_results(), 1);
    assert_eq!(sorted.total_results(), 2);
    assert_eq!(client.cache_entry_count().await, 2);
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/people/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "5"})))
        .expect(2)
        .mount(&server)
        .await;

    let config = Config::for_testing(&server.uri()).with_cache(Duration::from_secs(60), 100);
    let client = TroveClient::new(config).unwrap();

    client.get_people("5", &RecordOptions::default()).await.unwrap();
    client.clear_cache();
    client.get_people("5", &RecordOptions::default()).await.unwrap();
}

// =============================================================================
// Records, titles and contributors
// =============================================================================

#[tokio::test]
async fn test_get_record_dispatches_by_type() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/newspaper/18341291"))
        .and(query_param("reclevel", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "18341291",
            "heading": "THE COMMONWEALTH.",
            "title": {"id": "35", "title": "The Sydney Morning Herald (NSW : 1842 - 1954)"},
            "date": "1901-01-01",
            "page": "7"
        })))
        .mount(&server)
        .await;

    let record = client_for(&server)
        .get_record(RecordType::Newspaper, "18341291", &RecordOptions::full())
        .await
        .unwrap();

    assert_eq!(record.kind(), "article");
    assert_eq!(record.display_title(), "THE COMMONWEALTH.");
    match record {
        AnyRecord::Article(article) => assert_eq!(article.page.as_deref(), Some("7")),
        other => panic!("expected article, got {}", other.kind()),
    }
}

#[tokio::test]
async fn test_get_works_keeps_input_order() {
    let server = MockServer::start().await;

    for id in ["1", "2", "3"] {
        Mock::given(method("GET"))
            .and(path(format!("/work/{id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": id}))
                    .set_delay(Duration::from_millis(if id == "1" { 50 } else { 0 })),
            )
            .mount(&server)
            .await;
    }

    let ids: Vec<String> = ["1", "2", "3"].iter().map(ToString::to_string).collect();
    let works = client_for(&server).get_works(&ids, &RecordOptions::default()).await.unwrap();
    let got: Vec<_> = works.iter().map(|w| w.id.clone().unwrap_or_default()).collect();
    assert_eq!(got, ["1", "2", "3"]);
}

#[tokio::test]
async fn test_path_traversal_rejected() {
    let server = MockServer::start().await;
    let err = client_for(&server)
        .get_work("../result", &RecordOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation { ref field, .. } if field == "id"));
}

#[tokio::test]
async fn test_titles_and_contributors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/newspaper/titles"))
        .and(query_param("state", "vic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "newspaper": [{"id": "13", "title": "The Argus (Melbourne, Vic. : 1848 - 1957)", "state": "Victoria"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/newspaper/title/13"))
        .and(query_param("include", "years"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "13",
            "title": "The Argus (Melbourne, Vic. : 1848 - 1957)",
            "year": [{"date": "1901", "issuecount": 310}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/contributor"))
        .and(query_param("q", "national"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "contributor": [{"id": "ANL", "name": "National Library of Australia"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let options = TitleListOptions { state: Some("vic".to_string()), ..TitleListOptions::default() };
    let titles = client.list_titles(TitleKind::Newspaper, &options).await.unwrap();
    assert_eq!(titles.titles.len(), 1);
    assert_eq!(titles.titles[0].state.as_deref(), Some("Victoria"));

    let options = TitleOptions { include_years: true, range: None };
    let title = client.get_title(TitleKind::Newspaper, "13", &options).await.unwrap();
    assert_eq!(title.id.as_deref(), Some("13"));
    assert_eq!(title.year[0].issuecount, Some(310));

    let contributors = client.search_contributors("  national ").await.unwrap();
    assert_eq!(contributors.contributor.len(), 1);
    assert_eq!(contributors.contributor[0].display_name(), "National Library of Australia");
}

// =============================================================================
// PID resolution
// =============================================================================

#[tokio::test]
async fn test_resolve_pid_to_record_and_title() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/newspaper/18341291"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "18341291", "heading": "X"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/newspaper/title/35"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "35", "title": "SMH"})))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let pid = Pid::parse("https://nla.gov.au/nla.news-article18341291").unwrap();
    let resolved = client.resolve_pid(&pid, &RecordOptions::default()).await.unwrap();
    assert!(matches!(resolved, Resolved::Record(AnyRecord::Article(_))));

    let pid = Pid::parse("nla.news-title35").unwrap();
    let resolved = client.resolve_pid(&pid, &RecordOptions::default()).await.unwrap();
    assert!(matches!(resolved, Resolved::Title(_)));

    let pid = Pid::parse("nla.obj-123456").unwrap();
    let err = client.resolve_pid(&pid, &RecordOptions::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation { ref field, .. } if field == "pid"));
}

// =============================================================================
// XML encoding
// =============================================================================

#[tokio::test]
async fn test_xml_encoding_decodes_to_the_same_models() {
    let server = MockServer::start().await;

    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <query>federation</query>
  <category code="book" name="Books &amp; Libraries">
    <records s="*" n="2" total="57" nextStart="AoE/xyz">
      <work id="11"><title>Federation &amp; Empire</title><issued>1900</issued></work>
      <work id="12"><title>Second</title></work>
    </records>
  </category>
</response>"#;

    Mock::given(method("GET"))
        .and(path("/result"))
        .and(query_param("encoding", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let response = SearchBuilder::new()
        .text("federation")
        .category(Category::Book)
        .encoding(Encoding::Xml)
        .send(&client_for(&server))
        .await
        .unwrap();

    assert_eq!(response.total_results(), 57);
    assert_eq!(response.next_cursor(Category::Book), Some("AoE/xyz"));
    let records = response.records(Category::Book);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].display_title(), "Federation & Empire");
}

#[tokio::test]
async fn test_malformed_xml_is_an_xml_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/work/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<work><id>1</title></work>"))
        .mount(&server)
        .await;

    let options = RecordOptions { encoding: Encoding::Xml, ..RecordOptions::default() };
    let err = client_for(&server).get_work("1", &options).await.unwrap_err();
    assert!(matches!(err, ClientError::Xml(_)));
}
