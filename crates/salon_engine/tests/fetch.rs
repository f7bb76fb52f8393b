use std::time::Duration;

use pretty_assertions::assert_eq;
use salon_core::{Collection, ListFilter, PageRequest, RecordId, VIEW_PAGE_SIZE};
use salon_engine::{ClientSettings, FailureKind, PageSource, ReqwestPageSource};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: format!("{}/api", server.uri()),
        ..ClientSettings::default()
    }
}

#[tokio::test]
async fn page_request_carries_query_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "20"))
        .and(query_param("search", "Anna K"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": 21, "name": "Anna Karenina", "visit_count": 4},
                {"id": "c-22", "name": "Anna Kowalska", "visit_count": null}
            ],
            "total": 22
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = ReqwestPageSource::new(ClientSettings {
        auth_token: Some("secret".to_string()),
        ..settings(&server)
    })
    .unwrap();
    let filter = ListFilter::from_input(Some("Anna K"), None).unwrap();

    let page = source
        .fetch_page(
            &Collection::Clients,
            PageRequest::new(2, VIEW_PAGE_SIZE),
            filter.as_ref(),
        )
        .await
        .expect("fetch ok");

    assert_eq!(page.total, 22);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, RecordId::Int(21));
    assert_eq!(page.items[1].id, RecordId::Text("c-22".to_string()));
    assert_eq!(page.items[0].display_field("name"), "Anna Karenina");
    assert_eq!(page.items[1].display_field("visit_count"), "");
}

#[tokio::test]
async fn recipients_endpoint_is_nested_under_broadcast() {
    let server = MockServer::start().await;
    let source = ReqwestPageSource::new(settings(&server)).unwrap();

    let url = source
        .page_url(
            &Collection::BroadcastRecipients { broadcast_id: 42 },
            PageRequest::first(VIEW_PAGE_SIZE),
            None,
        )
        .unwrap();

    assert_eq!(url.path(), "/api/broadcasts/42/recipients");
    assert_eq!(url.query(), Some("page=1&page_size=20"));
}

async fn failing_status(status: u16) -> FailureKind {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;

    let source = ReqwestPageSource::new(settings(&server)).unwrap();
    source
        .fetch_page(&Collection::Users, PageRequest::first(VIEW_PAGE_SIZE), None)
        .await
        .unwrap_err()
        .kind
}

#[tokio::test]
async fn auth_failures_are_classified() {
    assert_eq!(failing_status(401).await, FailureKind::Unauthorized);
    assert_eq!(failing_status(403).await, FailureKind::Forbidden);
    assert_eq!(failing_status(500).await, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/promotions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let source = ReqwestPageSource::new(settings(&server)).unwrap();
    let err = source
        .fetch_page(
            &Collection::Promotions,
            PageRequest::first(VIEW_PAGE_SIZE),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn body_without_total_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 1}, {"id": 2}, {"id": 3}]
        })))
        .mount(&server)
        .await;

    let source = ReqwestPageSource::new(settings(&server)).unwrap();
    let err = source
        .fetch_page(&Collection::Clients, PageRequest::first(VIEW_PAGE_SIZE), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
    assert!(err.message.contains("total"), "{}", err.message);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"items": [], "total": 0})),
        )
        .mount(&server)
        .await;

    let source = ReqwestPageSource::new(ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..settings(&server)
    })
    .unwrap();

    let err = source
        .fetch_page(&Collection::Clients, PageRequest::first(VIEW_PAGE_SIZE), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"items": [], "total": 0}"#),
        )
        .mount(&server)
        .await;

    let source = ReqwestPageSource::new(ClientSettings {
        max_bytes: 10,
        ..settings(&server)
    })
    .unwrap();

    let err = source
        .fetch_page(&Collection::Clients, PageRequest::first(VIEW_PAGE_SIZE), None)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 10, .. }));
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestPageSource::new(ClientSettings {
        base_url: "not a url".to_string(),
        ..ClientSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
