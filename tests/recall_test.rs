//! Recall lookup against a local mock of the FSIS endpoint.

use std::net::TcpListener;

use fsis_recall::{BROWSER_USER_AGENT, LookupError, RecallQuery, RecallResponse};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECALL_PATH: &str = "/fsis/api/recall/v/1";

async fn send(query: RecallQuery) -> Result<RecallResponse, String> {
    tokio::task::spawn_blocking(move || query.send().map_err(|e| e.to_string()))
        .await
        .unwrap()
}

fn query_for(server: &MockServer) -> fsis_recall::RecallQueryBuilder {
    RecallQuery::builder().endpoint(format!("{}{}", server.uri(), RECALL_PATH))
}

#[tokio::test]
async fn ok_response_returns_status_and_raw_body() {
    let body = r#"[{"field_title":"Example Recall","field_states":"California"}]"#;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECALL_PATH))
        .and(query_param("field_states_id", "29"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let response = send(query_for(&server).build()).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, body);
    assert_eq!(response.to_string(), format!("200\n{}", body));
}

#[tokio::test]
async fn sends_browser_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    send(query_for(&server).build()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let user_agent = requests[0]
        .headers
        .get("user-agent")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(user_agent, BROWSER_USER_AGENT);
}

#[tokio::test]
async fn error_status_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECALL_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let response = send(query_for(&server).build()).await.unwrap();
    assert_eq!(response.status, 503);
    assert_eq!(response.body, "maintenance");
    assert!(!response.is_success());
}

#[tokio::test]
async fn state_and_closed_year_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECALL_PATH))
        .and(query_param("field_states_id", "5"))
        .and(query_param("field_closed_year_id", "446"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let query = query_for(&server)
        .state_id("5")
        .closed_year_id("446")
        .build();
    let response = send(query).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "[]");
}

#[tokio::test]
async fn large_body_is_returned_whole() {
    let body = format!("[{}]", "{\"field_title\":\"x\"},".repeat(11 * 1024 * 1024 / 18));
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECALL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&server)
        .await;

    let response = send(query_for(&server).build()).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(response.body.len() > 10 * 1024 * 1024);
    assert_eq!(response.body, body);
}

#[test]
fn unreachable_endpoint_is_a_transport_error() {
    // Bind then drop to get a local port nothing listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let query = RecallQuery::builder()
        .endpoint(format!("http://127.0.0.1:{}{}", port, RECALL_PATH))
        .build();

    let err = query.send().unwrap_err();
    assert!(matches!(err, LookupError::TransportError(_)));
    assert!(err.to_string().starts_with("Transport error: "));
}
