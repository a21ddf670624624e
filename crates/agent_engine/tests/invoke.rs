use agent_engine::{AgentClient, AgentSettings, InvocationError, Invoker};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AgentClient {
    let settings = AgentSettings::new(&server.uri()).expect("settings");
    AgentClient::new(settings).expect("client")
}

#[tokio::test]
async fn invoke_returns_acknowledgment_unchanged() {
    agent_logging::initialize_for_tests();
    let query = "441000205 の 2025-04-20 12時〜13時の ru";
    let response = json!({
        "parsed": {
            "tag_id": "441000205",
            "start_dt": "2025-04-20T12:00:00",
            "end_dt": "2025-04-20T13:00:00"
        },
        "files": ["out.csv"]
    });

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent/invoke"))
        .and(header("content-type", "application/json"))
        .and(header("cache-control", "no-store"))
        .and(body_json(json!({ "input": { "input": query } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let invocation = client_for(&server).invoke(query).await.expect("invoke ok");
    assert_eq!(invocation.parsed.tag_id, "441000205");
    assert_eq!(invocation.files, vec!["out.csv".to_string()]);
    assert_eq!(serde_json::to_value(&invocation).unwrap(), response);
}

#[tokio::test]
async fn rejection_carries_raw_body_text() {
    agent_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent/invoke"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("Error: insufficient keys → {'tag_id': None}"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).invoke("hello").await.unwrap_err();
    assert_eq!(
        err,
        InvocationError::Rejected {
            status: 500,
            body: "Error: insufficient keys → {'tag_id': None}".to_string(),
        }
    );
    assert_eq!(err.to_string(), "Error: insufficient keys → {'tag_id': None}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn empty_query_is_forwarded_as_is() {
    agent_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent/invoke"))
        .and(body_json(json!({ "input": { "input": "" } })))
        .respond_with(ResponseTemplate::new(422).set_body_string("input must not be empty"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).invoke("").await.unwrap_err();
    assert_eq!(err.to_string(), "input must not be empty");
}

#[tokio::test]
async fn missing_backend_is_unreachable_not_rejected() {
    agent_logging::initialize_for_tests();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let settings = AgentSettings::new(&format!("http://127.0.0.1:{port}")).unwrap();
    let client = AgentClient::new(settings).unwrap();

    let err = client.invoke("441000205").await.unwrap_err();
    assert!(matches!(err, InvocationError::Unreachable(_)), "{err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn success_with_unexpected_body_is_malformed() {
    agent_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent/invoke"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).invoke("x").await.unwrap_err();
    assert!(matches!(err, InvocationError::MalformedResponse(_)));
}

#[tokio::test]
async fn health_check_reads_status() {
    agent_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let health = client_for(&server).health().await.expect("health ok");
    assert!(health.is_ok());
}
