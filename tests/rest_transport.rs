use relic::client::rest::{RestClient, RestTransport};
use relic::errors::ToolErrorKind;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn get_appends_json_suffix_and_serializes_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/applications.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"applications": []})))
        .mount(&server)
        .await;

    let client = RestClient::with_base_url("test-api-key", &server.uri()).unwrap();
    let query = json!({
        "names": ["A", "B"],
        "single": "x",
        "skipped": null,
    });
    let response = client
        .get("/applications", query.as_object())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({"applications": []}));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let raw_query = requests[0].url.query().unwrap_or("");
    assert!(raw_query.contains("names%5B%5D=A"), "got {}", raw_query);
    assert!(raw_query.contains("names%5B%5D=B"), "got {}", raw_query);
    assert!(raw_query.contains("single=x"), "got {}", raw_query);
    assert!(!raw_query.contains("skipped"), "got {}", raw_query);
    let api_key = requests[0].headers.get("Api-Key").unwrap();
    assert_eq!(api_key.to_str().unwrap(), "test-api-key");
}

#[tokio::test]
async fn link_header_is_parsed_into_relations() {
    let server = MockServer::start().await;
    let next = format!("{}/alerts_incidents.json?page=2", server.uri());
    let last = format!("{}/alerts_incidents.json?page=9", server.uri());
    Mock::given(method("GET"))
        .and(path("/alerts_incidents.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header(
                    "Link",
                    format!(r#"<{}>; rel="next", <{}>; rel="last""#, next, last).as_str(),
                ),
        )
        .mount(&server)
        .await;

    let client = RestClient::with_base_url("test-api-key", &server.uri()).unwrap();
    let response = client.get("/alerts_incidents", None).await.unwrap();

    assert_eq!(response.links.len(), 2);
    assert_eq!(response.links.get("next"), Some(&next));
    assert_eq!(response.links.get("last"), Some(&last));
}

#[tokio::test]
async fn non_ok_response_fails_after_body_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/applications.json"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": {"title": "boom"}})),
        )
        .mount(&server)
        .await;

    let client = RestClient::with_base_url("test-api-key", &server.uri()).unwrap();
    let err = client.get("/applications", None).await.unwrap_err();

    assert_eq!(err.kind, ToolErrorKind::Api);
    assert_eq!(err.message, "REST API error: 500 Internal Server Error");
    assert_eq!(err.details.unwrap()["status"], 500);
}

#[tokio::test]
async fn non_json_failure_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/applications.json"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = RestClient::with_base_url("test-api-key", &server.uri()).unwrap();
    let err = client.get("/applications", None).await.unwrap_err();

    // Decoding happens before the OK check, so the decode failure wins.
    assert_eq!(err.kind, ToolErrorKind::Internal);
    assert!(err.message.contains("decode"));
}

#[tokio::test]
async fn post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/applications/7/deployments.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"deployment": {"id": 1}})))
        .mount(&server)
        .await;

    let client = RestClient::with_base_url("test-api-key", &server.uri()).unwrap();
    let body = json!({"deployment": {"revision": "abc123"}});
    let response = client
        .post("/applications/7/deployments", &body)
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent, body);
}

#[tokio::test]
async fn delete_issues_a_delete_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/applications/7/deployments/3.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = RestClient::with_base_url("test-api-key", &server.uri()).unwrap();
    let response = client.delete("/applications/7/deployments/3").await.unwrap();
    assert_eq!(response.status, 200);
}
