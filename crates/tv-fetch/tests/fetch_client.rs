// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use pretty_assertions::assert_eq;
use serde_json::json;
use tv_fetch::{FetchError, PayloadClient, PayloadFetch, PayloadQuery};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetch_returns_decoded_body_for_trimmed_query_value() {
    let server = MockServer::start().await;
    let body = json!({"cy": [], "meta": {"spec": "a.cy.ts"}});
    Mock::given(method("GET"))
        .and(path("/runs/a.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let param = format!("{}/runs/a.json", server.uri());
    let query = PayloadQuery::for_payload(&format!("  {param}  "));
    assert_eq!(query.payload(), Some(param.as_str()));
    let url = query.payload_url().expect("valid url").expect("payload present");
    let client = PayloadClient::new().expect("client");

    assert_eq!(client.fetch(&url).await.expect("fetch"), body);
}

#[tokio::test]
async fn not_found_is_a_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/a.json", server.uri())).expect("url");
    let client = PayloadClient::new().expect("client");
    let err = client.fetch(&url).await.unwrap_err();

    assert!(err.is_fetch_failure());
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    assert!(matches!(err, FetchError::Status { .. }));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).expect("url");
    let client = PayloadClient::new().expect("client");
    let err = client.fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Bind and drop a listener so the port is known to be closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let url = Url::parse(&format!("http://127.0.0.1:{port}/gone.json")).expect("url");
    let client = PayloadClient::new().expect("client");
    let err = client.fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
    assert!(err.is_fetch_failure());
}
