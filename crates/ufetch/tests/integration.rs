//! Integration tests for ufetch using mockito

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use serde::{Deserialize, Serialize};
use serde_json::json;
use ufetch::{
    CancellationToken, Client, ClientConfig, Error, MultipartForm, RequestData, RequestOptions,
    RequestParams, TransportError,
};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestPayload {
    name: String,
    value: i32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestResponse {
    success: bool,
    data: String,
}

// === GET ===

#[tokio::test]
async fn test_get_with_query_data() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/items")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("filter".into(), "active".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("sort".into(), "desc".into()),
        ]))
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "data": "items"}"#)
        .create_async()
        .await;

    let client = Client::new(Some(server.url()), None);
    let url = format!("{}/items?filter=active", server.url());
    let response = client
        .get(
            RequestParams::new()
                .url(url)
                .data(json!({"page": "1", "sort": "desc"})),
        )
        .await
        .expect("Request should succeed");

    assert!(response.is_success());
    let body: TestResponse = response.json().expect("Valid JSON");
    assert_eq!(body.data, "items");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_uses_base_url() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_body("root")
        .create_async()
        .await;

    let client = Client::new(Some(server.url()), None);
    let response = client
        .get(RequestParams::new())
        .await
        .expect("Request should succeed");

    assert_eq!(response.text().expect("UTF-8 body"), "root");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/missing")
        .with_status(404)
        .with_body("Not Found")
        .create_async()
        .await;

    let client = Client::new(None, None);
    let response = client
        .get(RequestParams::new().url(format!("{}/api/missing", server.url())))
        .await
        .expect("A 404 is returned as a response");

    assert_eq!(response.status(), 404);
    assert!(response.is_client_error());
    assert_eq!(response.text().expect("UTF-8 body"), "Not Found");

    mock.assert_async().await;
}

// === Bodies ===

#[tokio::test]
async fn test_post_json_body() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/api/submit")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"name": "test", "value": 42})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "data": "received"}"#)
        .create_async()
        .await;

    let client = Client::new(Some(format!("{}/api/submit", server.url())), None);
    let payload = TestPayload {
        name: "test".to_string(),
        value: 42,
    };
    let response = client
        .post(RequestParams::new().data(RequestData::json(&payload).expect("Serializable")))
        .await
        .expect("Request should succeed");

    assert_eq!(response.status(), 201);
    let body: TestResponse = response.json().expect("Valid JSON");
    assert!(body.success);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_raw_text_keeps_caller_content_type() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/api/xml")
        .match_header("content-type", "application/xml")
        .match_body("<note>hi</note>")
        .with_status(200)
        .create_async()
        .await;

    let client = Client::new(None, None);
    client
        .post(
            RequestParams::new()
                .url(format!("{}/api/xml", server.url()))
                .data("<note>hi</note>")
                .headers([("Content-Type", "application/xml")]),
        )
        .await
        .expect("Request should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_put_form_body() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("PUT", "/api/form")
        .match_header(
            "content-type",
            Matcher::Regex("application/x-www-form-urlencoded.*".to_string()),
        )
        .match_body("field1=value1&field2=value+2")
        .with_status(204)
        .create_async()
        .await;

    let client = Client::new(None, None);
    let response = client
        .put(
            RequestParams::new()
                .url(format!("{}/api/form", server.url()))
                .data(
                    RequestData::form(&[("field1", "value1"), ("field2", "value 2")])
                        .expect("Valid form"),
                ),
        )
        .await
        .expect("Request should succeed");

    assert_eq!(response.status(), 204);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_patch_multipart_body() {
    let mut server = mockito::Server::new_async().await;

    let form = MultipartForm::new().text("title", "hello");
    let content_type = form.content_type();

    let mock = server
        .mock("PATCH", "/api/upload")
        .match_header("content-type", content_type.as_str())
        .match_body(Matcher::Regex("name=\"title\"\r\n\r\nhello".to_string()))
        .with_status(200)
        .create_async()
        .await;

    let client = Client::new(None, None);
    client
        .patch(
            RequestParams::new()
                .url(format!("{}/api/upload", server.url()))
                .data(form),
        )
        .await
        .expect("Request should succeed");

    mock.assert_async().await;
}

// === Headers and auth ===

#[tokio::test]
async fn test_default_headers_and_basic_auth() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("DELETE", "/api/resource")
        .match_header("x-app", "ufetch")
        .match_header("x-request", "1")
        .match_header("authorization", "Basic dTpw")
        .with_status(200)
        .create_async()
        .await;

    let mut client = Client::new(Some(format!("{}/api/resource", server.url())), None);
    client
        .set_bearer_authorization("t")
        .set_basic_authorization("u", "p")
        .add_default_header("X-App", "ufetch");

    client
        .delete(RequestParams::new().headers(vec![("X-Request", "1")]))
        .await
        .expect("Request should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_by_method_name() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("OPTIONS", "/")
        .match_header("authorization", "Bearer token123")
        .with_status(204)
        .create_async()
        .await;

    let config = ClientConfig {
        base_url: Some(server.url()),
        bearer_token: Some("token123".to_string()),
        ..Default::default()
    };
    let client = Client::from_config(config);
    let response = client
        .request(None, "options", None, None, None)
        .await
        .expect("Request should succeed");

    assert_eq!(response.status(), 204);

    mock.assert_async().await;
}

// === Unauthorized ===

#[tokio::test]
async fn test_unauthorized_triggers_navigator() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/private")
        .with_status(401)
        .with_body("Unauthorized")
        .create_async()
        .await;

    let navigations = Arc::new(AtomicUsize::new(0));
    let counter = navigations.clone();

    let mut client = Client::new(
        Some(format!("{}/api/private", server.url())),
        Some("/login".to_string()),
    );
    client.set_navigator(move |target: &str| {
        assert_eq!(target, "/login");
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let response = client
        .get(RequestParams::new())
        .await
        .expect("A 401 is returned as a response");

    assert_eq!(response.status(), 401);
    assert_eq!(navigations.load(Ordering::SeqCst), 1);

    mock.assert_async().await;
}

// === Transport failures ===

#[tokio::test]
async fn test_connection_refused_propagates() {
    let client = Client::new(Some("http://127.0.0.1:1/".to_string()), None);
    let result = client.get(RequestParams::new()).await;

    assert!(matches!(result, Err(Error::Transport(_))));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/api/flaky")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let client = Client::new(Some(format!("{}/api/flaky", server.url())), None);
    let response = client
        .post(RequestParams::new().data(json!({"a": 1})))
        .await
        .expect("A 503 is returned as a response");

    assert!(response.is_server_error());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancelled_request() {
    let token = CancellationToken::new();
    token.cancel();

    let client = Client::new(Some("http://127.0.0.1:1/".to_string()), None);
    let result = client
        .get(RequestParams::new().options(RequestOptions::default().with_cancel(token)))
        .await;

    assert!(matches!(
        result,
        Err(Error::Transport(TransportError::Cancelled))
    ));
}

#[tokio::test]
async fn test_timeout_is_passed_to_transport() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/fast")
        .with_status(200)
        .create_async()
        .await;

    let client = Client::new(None, None);
    let response = client
        .get(
            RequestParams::new()
                .url(format!("{}/api/fast", server.url()))
                .options(RequestOptions::default().with_timeout(Duration::from_secs(5))),
        )
        .await
        .expect("Request should succeed");

    assert!(response.is_success());

    mock.assert_async().await;
}
