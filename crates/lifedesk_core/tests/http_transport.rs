use lifedesk_core::transport::{ApiErrorKind, ApiRequest};
use lifedesk_core::{ApiClient, ClientConfig, Credentials};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves exactly one response and yields the raw request text.
async fn serve_once(status_line: &str, body: &str) -> (ApiClient, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let raw = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        raw
    });

    let config = ClientConfig::new(&format!("http://{addr}/api/v1"), std::env::temp_dir())
        .unwrap()
        .with_request_timeout(Duration::from_secs(5));
    (ApiClient::from_config(&config).unwrap(), server)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let read = socket.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
        let text = String::from_utf8_lossy(&buffer).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).to_string()
}

#[tokio::test]
async fn login_posts_form_without_authorization() {
    let (api, server) = serve_once("200 OK", r#"{"access_token":"tok-1","token_type":"bearer"}"#).await;

    let token = api.login(&Credentials::new("ada", "s3cret")).await.unwrap();

    let raw = server.await.unwrap();
    let lower = raw.to_ascii_lowercase();
    assert_eq!(token.access_token, "tok-1");
    assert!(raw.starts_with("POST /api/v1/token HTTP/1.1"));
    assert!(lower.contains("content-type: application/x-www-form-urlencoded"));
    assert!(raw.ends_with("username=ada&password=s3cret"));
    assert!(!lower.contains("authorization:"));
}

#[tokio::test]
async fn authenticated_get_sends_bearer_and_query() {
    let (api, server) = serve_once("200 OK", "[]").await;

    let rows: Vec<Value> = api
        .execute(
            ApiRequest::get("/expenses/")
                .with_query("period", "month")
                .with_query("value", "2024-05-01")
                .bearer("tok-2"),
        )
        .await
        .unwrap();

    let raw = server.await.unwrap();
    assert!(rows.is_empty());
    assert!(raw.starts_with("GET /api/v1/expenses/?period=month&value=2024-05-01 HTTP/1.1"));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer tok-2"));
}

#[tokio::test]
async fn json_body_is_sent_with_json_content_type() {
    let (api, server) = serve_once("200 OK", r#"{"id":9,"name":"Trip"}"#).await;

    let created: Value = api
        .execute(
            ApiRequest::post("/groups/")
                .with_json(&json!({"name": "Trip", "member_ids": [2]}))
                .unwrap()
                .bearer("tok-3"),
        )
        .await
        .unwrap();

    let raw = server.await.unwrap();
    assert_eq!(created["id"], 9);
    assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
    let body = raw.split("\r\n\r\n").nth(1).unwrap();
    let sent: Value = serde_json::from_str(body).unwrap();
    assert_eq!(sent, json!({"name": "Trip", "member_ids": [2]}));
}

#[tokio::test]
async fn string_detail_becomes_validation_message() {
    let (api, server) = serve_once("400 Bad Request", r#"{"detail":"Email already registered"}"#).await;

    let err = api
        .execute_unit(ApiRequest::post("/register").with_json(&json!({})).unwrap())
        .await
        .unwrap_err();
    server.await.unwrap();

    assert_eq!(err.kind, ApiErrorKind::Validation);
    assert_eq!(err.status, Some(400));
    assert_eq!(err.user_message(), "Email already registered");
}

#[tokio::test]
async fn validation_item_messages_are_joined() {
    let body = r#"{"detail":[{"loc":["body","amount"],"msg":"field required"},{"loc":["body","description"],"msg":"too short"}]}"#;
    let (api, server) = serve_once("422 Unprocessable Entity", body).await;

    let err = api
        .execute_unit(ApiRequest::post("/expenses/").bearer("tok"))
        .await
        .unwrap_err();
    server.await.unwrap();

    assert_eq!(err.kind, ApiErrorKind::Validation);
    assert_eq!(err.detail, "field required; too short");
}

#[tokio::test]
async fn unauthorized_maps_to_authentication() {
    let (api, server) =
        serve_once("401 Unauthorized", r#"{"detail":"Could not validate credentials"}"#).await;

    let err = api.current_user("expired").await.unwrap_err();
    server.await.unwrap();

    assert!(err.is_authentication());
    assert_eq!(err.user_message(), "Could not validate credentials");
}

#[tokio::test]
async fn non_json_error_body_is_generic_transport_failure() {
    let (api, server) = serve_once("500 Internal Server Error", "upstream exploded").await;

    let err = api.current_user("tok").await.unwrap_err();
    server.await.unwrap();

    assert_eq!(err.kind, ApiErrorKind::Transport);
    assert_eq!(err.status, Some(500));
    assert_eq!(err.user_message(), "Please try again later");
}

#[tokio::test]
async fn empty_success_body_is_accepted() {
    let (api, server) = serve_once("200 OK", "").await;

    api.execute_unit(ApiRequest::delete("/expenses/4").bearer("tok"))
        .await
        .unwrap();

    let raw = server.await.unwrap();
    assert!(raw.starts_with("DELETE /api/v1/expenses/4 HTTP/1.1"));
}

#[tokio::test]
async fn unreachable_server_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let config = ClientConfig::new(&format!("http://{addr}/api/v1"), std::env::temp_dir()).unwrap();
    let api = ApiClient::from_config(&config).unwrap();

    let err = api.current_user("tok").await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Transport);
    assert_eq!(err.status, None);
    assert_eq!(err.user_message(), "Please try again later");
}
