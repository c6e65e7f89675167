mod common;

use common::FakeTransport;
use lifedesk_core::model::forms::RegisterForm;
use lifedesk_core::session::{SessionStorage, SqliteSessionStorage};
use lifedesk_core::transport::{ApiError, ApiErrorKind, RequestBody};
use lifedesk_core::{ApiClient, Credentials, SessionError, SessionState, SessionStore};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

fn profile() -> Value {
    json!({
        "id": 7,
        "username": "ada",
        "email": "ada@example.com",
        "age": 36,
        "gender": null,
        "country": "UK",
        "is_active": true
    })
}

fn store_at(path: &Path) -> SessionStore {
    SessionStore::restore(Box::new(SqliteSessionStorage::open(path).unwrap())).unwrap()
}

fn api(transport: &Arc<FakeTransport>) -> ApiClient {
    ApiClient::new(transport.clone())
}

#[tokio::test]
async fn login_persists_token_and_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.sqlite3");
    let transport = FakeTransport::new();
    transport.reply("POST /token", json!({"access_token": "abc", "token_type": "bearer"}));
    transport.reply("GET /me", profile());
    let mut store = store_at(&path);
    let reader = store.reader();

    let user = store
        .login(&api(&transport), &Credentials::new("ada", "s3cret"))
        .await
        .unwrap();

    assert_eq!(user.id, 7);
    assert_eq!(reader.token().as_deref(), Some("abc"));
    assert_eq!(reader.profile().map(|p| p.username), Some("ada".to_string()));

    let requests = transport.requests();
    assert_eq!(
        requests[0].body,
        RequestBody::Form(vec![
            ("username".to_string(), "ada".to_string()),
            ("password".to_string(), "s3cret".to_string()),
        ])
    );
    assert_eq!(requests[0].token, None);
    assert_eq!(requests[1].token.as_deref(), Some("abc"));

    let restored = store_at(&path);
    match restored.state() {
        SessionState::Authenticated { token, profile } => {
            assert_eq!(token, "abc");
            assert_eq!(profile.unwrap().country.as_deref(), Some("UK"));
        }
        SessionState::Anonymous => panic!("session should survive a restart"),
    }
}

#[tokio::test]
async fn profile_failure_leaves_session_anonymous_and_unpersisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.sqlite3");
    let transport = FakeTransport::new();
    transport.reply("POST /token", json!({"access_token": "abc"}));
    transport.fail("GET /me", ApiError::from_status(401, "Could not validate credentials"));
    let mut store = store_at(&path);

    let err = store
        .login(&api(&transport), &Credentials::new("ada", "s3cret"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Api(ref api_err) if api_err.is_authentication()));
    assert_eq!(store.state(), SessionState::Anonymous);
    let storage = SqliteSessionStorage::open(&path).unwrap();
    assert!(storage.load().unwrap().is_none());
}

#[tokio::test]
async fn failed_relogin_keeps_existing_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.sqlite3");
    let transport = FakeTransport::new();
    transport.reply("POST /token", json!({"access_token": "abc"}));
    transport.reply("GET /me", profile());
    transport.fail("POST /token", ApiError::from_status(401, "Incorrect username or password"));
    let mut store = store_at(&path);
    store
        .login(&api(&transport), &Credentials::new("ada", "s3cret"))
        .await
        .unwrap();

    let err = store
        .login(&api(&transport), &Credentials::new("ada", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Incorrect username or password");
    assert_eq!(store.reader().token().as_deref(), Some("abc"));
    let persisted = SqliteSessionStorage::open(&path).unwrap().load().unwrap().unwrap();
    assert_eq!(persisted.token, "abc");
}

#[tokio::test]
async fn missing_access_token_is_a_codec_failure() {
    let transport = FakeTransport::new();
    transport.reply("POST /token", json!({"token_type": "bearer"}));
    let mut store =
        SessionStore::restore(Box::new(SqliteSessionStorage::in_memory().unwrap())).unwrap();

    let err = store
        .login(&api(&transport), &Credentials::new("ada", "s3cret"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Api(ref api_err) if api_err.kind == ApiErrorKind::Codec));
    assert_eq!(err.user_message(), "Please try again later");
    assert_eq!(transport.request_count(), 1);
    assert!(!store.reader().is_authenticated());
}

#[tokio::test]
async fn sign_out_clears_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.sqlite3");
    let transport = FakeTransport::new();
    transport.reply("POST /token", json!({"access_token": "abc"}));
    transport.reply("GET /me", profile());
    let mut store = store_at(&path);
    store
        .login(&api(&transport), &Credentials::new("ada", "s3cret"))
        .await
        .unwrap();

    store.sign_out().unwrap();

    assert_eq!(store.state(), SessionState::Anonymous);
    assert_eq!(store_at(&path).state(), SessionState::Anonymous);
}

#[tokio::test]
async fn register_and_login_uses_created_account() {
    let transport = FakeTransport::new();
    transport.reply("POST /register", profile());
    transport.reply("POST /token", json!({"access_token": "fresh"}));
    transport.reply("GET /me", profile());
    let mut store =
        SessionStore::restore(Box::new(SqliteSessionStorage::in_memory().unwrap())).unwrap();
    let form = RegisterForm {
        email: "ada@example.com".to_string(),
        username: "ada".to_string(),
        password: "s3cret".to_string(),
        age: "36".to_string(),
        gender: String::new(),
        country: "UK".to_string(),
    };

    store
        .register_and_login(&api(&transport), &form)
        .await
        .unwrap();

    assert_eq!(
        transport.routes(),
        vec!["POST /register", "POST /token", "GET /me"]
    );
    let register = &transport.requests()[0];
    assert_eq!(register.token, None);
    match &register.body {
        RequestBody::Json(body) => {
            assert_eq!(body["email"], "ada@example.com");
            assert_eq!(body["age"], 36);
            assert_eq!(body["is_active"], true);
        }
        other => panic!("register must send JSON, got {other:?}"),
    }
    assert_eq!(store.reader().token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn invalid_registration_form_sends_nothing() {
    let transport = FakeTransport::new();
    let store =
        SessionStore::restore(Box::new(SqliteSessionStorage::in_memory().unwrap())).unwrap();
    let form = RegisterForm {
        email: "not-an-email".to_string(),
        username: "ada".to_string(),
        password: "s3cret".to_string(),
        age: String::new(),
        gender: String::new(),
        country: String::new(),
    };

    let err = store.register(&api(&transport), &form).await.unwrap_err();

    assert!(matches!(err, SessionError::Form(_)));
    assert_eq!(transport.request_count(), 0);
}
