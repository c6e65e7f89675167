//! Typed API client over a `Transport`.
//!
//! # Responsibility
//! - Decode JSON responses into explicit schemas.
//! - Own the request shapes for account and group-detail endpoints.
//!
//! Collection endpoints (list/create/update/delete) are described by the
//! resource definitions in `controller`; this client only executes them.

use super::{ApiError, ApiRequest, ApiResult, Transport};
use crate::config::ClientConfig;
use crate::model::expense::Expense;
use crate::model::group::Group;
use crate::model::user::{RegisterDraft, UserProfile, UserSummary};
use crate::model::EntityId;
use crate::transport::HttpTransport;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::any::type_name;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Login credentials, sent form-encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /token` response.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Cheaply cloneable handle shared by the session store and controllers.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Builds a client backed by the reqwest transport.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Sends `request` and decodes the response as `T`.
    ///
    /// # Errors
    /// - Transport errors pass through unchanged.
    /// - A response that does not match `T` becomes `ApiErrorKind::Codec`.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let route = request.route_key();
        let value = self.transport.send(request).await?;
        serde_json::from_value(value).map_err(|err| {
            ApiError::codec(format!(
                "unexpected response for {route}: expected {}: {err}",
                type_name::<T>()
            ))
        })
    }

    /// Sends `request` and ignores the response body.
    pub async fn execute_unit(&self, request: ApiRequest) -> ApiResult<()> {
        self.transport.send(request).await.map(|_| ())
    }

    /// `POST /register` without authorization.
    pub async fn register(&self, draft: &RegisterDraft) -> ApiResult<UserProfile> {
        self.execute(ApiRequest::post("/register").with_json(draft)?).await
    }

    /// `POST /token` with form-encoded credentials and no authorization.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AccessToken> {
        let request = ApiRequest::post("/token").with_form(vec![
            ("username".to_string(), credentials.username.clone()),
            ("password".to_string(), credentials.password.clone()),
        ]);
        let token: AccessToken = self.execute(request).await?;
        if token.access_token.trim().is_empty() {
            return Err(ApiError::codec("login response carried an empty access_token"));
        }
        Ok(token)
    }

    pub async fn current_user(&self, token: &str) -> ApiResult<UserProfile> {
        self.execute(ApiRequest::get("/me").bearer(token)).await
    }

    pub async fn group(&self, group_id: EntityId, token: &str) -> ApiResult<Group> {
        self.execute(ApiRequest::get(format!("/groups/{group_id}")).bearer(token))
            .await
    }

    pub async fn group_members(
        &self,
        group_id: EntityId,
        token: &str,
    ) -> ApiResult<Vec<UserSummary>> {
        self.execute(ApiRequest::get(format!("/groups/{group_id}/members")).bearer(token))
            .await
    }

    pub async fn group_expenses(&self, group_id: EntityId, token: &str) -> ApiResult<Vec<Expense>> {
        self.execute(ApiRequest::get(format!("/groups/{group_id}/expenses")).bearer(token))
            .await
    }

    pub async fn add_group_member(
        &self,
        group_id: EntityId,
        user_id: EntityId,
        token: &str,
    ) -> ApiResult<()> {
        self.execute_unit(
            ApiRequest::post(format!("/groups/{group_id}/members/{user_id}")).bearer(token),
        )
        .await
    }

    /// `GET /users/search`; an empty query lists without the parameter.
    pub async fn search_users(&self, query: &str, token: &str) -> ApiResult<Vec<UserSummary>> {
        let mut request = ApiRequest::get("/users/search").bearer(token);
        if !query.is_empty() {
            request = request.with_query("query", query);
        }
        self.execute(request).await
    }
}
