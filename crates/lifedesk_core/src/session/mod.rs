//! Session store: the only writer of authentication state.
//!
//! # Responsibility
//! - Restore token and profile from durable storage at startup.
//! - Perform login, registration and sign-out against the backend.
//! - Hand out read-only `SessionReader` handles to controllers.
//!
//! # Invariants
//! - Login is atomic: token and profile are persisted together, and only
//!   after both `/token` and `/me` succeed. Any failure persists nothing.
//! - Sign-out clears storage and in-memory state together.
//! - Readers observe state changes immediately and cannot mutate it.
//!
//! # See also
//! - `crate::gate` for routing decisions derived from `SessionState`.

mod storage;

pub use storage::{
    MemorySessionStorage, PersistedSession, SessionStorage, SqliteSessionStorage, StorageError,
};

use crate::model::forms::{FormError, RegisterForm};
use crate::model::user::UserProfile;
use crate::transport::{ApiClient, ApiError, ApiResult, Credentials};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

/// Authentication state shared with readers.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated {
        token: String,
        profile: Option<UserProfile>,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { token, .. } => Some(token),
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { profile, .. } => profile.as_ref(),
        }
    }
}

impl Debug for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Authenticated { profile, .. } => f
                .debug_struct("Authenticated")
                .field("token", &"<redacted>")
                .field("profile", profile)
                .finish(),
        }
    }
}

impl From<PersistedSession> for SessionState {
    fn from(value: PersistedSession) -> Self {
        Self::Authenticated {
            token: value.token,
            profile: value.profile,
        }
    }
}

/// Failure of a session operation.
#[derive(Debug)]
pub enum SessionError {
    Api(ApiError),
    Form(FormError),
    Storage(StorageError),
}

impl SessionError {
    /// Text a view shows in its notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Form(err) => err.to_string(),
            Self::Storage(_) => crate::transport::GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(err) => write!(f, "{err}"),
            Self::Form(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "session storage failed: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Form(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<FormError> for SessionError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

impl From<StorageError> for SessionError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Read-only view of the session, injected into every controller.
#[derive(Clone, Default)]
pub struct SessionReader {
    state: Arc<RwLock<SessionState>>,
}

impl SessionReader {
    /// Detached reader over a fixed state; useful for previews and tests.
    pub fn fixed(state: SessionState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token()
            .map(str::to_string)
    }

    /// Token for an authenticated call.
    ///
    /// # Errors
    /// - Returns `ApiErrorKind::NotSignedIn` while anonymous.
    pub fn require_token(&self) -> ApiResult<String> {
        self.token().ok_or_else(ApiError::not_signed_in)
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .profile()
            .cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }
}

impl Debug for SessionReader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionReader")
            .field("state", &self.state())
            .finish()
    }
}

/// Owner of the session. Mutating methods take `&mut self`.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    state: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    /// Rebuilds state from storage without contacting the backend.
    ///
    /// A stored token means `Authenticated`, even when the profile is
    /// missing or unreadable; its validity is discovered on first use.
    pub fn restore(storage: Box<dyn SessionStorage>) -> Result<Self, StorageError> {
        let state = match storage.load()? {
            Some(persisted) => SessionState::from(persisted),
            None => SessionState::Anonymous,
        };
        info!(
            "event=session_restore module=session status=ok authenticated={}",
            state.is_authenticated()
        );
        Ok(Self {
            storage,
            state: Arc::new(RwLock::new(state)),
        })
    }

    pub fn reader(&self) -> SessionReader {
        SessionReader {
            state: Arc::clone(&self.state),
        }
    }

    pub fn state(&self) -> SessionState {
        self.reader().state()
    }

    /// Exchanges credentials for a token, fetches the profile, then persists
    /// both and becomes `Authenticated`.
    ///
    /// # Errors
    /// - Any API or storage failure; state and storage are left untouched.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        credentials: &Credentials,
    ) -> SessionResult<UserProfile> {
        let started_at = Instant::now();
        info!("event=session_login module=session status=start");

        let result = self.login_inner(api, credentials).await;
        match &result {
            Ok(profile) => info!(
                "event=session_login module=session status=ok user_id={} duration_ms={}",
                profile.id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=session_login module=session status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    async fn login_inner(
        &mut self,
        api: &ApiClient,
        credentials: &Credentials,
    ) -> SessionResult<UserProfile> {
        let token = api.login(credentials).await?;
        let profile = api.current_user(&token.access_token).await?;

        let persisted = PersistedSession {
            token: token.access_token,
            profile: Some(profile.clone()),
        };
        self.storage.save(&persisted)?;
        self.set_state(SessionState::from(persisted));
        Ok(profile)
    }

    /// Creates an account. Session state is not changed.
    pub async fn register(
        &self,
        api: &ApiClient,
        form: &RegisterForm,
    ) -> SessionResult<UserProfile> {
        let draft = form.to_draft()?;
        let profile = api.register(&draft).await.map_err(|err| {
            warn!(
                "event=session_register module=session status=error error={}",
                err
            );
            err
        })?;
        info!(
            "event=session_register module=session status=ok user_id={}",
            profile.id
        );
        Ok(profile)
    }

    /// Registers, then logs in with the same credentials.
    pub async fn register_and_login(
        &mut self,
        api: &ApiClient,
        form: &RegisterForm,
    ) -> SessionResult<UserProfile> {
        let created = self.register(api, form).await?;
        let credentials = Credentials::new(created.username, form.password.clone());
        self.login(api, &credentials).await
    }

    /// Clears storage, then drops to `Anonymous`.
    ///
    /// # Errors
    /// - Storage failure; in-memory state is still cleared so the user is
    ///   signed out for the rest of the process.
    pub fn sign_out(&mut self) -> Result<(), StorageError> {
        let cleared = self.storage.clear();
        self.set_state(SessionState::Anonymous);
        match &cleared {
            Ok(()) => info!("event=session_sign_out module=session status=ok"),
            Err(err) => error!(
                "event=session_sign_out module=session status=error error={}",
                err
            ),
        }
        cleared
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }
}
