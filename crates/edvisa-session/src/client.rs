//! The session state machine.

use std::fmt;

use edvisa_models::{AuthResponse, User};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::storage::TokenStorage;
use crate::transport::AuthTransport;

/// An authenticated session held in memory. The refresh token lives in
/// storage, not here.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub access_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Refreshing,
    Authenticated(Session),
}

pub struct SessionClient<S, T> {
    storage: S,
    transport: T,
    state: SessionState,
}

impl<S, T> SessionClient<S, T>
where
    S: TokenStorage,
    T: AuthTransport,
{
    pub fn new(storage: S, transport: T) -> Self {
        Self {
            storage,
            transport,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session().map(|s| s.access_token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Restores a session from the persisted refresh token, if any.
    ///
    /// Never fails: any problem ends in [`SessionState::Unauthenticated`]
    /// with the persisted token removed.
    pub async fn bootstrap(&mut self) -> &SessionState {
        let stored = match self.storage.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read stored refresh token");
                self.drop_session();
                return &self.state;
            }
        };

        match stored {
            Some(refresh_token) => self.exchange(&refresh_token).await,
            None => {
                debug!("No stored refresh token, starting unauthenticated");
                self.state = SessionState::Unauthenticated;
            }
        }

        &self.state
    }

    /// Rotates the stored refresh token ahead of access-token expiry.
    /// Same failure policy as [`SessionClient::bootstrap`].
    pub async fn refresh(&mut self) -> &SessionState {
        self.bootstrap().await
    }

    /// Logs in with credentials. Unlike bootstrap, the failure is returned
    /// to the caller, who typed the credentials.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, SessionError> {
        let response = self.transport.login(email, password).await?;
        self.establish(response)?;
        self.session().ok_or(SessionError::NotAuthenticated)
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.state = SessionState::Unauthenticated;
        self.storage.clear()
    }

    async fn exchange(&mut self, refresh_token: &str) {
        self.state = SessionState::Refreshing;

        match self.transport.refresh(refresh_token).await {
            Ok(response) => {
                if let Err(e) = self.establish(response) {
                    warn!(error = %e, "Could not persist rotated refresh token");
                    self.drop_session();
                }
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed, continuing unauthenticated");
                self.drop_session();
            }
        }
    }

    fn establish(&mut self, response: AuthResponse) -> Result<(), SessionError> {
        self.storage.save(&response.tokens.refresh_token)?;
        info!(user_id = %response.user.id, role = %response.user.role, "Session established");
        self.state = SessionState::Authenticated(Session {
            user: response.user,
            access_token: response.tokens.access_token,
        });
        Ok(())
    }

    fn drop_session(&mut self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Could not clear stored refresh token");
        }
        self.state = SessionState::Unauthenticated;
    }
}
